//! Read-side queries: dashboard statistics and record lookups.

use std::sync::Arc;

use chrono::{Datelike, Duration, TimeZone, Utc};
use tracing::info;

use crate::dto::statistics_dto::{
    now_rfc3339, AlertDto, PeriodCounts, PublicStatisticsData, StatisticsData,
    StatusDistributionDetailed,
};
use crate::model::guest_data::GuestData;
use crate::model::toll_data::{TireImage, TollData};
use crate::repository::guest_data_repo::{GuestDataRepository, GuestRecordFilter};
use crate::repository::toll_data_repo::{TollDataRepository, TollRecordFilter};
use crate::util::error::ServiceError;

/// Which collection a single-record lookup should consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Toll,
    Guest,
    Auto,
}

impl RecordKind {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("toll") => RecordKind::Toll,
            Some("guest") => RecordKind::Guest,
            _ => RecordKind::Auto,
        }
    }
}

/// Either kind of stored record.
pub enum Record {
    Toll(TollData),
    Guest(GuestData),
}

/// Parses a query-string date. Accepts RFC 3339 timestamps and bare
/// `YYYY-MM-DD` dates; a bare end date covers the whole day.
pub fn parse_query_date(value: &str, end_of_day: bool) -> Option<bson::DateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(bson::DateTime::from_chrono(dt.with_timezone(&Utc)));
    }
    let date = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        date.and_hms_milli_opt(23, 59, 59, 999)?
    } else {
        date.and_hms_opt(0, 0, 0)?
    };
    Some(bson::DateTime::from_chrono(Utc.from_utc_datetime(&time)))
}

pub struct DataService {
    toll_repo: Arc<dyn TollDataRepository>,
    guest_repo: Arc<dyn GuestDataRepository>,
}

impl DataService {
    pub fn new(
        toll_repo: Arc<dyn TollDataRepository>,
        guest_repo: Arc<dyn GuestDataRepository>,
    ) -> Self {
        DataService {
            toll_repo,
            guest_repo,
        }
    }

    fn period_starts() -> (bson::DateTime, bson::DateTime, bson::DateTime) {
        let now = Utc::now();
        let day = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| Utc.from_utc_datetime(&t))
            .unwrap_or(now);
        let week = day - Duration::days(now.weekday().num_days_from_sunday() as i64);
        let month = now
            .date_naive()
            .with_day(1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|t| Utc.from_utc_datetime(&t))
            .unwrap_or(day);
        (
            bson::DateTime::from_chrono(month),
            bson::DateTime::from_chrono(week),
            bson::DateTime::from_chrono(day),
        )
    }

    /// Full dashboard snapshot: totals, per-period counts, status
    /// distributions, recent danger alerts and the 30-day upload trend.
    #[tracing::instrument(skip(self))]
    pub async fn statistics(&self) -> Result<StatisticsData, ServiceError> {
        let (month_start, week_start, day_start) = Self::period_starts();

        let toll_total = self.toll_repo.count().await?;
        let guest_total = self.guest_repo.count().await?;

        let monthly = PeriodCounts::new(
            self.toll_repo.count_since(month_start).await?,
            self.guest_repo.count_since(month_start).await?,
        );
        let weekly = PeriodCounts::new(
            self.toll_repo.count_since(week_start).await?,
            self.guest_repo.count_since(week_start).await?,
        );
        let daily = PeriodCounts::new(
            self.toll_repo.count_since(day_start).await?,
            self.guest_repo.count_since(day_start).await?,
        );

        let toll_status = self.toll_repo.status_counts().await?;
        let guest_status = self.guest_repo.status_counts().await?;

        let week_ago = bson::DateTime::from_chrono(Utc::now() - Duration::days(7));
        let alerts = self.toll_repo.recent_danger(week_ago, 10).await?;

        let thirty_days_ago = bson::DateTime::from_chrono(Utc::now() - Duration::days(30));
        let daily_trend = self.toll_repo.daily_trend(thirty_days_ago).await?;

        info!("Statistics computed over {} records", toll_total + guest_total);

        Ok(StatisticsData {
            total_records: toll_total + guest_total,
            toll_records: toll_total,
            guest_records: guest_total,
            monthly,
            weekly,
            daily,
            status_distribution: toll_status.combined(&guest_status),
            status_distribution_detailed: StatusDistributionDetailed {
                toll: toll_status,
                guest: guest_status,
            },
            recent_alerts: alerts.iter().map(AlertDto::from).collect(),
            daily_trend,
            last_updated: now_rfc3339(),
        })
    }

    /// Status distribution only, for the public landing page.
    pub async fn public_statistics(&self) -> Result<PublicStatisticsData, ServiceError> {
        let toll_status = self.toll_repo.status_counts().await?;
        let guest_status = self.guest_repo.status_counts().await?;
        let combined = toll_status.combined(&guest_status);
        Ok(PublicStatisticsData {
            total_records: combined.total(),
            status_distribution: combined,
            last_updated: now_rfc3339(),
        })
    }

    pub async fn toll_records(
        &self,
        filter: &TollRecordFilter,
    ) -> Result<(Vec<TollData>, u64), ServiceError> {
        Ok(self.toll_repo.search(filter).await?)
    }

    pub async fn toll_record_images(&self, id: &str) -> Result<Vec<TireImage>, ServiceError> {
        let oid = bson::oid::ObjectId::parse_str(id)
            .map_err(|_| ServiceError::NotFound("Record not found".to_string()))?;
        let record = self
            .toll_repo
            .find_by_id(&oid)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Record not found".to_string()))?;
        Ok(record.images)
    }

    /// Guest self-service lookup. The exact vehicle and mobile pair acts as
    /// the access key; an empty result page is a 404, not an empty list.
    #[tracing::instrument(skip(self, filter), fields(vehicle = %filter.vehicle_number))]
    pub async fn guest_records(
        &self,
        mut filter: GuestRecordFilter,
    ) -> Result<(Vec<GuestData>, u64), ServiceError> {
        filter.vehicle_number = filter.vehicle_number.to_uppercase();
        let (records, total) = self.guest_repo.find_by_vehicle(&filter).await?;
        if records.is_empty() {
            return Err(ServiceError::NotFound(
                "No records found for the provided details".to_string(),
            ));
        }
        Ok((records, total))
    }

    /// Single-record lookup across both collections. Toll records are only
    /// handed out to authenticated callers; guest records are public since
    /// the id itself is the capability.
    pub async fn record(
        &self,
        id: &str,
        kind: RecordKind,
        authenticated: bool,
    ) -> Result<Record, ServiceError> {
        let oid = bson::oid::ObjectId::parse_str(id)
            .map_err(|_| ServiceError::NotFound("Record not found".to_string()))?;

        if matches!(kind, RecordKind::Toll | RecordKind::Auto) {
            if let Some(record) = self.toll_repo.find_by_id(&oid).await? {
                if !authenticated {
                    return Err(ServiceError::Unauthorized(
                        "Authentication required for toll records".to_string(),
                    ));
                }
                return Ok(Record::Toll(record));
            }
        }
        if matches!(kind, RecordKind::Guest | RecordKind::Auto) {
            if let Some(record) = self.guest_repo.find_by_id(&oid).await? {
                return Ok(Record::Guest(record));
            }
        }
        Err(ServiceError::NotFound("Record not found".to_string()))
    }
}

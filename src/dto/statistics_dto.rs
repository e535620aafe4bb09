use serde::Serialize;

use crate::dto::{format_datetime, format_datetime_opt};
use crate::model::analysis::OverallStatus;
use crate::model::toll_data::TollData;
use crate::repository::{DailyTrendEntry, StatusCounts};

#[derive(Debug, Serialize)]
pub struct PeriodCounts {
    pub toll: u64,
    pub guest: u64,
    pub total: u64,
}

impl PeriodCounts {
    pub fn new(toll: u64, guest: u64) -> Self {
        PeriodCounts {
            toll,
            guest,
            total: toll + guest,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusDistributionDetailed {
    pub toll: StatusCounts,
    pub guest: StatusCounts,
}

/// Danger record summary for the dashboard alert list; never carries images.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDto {
    pub id: String,
    pub vehicle_number: String,
    pub user_mobile_number: String,
    pub overall_status: OverallStatus,
    pub toll_operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&TollData> for AlertDto {
    fn from(record: &TollData) -> Self {
        AlertDto {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            vehicle_number: record.vehicle_number.clone(),
            user_mobile_number: record.user_mobile_number.clone(),
            overall_status: record.overall_status,
            toll_operator: record.toll_operator.clone(),
            created_at: format_datetime_opt(record.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsData {
    pub total_records: u64,
    pub toll_records: u64,
    pub guest_records: u64,
    pub monthly: PeriodCounts,
    pub weekly: PeriodCounts,
    pub daily: PeriodCounts,
    pub status_distribution: StatusCounts,
    pub status_distribution_detailed: StatusDistributionDetailed,
    pub recent_alerts: Vec<AlertDto>,
    pub daily_trend: Vec<DailyTrendEntry>,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub success: bool,
    pub data: StatisticsData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicStatisticsData {
    pub status_distribution: StatusCounts,
    pub total_records: u64,
    pub last_updated: String,
}

#[derive(Debug, Serialize)]
pub struct PublicStatisticsResponse {
    pub success: bool,
    pub data: PublicStatisticsData,
}

pub fn now_rfc3339() -> String {
    format_datetime(bson::DateTime::now())
}

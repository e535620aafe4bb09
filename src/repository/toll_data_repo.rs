use std::collections::HashMap;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::IndexModel;
use tracing::{error, info};

use crate::model::toll_data::TollData;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::{DailyTrendEntry, StatusCounts};

/// Filters for the paginated toll record search.
#[derive(Debug, Clone, Default)]
pub struct TollRecordFilter {
    /// Case-insensitive match over vehicle and mobile number
    pub search: Option<String>,
    pub status: Option<String>,
    pub toll_plaza: Option<String>,
    pub from: Option<bson::DateTime>,
    pub to: Option<bson::DateTime>,
    /// When false, raw image payloads are projected out
    pub include_images: bool,
    pub page: u32,
    pub limit: u32,
}

impl TollRecordFilter {
    pub fn to_query(&self) -> Document {
        let mut query = Document::new();
        if let Some(ref plaza) = self.toll_plaza {
            if !plaza.is_empty() {
                query.insert("tollPlaza", plaza.clone());
            }
        }
        if let Some(ref search) = self.search {
            if !search.is_empty() {
                query.insert(
                    "$or",
                    vec![
                        doc! { "vehicleNumber": { "$regex": search.clone(), "$options": "i" } },
                        doc! { "userMobileNumber": { "$regex": search.clone(), "$options": "i" } },
                    ],
                );
            }
        }
        if let Some(ref status) = self.status {
            if !status.is_empty() {
                query.insert("overallStatus", status.clone());
            }
        }
        if self.from.is_some() || self.to.is_some() {
            let mut range = Document::new();
            if let Some(from) = self.from {
                range.insert("$gte", from);
            }
            if let Some(to) = self.to {
                range.insert("$lte", to);
            }
            query.insert("createdAt", range);
        }
        query
    }
}

#[async_trait]
pub trait TollDataRepository: Send + Sync {
    async fn insert(&self, record: TollData) -> RepositoryResult<TollData>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<TollData>>;
    /// Paginated search, newest first. Returns the page plus total match count.
    async fn search(&self, filter: &TollRecordFilter) -> RepositoryResult<(Vec<TollData>, u64)>;
    async fn count(&self) -> RepositoryResult<u64>;
    async fn count_since(&self, since: bson::DateTime) -> RepositoryResult<u64>;
    async fn status_counts(&self) -> RepositoryResult<StatusCounts>;
    /// Danger records created since the given instant, newest first.
    async fn recent_danger(
        &self,
        since: bson::DateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<TollData>>;
    /// Uploads bucketed per calendar day with per-status counts, oldest first.
    async fn daily_trend(&self, since: bson::DateTime) -> RepositoryResult<Vec<DailyTrendEntry>>;
}

pub struct MongoTollDataRepository {
    collection: mongodb::Collection<TollData>,
}

impl MongoTollDataRepository {
    pub async fn new(db: &mongodb::Database) -> Result<Self, mongodb::error::Error> {
        let collection = db.collection::<TollData>("tolldata");
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "vehicleNumber": 1, "userMobileNumber": 1 })
                .build(),
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            IndexModel::builder().keys(doc! { "overallStatus": 1 }).build(),
        ];
        collection.create_indexes(indexes, None).await?;
        Ok(MongoTollDataRepository { collection })
    }
}

#[async_trait]
impl TollDataRepository for MongoTollDataRepository {
    #[tracing::instrument(skip(self, record), fields(vehicle = %record.vehicle_number))]
    async fn insert(&self, mut record: TollData) -> RepositoryResult<TollData> {
        record.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        record.created_at = Some(now);
        record.updated_at = Some(now);
        match self.collection.insert_one(record.clone(), None).await {
            Ok(_) => {
                info!("Toll record created successfully");
                Ok(record)
            }
            Err(e) => {
                error!("Failed to insert toll record: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<TollData>> {
        let record = self
            .collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch toll record: {}", e)))?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, filter), fields(page = filter.page, limit = filter.limit))]
    async fn search(&self, filter: &TollRecordFilter) -> RepositoryResult<(Vec<TollData>, u64)> {
        let query = filter.to_query();
        let total = self
            .collection
            .count_documents(query.clone(), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count toll records: {}", e)))?;

        let skip = (filter.page.max(1) - 1) as u64 * filter.limit as u64;
        let mut options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(filter.limit as i64)
            .build();
        if !filter.include_images {
            options.projection = Some(doc! { "images.base64": 0 });
        }

        let mut cursor = self
            .collection
            .find(query, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list toll records: {}", e)))?;
        let mut records = Vec::new();
        while let Some(record) = cursor.next().await {
            records.push(record.map_err(|e| {
                RepositoryError::serialization(format!("Failed to deserialize toll record: {}", e))
            })?);
        }
        Ok((records, total))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(None, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count toll records: {}", e)))?;
        Ok(count)
    }

    async fn count_since(&self, since: bson::DateTime) -> RepositoryResult<u64> {
        let filter = doc! { "createdAt": { "$gte": since } };
        let count = self
            .collection
            .count_documents(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count toll records: {}", e)))?;
        Ok(count)
    }

    async fn status_counts(&self) -> RepositoryResult<StatusCounts> {
        let pipeline = vec![doc! {
            "$group": { "_id": "$overallStatus", "count": { "$sum": 1 } }
        }];
        let mut cursor = self.collection.aggregate(pipeline, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to aggregate toll statuses: {}", e))
        })?;
        let mut groups: HashMap<String, u64> = HashMap::new();
        while let Some(entry) = cursor.next().await {
            let doc = entry.map_err(|e| {
                RepositoryError::database(format!("Failed to read status group: {}", e))
            })?;
            if let (Ok(status), Ok(count)) = (doc.get_str("_id"), doc.get_i32("count")) {
                groups.insert(status.to_string(), count as u64);
            }
        }
        Ok(StatusCounts::from_grouped(&groups))
    }

    async fn recent_danger(
        &self,
        since: bson::DateTime,
        limit: i64,
    ) -> RepositoryResult<Vec<TollData>> {
        let filter = doc! {
            "overallStatus": "danger",
            "createdAt": { "$gte": since },
        };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .projection(doc! { "images.base64": 0 })
            .build();
        let mut cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch alerts: {}", e)))?;
        let mut records = Vec::new();
        while let Some(record) = cursor.next().await {
            records.push(record.map_err(|e| {
                RepositoryError::serialization(format!("Failed to deserialize toll record: {}", e))
            })?);
        }
        Ok(records)
    }

    async fn daily_trend(&self, since: bson::DateTime) -> RepositoryResult<Vec<DailyTrendEntry>> {
        let pipeline = vec![
            doc! { "$match": { "createdAt": { "$gte": since } } },
            doc! {
                "$group": {
                    "_id": { "$dateToString": { "format": "%Y-%m-%d", "date": "$createdAt" } },
                    "count": { "$sum": 1 },
                    "safe": { "$sum": { "$cond": [ { "$eq": ["$overallStatus", "safe"] }, 1, 0 ] } },
                    "warning": { "$sum": { "$cond": [ { "$eq": ["$overallStatus", "warning"] }, 1, 0 ] } },
                    "danger": { "$sum": { "$cond": [ { "$eq": ["$overallStatus", "danger"] }, 1, 0 ] } },
                }
            },
            doc! { "$sort": { "_id": 1 } },
        ];
        let mut cursor = self.collection.aggregate(pipeline, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to aggregate daily trend: {}", e))
        })?;
        let mut trend = Vec::new();
        while let Some(entry) = cursor.next().await {
            let doc = entry.map_err(|e| {
                RepositoryError::database(format!("Failed to read trend bucket: {}", e))
            })?;
            trend.push(DailyTrendEntry {
                date: doc.get_str("_id").unwrap_or_default().to_string(),
                count: doc.get_i32("count").unwrap_or(0) as u64,
                safe: doc.get_i32("safe").unwrap_or(0) as u64,
                warning: doc.get_i32("warning").unwrap_or(0) as u64,
                danger: doc.get_i32("danger").unwrap_or(0) as u64,
            });
        }
        Ok(trend)
    }
}

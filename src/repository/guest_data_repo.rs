use std::collections::HashMap;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::IndexModel;
use tracing::{error, info};

use crate::model::guest_data::GuestData;
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use crate::repository::StatusCounts;

/// Guest lookups require the exact vehicle and mobile pair; since guest
/// records carry no authentication, the pair acts as the access key.
#[derive(Debug, Clone)]
pub struct GuestRecordFilter {
    pub vehicle_number: String,
    pub mobile_number: String,
    pub from: Option<bson::DateTime>,
    pub to: Option<bson::DateTime>,
    pub include_images: bool,
    pub page: u32,
    pub limit: u32,
}

impl GuestRecordFilter {
    pub fn to_query(&self) -> Document {
        let mut query = doc! {
            "vehicleNumber": self.vehicle_number.clone(),
            "userMobileNumber": self.mobile_number.clone(),
        };
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
pub trait GuestDataRepository: Send + Sync {
    async fn insert(&self, record: GuestData) -> RepositoryResult<GuestData>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<GuestData>>;
    /// Exact vehicle+mobile lookup, newest first, with total match count.
    async fn find_by_vehicle(
        &self,
        filter: &GuestRecordFilter,
    ) -> RepositoryResult<(Vec<GuestData>, u64)>;
    /// Admin listing with free-text search over vehicle and mobile number.
    async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<(Vec<GuestData>, u64)>;
    async fn count(&self) -> RepositoryResult<u64>;
    async fn count_since(&self, since: bson::DateTime) -> RepositoryResult<u64>;
    async fn status_counts(&self) -> RepositoryResult<StatusCounts>;
}

pub struct MongoGuestDataRepository {
    collection: mongodb::Collection<GuestData>,
}

impl MongoGuestDataRepository {
    pub async fn new(db: &mongodb::Database) -> Result<Self, mongodb::error::Error> {
        let collection = db.collection::<GuestData>("guestdata");
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "vehicleNumber": 1, "userMobileNumber": 1 })
                .build(),
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            IndexModel::builder().keys(doc! { "overallStatus": 1 }).build(),
        ];
        collection.create_indexes(indexes, None).await?;
        Ok(MongoGuestDataRepository { collection })
    }

    async fn collect(
        mut cursor: mongodb::Cursor<GuestData>,
    ) -> RepositoryResult<Vec<GuestData>> {
        let mut records = Vec::new();
        while let Some(record) = cursor.next().await {
            records.push(record.map_err(|e| {
                RepositoryError::serialization(format!("Failed to deserialize guest record: {}", e))
            })?);
        }
        Ok(records)
    }
}

#[async_trait]
impl GuestDataRepository for MongoGuestDataRepository {
    #[tracing::instrument(skip(self, record), fields(vehicle = %record.vehicle_number))]
    async fn insert(&self, mut record: GuestData) -> RepositoryResult<GuestData> {
        record.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        record.created_at = Some(now);
        record.updated_at = Some(now);
        match self.collection.insert_one(record.clone(), None).await {
            Ok(_) => {
                info!("Guest record created successfully");
                Ok(record)
            }
            Err(e) => {
                error!("Failed to insert guest record: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<GuestData>> {
        let record = self
            .collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to fetch guest record: {}", e))
            })?;
        Ok(record)
    }

    #[tracing::instrument(skip(self, filter), fields(vehicle = %filter.vehicle_number))]
    async fn find_by_vehicle(
        &self,
        filter: &GuestRecordFilter,
    ) -> RepositoryResult<(Vec<GuestData>, u64)> {
        let query = filter.to_query();
        let total = self
            .collection
            .count_documents(query.clone(), None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to count guest records: {}", e))
            })?;

        let skip = (filter.page.max(1) - 1) as u64 * filter.limit as u64;
        let mut options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(filter.limit as i64)
            .build();
        if !filter.include_images {
            options.projection = Some(doc! { "images.base64": 0 });
        }

        let cursor = self.collection.find(query, options).await.map_err(|e| {
            RepositoryError::database(format!("Failed to fetch guest records: {}", e))
        })?;
        Ok((Self::collect(cursor).await?, total))
    }

    async fn list(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> RepositoryResult<(Vec<GuestData>, u64)> {
        let query = match search {
            Some(s) if !s.is_empty() => doc! {
                "$or": [
                    { "vehicleNumber": { "$regex": s, "$options": "i" } },
                    { "userMobileNumber": { "$regex": s, "$options": "i" } },
                ]
            },
            _ => doc! {},
        };
        let total = self
            .collection
            .count_documents(query.clone(), None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to count guest records: {}", e))
            })?;

        let skip = (page.max(1) - 1) as u64 * limit as u64;
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit as i64)
            .projection(doc! { "images.base64": 0 })
            .build();
        let cursor = self.collection.find(query, options).await.map_err(|e| {
            RepositoryError::database(format!("Failed to list guest records: {}", e))
        })?;
        Ok((Self::collect(cursor).await?, total))
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let count = self
            .collection
            .count_documents(None, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to count guest records: {}", e))
            })?;
        Ok(count)
    }

    async fn count_since(&self, since: bson::DateTime) -> RepositoryResult<u64> {
        let filter = doc! { "createdAt": { "$gte": since } };
        let count = self
            .collection
            .count_documents(filter, None)
            .await
            .map_err(|e| {
                RepositoryError::database(format!("Failed to count guest records: {}", e))
            })?;
        Ok(count)
    }

    async fn status_counts(&self) -> RepositoryResult<StatusCounts> {
        let pipeline = vec![doc! {
            "$group": { "_id": "$overallStatus", "count": { "$sum": 1 } }
        }];
        let mut cursor = self.collection.aggregate(pipeline, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to aggregate guest statuses: {}", e))
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
}

use std::collections::HashMap;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use mongodb::IndexModel;
use tracing::{error, info};

use crate::model::feedback::{Feedback, FeedbackPriority, FeedbackStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};

#[derive(Debug, Clone, Default)]
pub struct FeedbackFilter {
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
    /// Case-insensitive match over name, email and feedback text
    pub search: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl FeedbackFilter {
    pub fn to_query(&self) -> RepositoryResult<Document> {
        let mut query = Document::new();
        if let Some(status) = self.status {
            query.insert("status", bson::to_bson(&status)?);
        }
        if let Some(priority) = self.priority {
            query.insert("priority", bson::to_bson(&priority)?);
        }
        if let Some(ref search) = self.search {
            if !search.is_empty() {
                query.insert(
                    "$or",
                    vec![
                        doc! { "name": { "$regex": search.clone(), "$options": "i" } },
                        doc! { "email": { "$regex": search.clone(), "$options": "i" } },
                        doc! { "feedback": { "$regex": search.clone(), "$options": "i" } },
                    ],
                );
            }
        }
        Ok(query)
    }
}

#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    async fn insert(&self, feedback: Feedback) -> RepositoryResult<Feedback>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Feedback>>;
    /// Applies the given status/priority changes; None leaves a field as is.
    async fn update_triage(
        &self,
        id: ObjectId,
        status: Option<FeedbackStatus>,
        priority: Option<FeedbackPriority>,
    ) -> RepositoryResult<Feedback>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn list(&self, filter: &FeedbackFilter) -> RepositoryResult<(Vec<Feedback>, u64)>;
    async fn status_counts(&self) -> RepositoryResult<HashMap<String, u64>>;
}

pub struct MongoFeedbackRepository {
    collection: mongodb::Collection<Feedback>,
}

impl MongoFeedbackRepository {
    pub async fn new(db: &mongodb::Database) -> Result<Self, mongodb::error::Error> {
        let collection = db.collection::<Feedback>("feedbacks");
        let indexes = vec![
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            IndexModel::builder().keys(doc! { "status": 1 }).build(),
            IndexModel::builder().keys(doc! { "email": 1 }).build(),
        ];
        collection.create_indexes(indexes, None).await?;
        Ok(MongoFeedbackRepository { collection })
    }
}

#[async_trait]
impl FeedbackRepository for MongoFeedbackRepository {
    #[tracing::instrument(skip(self, feedback), fields(email = %feedback.email))]
    async fn insert(&self, mut feedback: Feedback) -> RepositoryResult<Feedback> {
        feedback.id = Some(ObjectId::new());
        let now = bson::DateTime::now();
        feedback.created_at = Some(now);
        feedback.updated_at = Some(now);
        match self.collection.insert_one(feedback.clone(), None).await {
            Ok(_) => {
                info!("Feedback stored successfully");
                Ok(feedback)
            }
            Err(e) => {
                error!("Failed to insert feedback: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<Feedback>> {
        let feedback = self
            .collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to fetch feedback: {}", e)))?;
        Ok(feedback)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn update_triage(
        &self,
        id: ObjectId,
        status: Option<FeedbackStatus>,
        priority: Option<FeedbackPriority>,
    ) -> RepositoryResult<Feedback> {
        let mut changes = doc! { "updatedAt": bson::DateTime::now() };
        if let Some(status) = status {
            changes.insert("status", bson::to_bson(&status)?);
        }
        if let Some(priority) = priority {
            changes.insert("priority", bson::to_bson(&priority)?);
        }
        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": changes }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update feedback: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No feedback found for ID: {}",
                id
            )));
        }
        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("No feedback found for ID: {}", id)))
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete feedback: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No feedback found to delete for ID: {}",
                id
            )));
        }
        info!("Feedback deleted successfully");
        Ok(())
    }

    async fn list(&self, filter: &FeedbackFilter) -> RepositoryResult<(Vec<Feedback>, u64)> {
        let query = filter.to_query()?;
        let total = self
            .collection
            .count_documents(query.clone(), None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count feedback: {}", e)))?;

        let skip = (filter.page.max(1) - 1) as u64 * filter.limit as u64;
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(filter.limit as i64)
            .build();
        let mut cursor = self
            .collection
            .find(query, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list feedback: {}", e)))?;
        let mut items = Vec::new();
        while let Some(item) = cursor.next().await {
            items.push(item.map_err(|e| {
                RepositoryError::serialization(format!("Failed to deserialize feedback: {}", e))
            })?);
        }
        Ok((items, total))
    }

    async fn status_counts(&self) -> RepositoryResult<HashMap<String, u64>> {
        let pipeline = vec![doc! {
            "$group": { "_id": "$status", "count": { "$sum": 1 } }
        }];
        let mut cursor = self.collection.aggregate(pipeline, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to aggregate feedback statuses: {}", e))
        })?;
        let mut groups = HashMap::new();
        while let Some(entry) = cursor.next().await {
            let doc = entry.map_err(|e| {
                RepositoryError::database(format!("Failed to read status group: {}", e))
            })?;
            if let (Ok(status), Ok(count)) = (doc.get_str("_id"), doc.get_i32("count")) {
                groups.insert(status.to_string(), count as u64);
            }
        }
        Ok(groups)
    }
}

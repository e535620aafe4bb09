//! Public feedback intake and admin triage.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::dto::feedback_dto::SubmitFeedbackRequest;
use crate::model::feedback::{Feedback, FeedbackPriority, FeedbackStatus};
use crate::repository::feedback_repo::{FeedbackFilter, FeedbackRepository};
use crate::util::error::ServiceError;

pub struct FeedbackService {
    feedback_repo: Arc<dyn FeedbackRepository>,
}

impl FeedbackService {
    pub fn new(feedback_repo: Arc<dyn FeedbackRepository>) -> Self {
        FeedbackService { feedback_repo }
    }

    #[tracing::instrument(skip(self, request, ip_address, user_agent), fields(email = %request.email))]
    pub async fn submit(
        &self,
        request: &SubmitFeedbackRequest,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Feedback, ServiceError> {
        let feedback = Feedback {
            id: None,
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            feedback: request.feedback.trim().to_string(),
            status: FeedbackStatus::Pending,
            priority: FeedbackPriority::Medium,
            ip_address,
            user_agent,
            created_at: None,
            updated_at: None,
        };
        let stored = self.feedback_repo.insert(feedback).await?;
        info!("Feedback submitted");
        Ok(stored)
    }

    pub async fn list(
        &self,
        filter: &FeedbackFilter,
    ) -> Result<(Vec<Feedback>, u64, HashMap<String, u64>), ServiceError> {
        let (items, total) = self.feedback_repo.list(filter).await?;
        let counts = self.feedback_repo.status_counts().await?;
        Ok((items, total, counts))
    }

    pub async fn update(
        &self,
        id: &str,
        status: Option<FeedbackStatus>,
        priority: Option<FeedbackPriority>,
    ) -> Result<Feedback, ServiceError> {
        let oid = bson::oid::ObjectId::parse_str(id)
            .map_err(|_| ServiceError::NotFound("Feedback not found".to_string()))?;
        let updated = self
            .feedback_repo
            .update_triage(oid, status, priority)
            .await
            .map_err(|e| match e {
                crate::repository::repository_error::RepositoryError::NotFound(_) => {
                    ServiceError::NotFound("Feedback not found".to_string())
                }
                other => other.into(),
            })?;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let oid = bson::oid::ObjectId::parse_str(id)
            .map_err(|_| ServiceError::NotFound("Feedback not found".to_string()))?;
        self.feedback_repo.delete(oid).await.map_err(|e| match e {
            crate::repository::repository_error::RepositoryError::NotFound(_) => {
                ServiceError::NotFound("Feedback not found".to_string())
            }
            other => other.into(),
        })
    }
}

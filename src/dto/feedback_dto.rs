use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dto::format_datetime_opt;
use crate::model::feedback::{Feedback, FeedbackPriority, FeedbackStatus};

use super::record_dto::Pagination;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitFeedbackRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 1000))]
    pub feedback: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFeedbackRequest {
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub feedback: String,
    pub status: FeedbackStatus,
    pub priority: FeedbackPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<&Feedback> for FeedbackDto {
    fn from(feedback: &Feedback) -> Self {
        FeedbackDto {
            id: feedback.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: feedback.name.clone(),
            email: feedback.email.clone(),
            feedback: feedback.feedback.clone(),
            status: feedback.status,
            priority: feedback.priority,
            created_at: format_datetime_opt(feedback.created_at),
            updated_at: format_datetime_opt(feedback.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedFeedback {
    pub id: String,
    pub submitted_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitFeedbackResponse {
    pub success: bool,
    pub message: String,
    pub data: SubmittedFeedback,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackListData {
    pub feedback: Vec<FeedbackDto>,
    pub pagination: Pagination,
    pub status_counts: HashMap<String, u64>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackListResponse {
    pub success: bool,
    pub data: FeedbackListData,
}

#[derive(Debug, Serialize)]
pub struct FeedbackUpdateResponse {
    pub success: bool,
    pub message: String,
    pub data: FeedbackDto,
}

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::dto::feedback_dto::{
    FeedbackDto, FeedbackListData, FeedbackListResponse, FeedbackUpdateResponse,
    SubmitFeedbackRequest, SubmitFeedbackResponse, SubmittedFeedback, UpdateFeedbackRequest,
};
use crate::dto::record_dto::Pagination;
use crate::dto::{format_datetime_opt, MessageResponse};
use crate::handler::{client_ip, user_agent};
use crate::model::feedback::{FeedbackPriority, FeedbackStatus};
use crate::repository::feedback_repo::FeedbackFilter;
use crate::service::feedback_service::FeedbackService;
use crate::util::error::HandlerError;

pub async fn submit_feedback_handler(
    State(service): State<Arc<FeedbackService>>,
    headers: HeaderMap,
    Json(payload): Json<SubmitFeedbackRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.feedback.trim().is_empty()
    {
        return Err(HandlerError::bad_request("All fields are required"));
    }
    if payload.validate().is_err() {
        return Err(HandlerError::bad_request("Invalid email format"));
    }
    let stored = service
        .submit(&payload, client_ip(&headers), user_agent(&headers))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(SubmitFeedbackResponse {
            success: true,
            message: "Feedback submitted successfully. Thank you for your valuable input!"
                .to_string(),
            data: SubmittedFeedback {
                id: stored.id.map(|id| id.to_hex()).unwrap_or_default(),
                submitted_at: format_datetime_opt(stored.created_at),
            },
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<FeedbackStatus>,
    pub priority: Option<FeedbackPriority>,
    pub search: Option<String>,
}

pub async fn list_feedback_handler(
    State(service): State<Arc<FeedbackService>>,
    Query(query): Query<FeedbackListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let filter = FeedbackFilter {
        status: query.status,
        priority: query.priority,
        search: query.search,
        page,
        limit,
    };
    let (items, total, status_counts) = service.list(&filter).await?;
    Ok(Json(FeedbackListResponse {
        success: true,
        data: FeedbackListData {
            feedback: items.iter().map(FeedbackDto::from).collect(),
            pagination: Pagination::new(page, limit, total),
            status_counts,
        },
    }))
}

pub async fn update_feedback_handler(
    State(service): State<Arc<FeedbackService>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateFeedbackRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let updated = service.update(&id, payload.status, payload.priority).await?;
    Ok(Json(FeedbackUpdateResponse {
        success: true,
        message: "Feedback updated successfully".to_string(),
        data: FeedbackDto::from(&updated),
    }))
}

pub async fn delete_feedback_handler(
    State(service): State<Arc<FeedbackService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete(&id).await?;
    Ok(Json(MessageResponse::ok("Feedback deleted successfully")))
}

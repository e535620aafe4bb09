use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use crate::dto::upload_dto::{UploadRequest, UploadResponse};
use crate::handler::{client_ip, user_agent};
use crate::middlewares::auth_middleware::CurrentUser;
use crate::service::upload_service::UploadService;
use crate::util::error::HandlerError;

pub async fn upload_toll_handler(
    State(service): State<Arc<UploadService>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UploadRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let result = service.upload_toll(payload, &user).await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: "Vehicle data uploaded and analyzed successfully".to_string(),
            data: result,
        }),
    ))
}

pub async fn upload_guest_handler(
    State(service): State<Arc<UploadService>>,
    headers: HeaderMap,
    Json(payload): Json<UploadRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let result = service
        .upload_guest(payload, client_ip(&headers), user_agent(&headers))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            success: true,
            message: "Guest data uploaded and analyzed successfully".to_string(),
            data: result,
        }),
    ))
}

use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::dto::admin_dto::{
    AdminGuestDataResponse, AdminStatisticsResponse, AdminTollDataResponse, AdminUserDto,
    TollOperatorsResponse, UserListResponse,
};
use crate::dto::record_dto::{GuestRecordDto, TollRecordDto};
use crate::dto::MessageResponse;
use crate::middlewares::auth_middleware::CurrentUser;
use crate::service::admin_service::AdminService;
use crate::util::error::HandlerError;

fn total_pages(total: u64, limit: u32) -> u64 {
    (total + limit as u64 - 1) / limit as u64
}

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

pub async fn list_users_handler(
    State(service): State<Arc<AdminService>>,
    Query(query): Query<UserListQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let (users, total) = service
        .list_users(query.search.as_deref(), page, limit)
        .await?;
    Ok(Json(UserListResponse {
        success: true,
        users: users.iter().map(AdminUserDto::from).collect(),
        total_pages: total_pages(total, limit),
        current_page: page,
        total,
    }))
}

pub async fn delete_user_handler(
    State(service): State<Arc<AdminService>>,
    Extension(CurrentUser(requester)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    service.delete_user(&requester, &id).await?;
    Ok(Json(MessageResponse::ok("User deleted successfully")))
}

pub async fn toll_operators_handler(
    State(service): State<Arc<AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let (operators, plazas) = service.toll_operators().await?;
    Ok(Json(TollOperatorsResponse {
        success: true,
        operators: operators.iter().map(AdminUserDto::from).collect(),
        plazas,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TollDataQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Plaza name; kept as `tollOperator` in the query string for the
    /// dashboard's dropdown contract
    pub toll_operator: Option<String>,
    pub search: Option<String>,
}

pub async fn toll_data_handler(
    State(service): State<Arc<AdminService>>,
    Query(query): Query<TollDataQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let (records, total) = service
        .toll_data(query.toll_operator, query.search, page, limit)
        .await?;
    Ok(Json(AdminTollDataResponse {
        success: true,
        data: records.iter().map(TollRecordDto::from).collect(),
        total_pages: total_pages(total, limit),
        current_page: page,
        total,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GuestDataQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
}

pub async fn guest_data_handler(
    State(service): State<Arc<AdminService>>,
    Query(query): Query<GuestDataQuery>,
) -> Result<impl IntoResponse, HandlerError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let (records, total) = service
        .guest_data(query.search.as_deref(), page, limit)
        .await?;
    Ok(Json(AdminGuestDataResponse {
        success: true,
        data: records.iter().map(GuestRecordDto::from).collect(),
        total_pages: total_pages(total, limit),
        current_page: page,
        total,
    }))
}

pub async fn admin_statistics_handler(
    State(service): State<Arc<AdminService>>,
) -> Result<impl IntoResponse, HandlerError> {
    let statistics = service.statistics().await?;
    Ok(Json(AdminStatisticsResponse {
        success: true,
        statistics,
    }))
}

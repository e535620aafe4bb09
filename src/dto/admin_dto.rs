use serde::Serialize;

use crate::dto::format_datetime_opt;
use crate::model::user::{User, UserRole};
use crate::repository::StatusCounts;

use super::record_dto::{GuestRecordDto, TollRecordDto};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserDto {
    pub id: String,
    pub username: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toll_plaza: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<&User> for AdminUserDto {
    fn from(user: &User) -> Self {
        AdminUserDto {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            username: user.username.clone(),
            role: user.role,
            toll_plaza: user.toll_plaza.clone(),
            is_active: user.is_active,
            last_login: format_datetime_opt(user.last_login),
            created_at: format_datetime_opt(user.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<AdminUserDto>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct TollOperatorsResponse {
    pub success: bool,
    pub operators: Vec<AdminUserDto>,
    /// Distinct plazas among active operators
    pub plazas: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTollDataResponse {
    pub success: bool,
    pub data: Vec<TollRecordDto>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGuestDataResponse {
    pub success: bool,
    pub data: Vec<GuestRecordDto>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatistics {
    pub total_users: u64,
    pub total_toll_data: u64,
    pub total_guest_data: u64,
    pub recent_toll_data: u64,
    pub recent_guest_data: u64,
    pub status_distribution: StatusCounts,
}

#[derive(Debug, Serialize)]
pub struct AdminStatisticsResponse {
    pub success: bool,
    pub statistics: AdminStatistics,
}

pub mod admin_dto;
pub mod auth_dto;
pub mod feedback_dto;
pub mod record_dto;
pub mod statistics_dto;
pub mod upload_dto;

use serde::Serialize;

/// Minimal `{success, message}` envelope for mutations with no payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok<T: Into<String>>(message: T) -> Self {
        MessageResponse {
            success: true,
            message: message.into(),
        }
    }
}

/// Renders a BSON datetime the way the API exposes timestamps.
pub fn format_datetime(dt: bson::DateTime) -> String {
    dt.to_chrono().to_rfc3339()
}

pub fn format_datetime_opt(dt: Option<bson::DateTime>) -> Option<String> {
    dt.map(format_datetime)
}

pub mod admin_router;
pub mod auth_router;
pub mod data_router;
pub mod feedback_router;
pub mod upload_router;

pub mod admin_service;
pub mod auth_service;
pub mod data_service;
pub mod feedback_service;
pub mod upload_service;

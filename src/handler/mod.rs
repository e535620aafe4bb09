pub mod admin_handler;
pub mod auth_handler;
pub mod data_handler;
pub mod feedback_handler;
pub mod upload_handler;

use axum::http::HeaderMap;

/// Best-effort client address from proxy headers. The service normally runs
/// behind a reverse proxy, so the socket address is not useful.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

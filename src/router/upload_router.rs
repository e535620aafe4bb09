use std::sync::Arc;

use axum::{middleware, routing::post, Router};

use crate::handler::upload_handler::{upload_guest_handler, upload_toll_handler};
use crate::middlewares::auth_middleware::{require_auth, AuthState};
use crate::service::upload_service::UploadService;

pub fn upload_router(service: Arc<UploadService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new().route("/api/upload/guest-data", post(upload_guest_handler));

    let authed = Router::new()
        .route("/api/upload/vehicle-data", post(upload_toll_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth));

    public.merge(authed).with_state(service)
}

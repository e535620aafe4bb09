use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::handler::feedback_handler::{
    delete_feedback_handler, list_feedback_handler, submit_feedback_handler,
    update_feedback_handler,
};
use crate::middlewares::auth_middleware::{require_admin, AuthState};
use crate::service::feedback_service::FeedbackService;

pub fn feedback_router(service: Arc<FeedbackService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new().route("/api/feedback", post(submit_feedback_handler));

    let admin = Router::new()
        .route("/api/feedback", get(list_feedback_handler))
        .route("/api/feedback/{id}", put(update_feedback_handler))
        .route("/api/feedback/{id}", delete(delete_feedback_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public.merge(admin).with_state(service)
}

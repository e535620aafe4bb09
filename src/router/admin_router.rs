use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};

use crate::handler::admin_handler::{
    admin_statistics_handler, delete_user_handler, guest_data_handler, list_users_handler,
    toll_data_handler, toll_operators_handler,
};
use crate::middlewares::auth_middleware::{require_admin, AuthState};
use crate::service::admin_service::AdminService;

pub fn admin_router(service: Arc<AdminService>, auth_state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/api/admin/users", get(list_users_handler))
        .route("/api/admin/users/{id}", delete(delete_user_handler))
        .route("/api/admin/toll-operators", get(toll_operators_handler))
        .route("/api/admin/toll-data", get(toll_data_handler))
        .route("/api/admin/guest-data", get(guest_data_handler))
        .route("/api/admin/statistics", get(admin_statistics_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin))
        .with_state(service)
}

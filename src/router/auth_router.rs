use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::handler::auth_handler::{
    change_password_handler, login_handler, profile_handler, register_handler,
};
use crate::middlewares::auth_middleware::{require_admin, require_auth, AuthState};
use crate::service::auth_service::AuthService;

pub fn auth_router(service: Arc<AuthService>, auth_state: Arc<AuthState>) -> Router {
    let public = Router::new().route("/api/auth/login", post(login_handler));

    let authed = Router::new()
        .route("/api/auth/profile", get(profile_handler))
        .route("/api/auth/change-password", put(change_password_handler))
        .route_layer(middleware::from_fn_with_state(
            auth_state.clone(),
            require_auth,
        ));

    let admin = Router::new()
        .route("/api/auth/register", post(register_handler))
        .route_layer(middleware::from_fn_with_state(auth_state, require_admin));

    public.merge(authed).merge(admin).with_state(service)
}

//! Bearer token authentication for protected routes.
//!
//! Authorization checks re-read the stored account on every request, so
//! disabling or deleting a user takes effect immediately even for tokens
//! that are still within their lifetime.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::model::user::{User, UserRole};
use crate::repository::user_repo::UserRepository;
use crate::util::error::HandlerError;
use crate::util::jwt::JwtTokenUtils;

/// The authenticated account, attached to request extensions by
/// [`require_auth`] and read by handlers via `Extension<CurrentUser>`.
#[derive(Clone)]
pub struct CurrentUser(pub User);

pub struct AuthState {
    pub jwt_utils: Arc<dyn JwtTokenUtils + Send + Sync>,
    pub user_repo: Arc<dyn UserRepository>,
}

// Takes the headers rather than the whole request so the future stays Send;
// the request body must not be borrowed across the repository await.
async fn authenticate(state: &AuthState, headers: &HeaderMap) -> Result<User, HandlerError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| HandlerError::unauthorized("No token, authorization denied"))?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| HandlerError::unauthorized("No token, authorization denied"))?;
    let claims = state
        .jwt_utils
        .validate_access_token(&token)
        .map_err(|_| HandlerError::unauthorized("Token is not valid"))?;

    let user_id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| HandlerError::unauthorized("Token is not valid"))?;
    let user = state
        .user_repo
        .find_by_id(&user_id)
        .await
        .map_err(|_| HandlerError::unauthorized("Token is not valid"))?
        .ok_or_else(|| HandlerError::unauthorized("Token is not valid"))?;

    if !user.is_active {
        debug!("Rejected token for disabled account {}", user.username);
        return Err(HandlerError::unauthorized("Account is disabled"));
    }
    Ok(user)
}

pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let user = authenticate(&state, req.headers()).await?;
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

/// Admin-only variant of [`require_auth`].
pub async fn require_admin(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, HandlerError> {
    let user = authenticate(&state, req.headers()).await?;
    match user.role {
        UserRole::Admin => {}
        UserRole::TollOperator => {
            return Err(HandlerError::forbidden(
                "Access denied. Admin privileges required.",
            ));
        }
    }
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<F: std::future::Future + Send>(_f: F) {}

    // axum's from_fn layer only accepts Send futures. These never run; they
    // exist so the build breaks if a non-Send borrow creeps back in.
    #[allow(dead_code)]
    fn require_auth_future_is_send(state: State<Arc<AuthState>>, req: Request<Body>, next: Next) {
        assert_send(require_auth(state, req, next));
    }

    #[allow(dead_code)]
    fn require_admin_future_is_send(state: State<Arc<AuthState>>, req: Request<Body>, next: Next) {
        assert_send(require_admin(state, req, next));
    }
}

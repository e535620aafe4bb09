use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::dto::auth_dto::{
    ChangePasswordRequest, LoginRequest, LoginResponse, ProfileDto, ProfileResponse,
    RegisterRequest, RegisterResponse, UserDto,
};
use crate::dto::MessageResponse;
use crate::middlewares::auth_middleware::CurrentUser;
use crate::service::auth_service::AuthService;
use crate::util::error::HandlerError;

fn validation_errors(e: &validator::ValidationErrors) -> Vec<String> {
    e.field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors
                .iter()
                .map(move |err| format!("{}: {}", field, err.code))
        })
        .collect()
}

pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.validate().is_err() {
        return Err(HandlerError::bad_request(
            "Please provide username and password",
        ));
    }
    let (token, user) = service.login(&payload).await?;
    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserDto::from(&user),
    }))
}

pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if let Err(e) = payload.validate() {
        return Err(HandlerError::validation(
            "Validation error",
            validation_errors(&e),
        ));
    }
    let user = service.register(&payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User created successfully".to_string(),
            user: UserDto::from(&user),
        }),
    ))
}

pub async fn profile_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> impl IntoResponse {
    Json(ProfileResponse {
        success: true,
        user: ProfileDto::from(&user),
    })
}

pub async fn change_password_handler(
    State(service): State<Arc<AuthService>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    if payload.validate().is_err() {
        return Err(HandlerError::bad_request(
            "Please provide current and new password",
        ));
    }
    service
        .change_password(&user, &payload.current_password, &payload.new_password)
        .await?;
    Ok(Json(MessageResponse::ok("Password changed successfully")))
}

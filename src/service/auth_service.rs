//! Account authentication and management.

use std::sync::Arc;

use tracing::{info, warn};

use crate::dto::auth_dto::{LoginRequest, RegisterRequest};
use crate::model::user::{User, UserRole};
use crate::repository::user_repo::UserRepository;
use crate::util::error::ServiceError;
use crate::util::jwt::JwtTokenUtils;
use crate::util::password::{PasswordUtils, PasswordUtilsImpl};

pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_utils: Arc<dyn JwtTokenUtils + Send + Sync>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_utils: Arc<dyn JwtTokenUtils + Send + Sync>,
    ) -> Self {
        AuthService {
            user_repo,
            jwt_utils,
        }
    }

    /// Verifies credentials and issues an access token. Disabled accounts
    /// and unknown usernames both come back as 401; the messages differ so
    /// a locked-out operator knows to contact an admin.
    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: &LoginRequest) -> Result<(String, User), ServiceError> {
        let user = self
            .user_repo
            .find_by_username(&request.username)
            .await?
            .ok_or_else(|| {
                warn!("Login attempt for unknown username");
                ServiceError::Unauthorized("Invalid credentials".to_string())
            })?;

        if !user.is_active {
            warn!("Login attempt for disabled account");
            return Err(ServiceError::Unauthorized(
                "Account is disabled. Please contact administrator.".to_string(),
            ));
        }

        let matches = PasswordUtilsImpl::verify_password(&request.password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        if !matches {
            warn!("Login attempt with wrong password");
            return Err(ServiceError::Unauthorized("Invalid credentials".to_string()));
        }

        let user_id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("Stored user has no id".to_string()))?;
        let token = self
            .jwt_utils
            .generate_access_token(&user_id.to_hex(), &user.username, user.role)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        self.user_repo
            .update_last_login(user_id, bson::DateTime::now())
            .await?;

        info!("Login successful");
        Ok((token, user))
    }

    /// Creates an account. Callers must already be authorized as admin.
    #[tracing::instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ServiceError> {
        let role = request.role.unwrap_or(UserRole::TollOperator);

        if role == UserRole::TollOperator
            && request
                .toll_plaza
                .as_deref()
                .map(str::is_empty)
                .unwrap_or(true)
        {
            return Err(ServiceError::InvalidInput(
                "Toll plaza is required for toll operators".to_string(),
            ));
        }

        if let Err(errors) = PasswordUtilsImpl::validate_password_strength(&request.password) {
            return Err(ServiceError::InvalidInput(errors.join(", ")));
        }

        if self
            .user_repo
            .find_by_username(&request.username)
            .await?
            .is_some()
        {
            return Err(ServiceError::InvalidInput(
                "Username already exists".to_string(),
            ));
        }

        let password_hash = PasswordUtilsImpl::hash_password(&request.password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;

        let user = User {
            id: None,
            username: request.username.clone(),
            password_hash,
            role,
            toll_plaza: if role == UserRole::TollOperator {
                request.toll_plaza.clone()
            } else {
                None
            },
            is_active: true,
            last_login: None,
            created_at: None,
            updated_at: None,
        };

        let created = self.user_repo.insert(user).await?;
        info!("User registered with role {}", created.role.as_str());
        Ok(created)
    }

    #[tracing::instrument(skip(self, user, current_password, new_password), fields(username = %user.username))]
    pub async fn change_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), ServiceError> {
        let matches = PasswordUtilsImpl::verify_password(current_password, &user.password_hash)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        if !matches {
            return Err(ServiceError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        if let Err(errors) = PasswordUtilsImpl::validate_password_strength(new_password) {
            return Err(ServiceError::InvalidInput(errors.join(", ")));
        }

        let user_id = user
            .id
            .ok_or_else(|| ServiceError::InternalError("Stored user has no id".to_string()))?;
        let password_hash = PasswordUtilsImpl::hash_password(new_password)
            .map_err(|e| ServiceError::InternalError(e.to_string()))?;
        self.user_repo
            .update_password(user_id, &password_hash)
            .await?;

        info!("Password changed");
        Ok(())
    }
}

use std::env;
use tracing::error;

use crate::config::ConfigError;

/// Bootstrap credentials for the first admin account, created at startup if
/// no user with this username exists yet.
#[derive(Debug, Clone)]
pub struct AdminUserConfig {
    pub username: String,
    pub password: String,
}

impl AdminUserConfig {
    /// Expected environment variables:
    /// - ADMIN_USERNAME
    /// - ADMIN_PASSWORD
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = env::var("ADMIN_USERNAME")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_USERNAME".to_string()))?;
        let password = env::var("ADMIN_PASSWORD")
            .map_err(|_| ConfigError::EnvVarNotFound("ADMIN_PASSWORD".to_string()))?;

        if username.is_empty() || password.is_empty() {
            error!("Admin bootstrap credentials must not be empty");
            return Err(ConfigError::ValidationError(
                "ADMIN_USERNAME and ADMIN_PASSWORD must not be empty".to_string(),
            ));
        }

        Ok(AdminUserConfig { username, password })
    }
}

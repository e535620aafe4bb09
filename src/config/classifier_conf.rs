use std::env;
use tracing::{error, info, warn};

use crate::config::ConfigError;

/// Configuration for the external tire classification service
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Base URL of the classification service, e.g. http://localhost:5000
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ClassifierConfig {
    /// Load classifier configuration from environment variables
    ///
    /// Expected environment variables:
    /// - CLASSIFIER_URL: base URL of the classification service
    ///   (defaults to http://localhost:5000)
    /// - CLASSIFIER_TIMEOUT: request timeout in seconds (defaults to 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading classifier configuration from environment variables");

        let base_url = env::var("CLASSIFIER_URL").unwrap_or_else(|_| {
            warn!("CLASSIFIER_URL not set, using default: http://localhost:5000");
            "http://localhost:5000".to_string()
        });

        let timeout_secs = env::var("CLASSIFIER_TIMEOUT")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .map_err(|_| {
                error!("Invalid CLASSIFIER_TIMEOUT value");
                ConfigError::InvalidValue("Invalid CLASSIFIER_TIMEOUT value".to_string())
            })?;

        let config = ClassifierConfig {
            base_url,
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "Classifier base URL cannot be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Classifier timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 30,
        }
    }
}

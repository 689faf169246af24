//! Environment variable handling and .env file management

use crate::{
    defaults,
    error::{AppError, Result},
};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load an env file. Variables already set in the process win.
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(true)
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "TARGET_URL" => {
                url::Url::parse(value)
                    .map_err(|e| AppError::config(format!("Invalid TARGET_URL value '{}': {}", value, e)))?;
            }
            "REQUEST_COUNT" => {
                let count: u32 = value
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid REQUEST_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > defaults::MAX_COUNT {
                    return Err(AppError::config(format!(
                        "REQUEST_COUNT must be between 1 and {}, got: {}",
                        defaults::MAX_COUNT,
                        count
                    )));
                }
            }
            "REQUEST_INTERVAL_MS" => {
                let interval: u64 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid REQUEST_INTERVAL_MS value '{}': {}", value, e))
                })?;
                if u128::from(interval) > defaults::MAX_INTERVAL.as_millis() {
                    return Err(AppError::config(format!(
                        "REQUEST_INTERVAL_MS cannot exceed {}, got: {}",
                        defaults::MAX_INTERVAL.as_millis(),
                        interval
                    )));
                }
            }
            "REQUEST_TIMEOUT_MS" => {
                let timeout: u64 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid REQUEST_TIMEOUT_MS value '{}': {}", value, e))
                })?;
                if timeout == 0 || u128::from(timeout) > defaults::MAX_TIMEOUT.as_millis() {
                    return Err(AppError::config(format!(
                        "REQUEST_TIMEOUT_MS must be between 1 and {}, got: {}",
                        defaults::MAX_TIMEOUT.as_millis(),
                        timeout
                    )));
                }
            }
            "ENABLE_COLOR" => {
                value
                    .to_lowercase()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported variables as (name, description, example)
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TARGET_URL", "URL to GET", "https://example.com/health"),
            ("REQUEST_COUNT", "Number of requests", "10"),
            ("REQUEST_INTERVAL_MS", "Pause between requests in ms", "500"),
            ("REQUEST_TIMEOUT_MS", "Per-request timeout in ms", "60000"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }
}

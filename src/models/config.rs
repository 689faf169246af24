//! Configuration data model and validation

use crate::{
    client::HttpUtils,
    config::EnvManager,
    defaults,
    error::{AppError, ErrorContext, Result},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL to GET on every iteration
    #[serde(default)]
    pub url: String,

    /// Number of requests to perform
    #[serde(default = "default_count")]
    pub count: u32,

    /// Pause between requests in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Per-request deadline in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Stop the run on the first keypress
    #[serde(default = "default_listen_for_keypress")]
    pub listen_for_keypress: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: String::new(),
            count: default_count(),
            interval_ms: default_interval_ms(),
            timeout_ms: default_timeout_ms(),
            enable_color: default_enable_color(),
            listen_for_keypress: default_listen_for_keypress(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for a URL with default values otherwise
    pub fn for_url<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Get the interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Get the timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        check_run_values(&self.url, self.count, self.interval(), self.timeout())
    }

    /// Merge settings from environment variables. Malformed values are
    /// configuration errors naming the variable.
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Some(url) = env_value("TARGET_URL")? {
            self.url = url;
        }
        if let Some(count) = env_value("REQUEST_COUNT")? {
            self.count = count.parse()?;
        }
        if let Some(interval) = env_value("REQUEST_INTERVAL_MS")? {
            self.interval_ms = interval.parse()?;
        }
        if let Some(timeout) = env_value("REQUEST_TIMEOUT_MS")? {
            self.timeout_ms = timeout.parse()?;
        }
        if let Some(color) = env_value("ENABLE_COLOR")? {
            self.enable_color = color.to_lowercase().parse()?;
        }

        Ok(())
    }

    /// Build the immutable value the scheduler runs from
    pub fn run_configuration(&self) -> Result<RunConfiguration> {
        self.validate()?;
        Ok(RunConfiguration {
            url: self.url.clone(),
            count: self.count,
            interval: self.interval(),
            timeout: self.timeout(),
        })
    }
}

/// Read a variable and check it with [`EnvManager::validate_env_var`].
/// Unset and blank variables are `None`.
fn env_value(name: &str) -> Result<Option<String>> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            EnvManager::validate_env_var(name, &value)?;
            Ok(Some(value.trim().to_string()))
        }
        _ => Ok(None),
    }
}

/// The four values a run is driven by. Created once after validation and
/// read-only for the lifetime of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    pub url: String,
    pub count: u32,
    pub interval: Duration,
    pub timeout: Duration,
}

impl RunConfiguration {
    /// Build a run configuration directly, bypassing the layered config.
    /// The same checks as [`Config::validate`] apply.
    pub fn new<S: Into<String>>(url: S, count: u32, interval: Duration, timeout: Duration) -> Result<Self> {
        let url = url.into();
        check_run_values(&url, count, interval, timeout)?;
        Ok(Self { url, count, interval, timeout })
    }
}

fn check_run_values(url: &str, count: u32, interval: Duration, timeout: Duration) -> Result<()> {
    if url.trim().is_empty() {
        return Err(AppError::config("A URL to request is required"));
    }

    HttpUtils::validate_url(url).with_context(|| format!("Invalid target URL '{}'", url))?;

    if count == 0 {
        return Err(AppError::config("Count must be greater than 0"));
    }

    if count > defaults::MAX_COUNT {
        return Err(AppError::config(format!("Count cannot exceed {}", defaults::MAX_COUNT)));
    }

    if interval > defaults::MAX_INTERVAL {
        return Err(AppError::config(format!(
            "Interval cannot exceed {} ms",
            defaults::MAX_INTERVAL.as_millis()
        )));
    }

    if timeout.is_zero() {
        return Err(AppError::config("Timeout must be greater than 0"));
    }

    if timeout > defaults::MAX_TIMEOUT {
        return Err(AppError::config(format!(
            "Timeout cannot exceed {} ms",
            defaults::MAX_TIMEOUT.as_millis()
        )));
    }

    Ok(())
}

fn default_count() -> u32 {
    defaults::DEFAULT_COUNT
}

fn default_interval_ms() -> u64 {
    defaults::DEFAULT_INTERVAL.as_millis() as u64
}

fn default_timeout_ms() -> u64 {
    defaults::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_enable_color() -> bool {
    defaults::DEFAULT_ENABLE_COLOR
}

fn default_listen_for_keypress() -> bool {
    true
}

//! Non-fatal configuration checks
//!
//! `Config::validate` rejects configurations that cannot run. The checks here
//! flag configurations that run but are probably not what the user meant.

use crate::{error::Result, models::Config};
use std::fmt;
use std::time::Duration;

/// Intervals below this are "short" when combined with a high count
const SHORT_INTERVAL: Duration = Duration::from_millis(100);

/// Counts above this are "high" when combined with a short interval
const HIGH_COUNT: u32 = 100;

/// Configuration validator with advisory rules
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, then collect advisory warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Self::validate_target_url(&config.url);
        warnings.extend(Self::validate_schedule(config));
        Ok(warnings)
    }

    fn validate_target_url(url: &str) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let Ok(parsed) = url::Url::parse(url) else {
            return warnings;
        };

        if parsed.scheme() == "http" {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!("URL '{}' uses plain HTTP", url),
            ));
        }

        let local = match parsed.host() {
            Some(url::Host::Ipv4(ip)) => ip.is_private() || ip.is_loopback() || ip.is_link_local(),
            Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
            Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            None => false,
        };
        if local {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("URL '{}' targets a private or local address", url),
            ));
        }

        warnings
    }

    fn validate_schedule(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.count > HIGH_COUNT && config.interval() < SHORT_INTERVAL {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "{} requests {} ms apart may put noticeable load on the target",
                    config.count, config.interval_ms
                ),
            ));
        }

        if config.count > 1 && config.timeout() < config.interval() {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!(
                    "Timeout of {} ms is shorter than the {} ms interval",
                    config.timeout_ms, config.interval_ms
                ),
            ));
        }

        warnings
    }
}

/// Validation warning levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationLevel {
    Info,
    Warning,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Info-level warnings are only shown in verbose mode
    pub fn is_shown(&self, verbose: bool) -> bool {
        verbose || self.level == ValidationLevel::Warning
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.message)
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{self, Cli},
    config::env::EnvManager,
    error::Result,
    models::Config,
};
use std::path::{Path, PathBuf};

/// Configuration parser that layers defaults, `.env`, the environment and
/// CLI arguments, lowest precedence first
pub struct ConfigParser {
    cli: Cli,
    env_file: PathBuf,
}

impl ConfigParser {
    /// Create a new configuration parser with CLI arguments
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            env_file: PathBuf::from(".env"),
        }
    }

    /// Read the env file from somewhere other than `./.env`
    pub fn with_env_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.env_file = path.as_ref().to_path_buf();
        self
    }

    /// Layer every source without validating the result. The URL may still
    /// be empty.
    pub fn build(&self) -> Result<Config> {
        let mut config = Config::default();

        EnvManager::load_env_file_from(&self.env_file)?;
        config.merge_from_env()?;
        self.apply_cli_overrides(&mut config);

        Ok(config)
    }

    /// Parse and validate the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let config = self.build()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        let cli = &self.cli;

        if let Some(url) = &cli.url {
            config.url = url.trim().to_string();
        }
        if let Some(count) = cli.count {
            config.count = count;
        }
        if let Some(interval) = cli.interval {
            config.interval_ms = interval;
        }
        if let Some(timeout) = cli.timeout {
            config.timeout_ms = timeout;
        }

        config.enable_color = match cli.color_override() {
            Some(forced) => forced,
            None => config.enable_color && cli::supports_color(),
        };

        // CLI-only settings
        config.listen_for_keypress = !cli.no_keypress;
        config.verbose = cli.verbose;
        config.debug = cli.debug;
    }
}

/// Display configuration summary for debug purposes
pub fn display_config_summary(config: &Config) -> String {
    [
        format!("URL: {}", config.url),
        format!("Count: {}", config.count),
        format!("Interval: {} ms", config.interval_ms),
        format!("Timeout: {} ms", config.timeout_ms),
        format!("Stop on keypress: {}", config.listen_for_keypress),
        format!("Color Output: {}", config.enable_color),
        format!("Verbose: {}", config.verbose),
        format!("Debug: {}", config.debug),
    ]
    .join("\n")
}

//! Repeat GET
//!
//! Issues an HTTP GET to a URL a configured number of times, waiting a fixed
//! interval between requests. Every request is bounded by a timeout and the
//! whole run can be stopped with a single keypress or Ctrl+C.

pub mod app;
pub mod cli;
pub mod config;
pub mod client;
pub mod error;
pub mod executor;
pub mod input;
pub mod logging;
pub mod models;
pub mod output;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use models::{Config, IterationOutcome, RunConfiguration, RunSummary};
pub use executor::{IterationScheduler, RunController, RunEvent, race_with_timeout};
pub use client::{HttpFetcher, RequestExecutor};
pub use output::{ConsoleSink, MemorySink, ReportingSink};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: &str = env!("GIT_COMMIT");
pub const TARGET_TRIPLE: &str = env!("TARGET_TRIPLE");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_COUNT: u32 = 1;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);
    pub const DEFAULT_ENABLE_COLOR: bool = true;

    pub const MAX_COUNT: u32 = 100_000;
    pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
    pub const MAX_TIMEOUT: Duration = Duration::from_secs(60 * 60);

    /// How often the blocking keypress poller re-checks for cancellation
    pub const KEYPRESS_POLL: Duration = Duration::from_millis(100);
}

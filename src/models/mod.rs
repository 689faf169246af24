//! Data models and structures for repeat-get

pub mod config;
pub mod outcome;

// Re-export main model types
pub use config::{Config, RunConfiguration};
pub use outcome::{IterationOutcome, RunSummary};

//! Request scheduling engine
//!
//! This module contains the pieces that turn a [`RunConfiguration`] into a
//! sequence of requests:
//! - `race`: one request against its deadline and the run's cancellation
//! - `scheduler`: the count/interval loop, as a lazy stream of [`RunEvent`]s
//! - `controller`: the scheduler raced against a user stop request
//!
//! [`RunConfiguration`]: crate::models::RunConfiguration

pub mod controller;
pub mod race;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod mock;

pub use controller::RunController;
pub use race::race_with_timeout;
pub use scheduler::IterationScheduler;

use crate::models::IterationOutcome;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Something the scheduler did, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    /// About to pause before iteration `index`
    Waiting { index: u32, interval: Duration },
    /// Iteration `index` of `total` is sending its request
    Starting { index: u32, total: u32, url: String },
    /// Iteration `index` resolved
    Outcome { index: u32, outcome: IterationOutcome },
}

//! Per-iteration outcomes and the run summary built from them

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How a single iteration ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IterationOutcome {
    /// The full response body was received
    Success { byte_length: u64 },
    /// The request did not finish within the per-request timeout
    TimedOut,
    /// The run was stopped while the request was in flight
    Cancelled,
    /// The request failed before the deadline
    Failed { message: String },
}

impl IterationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short label used by the structured logger
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Iterations configured
    pub planned: u32,
    /// Iterations that produced an outcome
    pub attempted: u32,
    pub succeeded: u32,
    pub timed_out: u32,
    pub failed: u32,
    pub cancelled: u32,
    /// Sum of body lengths over successful iterations
    pub total_bytes: u64,
    /// Wall-clock time of the whole run
    pub elapsed: Duration,
    /// True when the run ended because of a stop request
    pub stopped_early: bool,
}

impl RunSummary {
    pub fn new(planned: u32) -> Self {
        Self {
            planned,
            ..Self::default()
        }
    }

    /// Fold one outcome into the totals
    pub fn record(&mut self, outcome: &IterationOutcome) {
        self.attempted += 1;
        match outcome {
            IterationOutcome::Success { byte_length } => {
                self.succeeded += 1;
                self.total_bytes += byte_length;
            }
            IterationOutcome::TimedOut => self.timed_out += 1,
            IterationOutcome::Cancelled => self.cancelled += 1,
            IterationOutcome::Failed { .. } => self.failed += 1,
        }
    }

    /// Percentage of attempted iterations that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.attempted as f64) * 100.0
        }
    }

    /// True when every planned iteration produced an outcome
    pub fn is_complete(&self) -> bool {
        self.attempted == self.planned
    }
}

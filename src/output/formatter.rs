//! Core formatting traits and the plain text implementation

use crate::{
    executor::RunEvent,
    models::{IterationOutcome, RunSummary},
};
use std::time::Duration;

/// Turns run events into console lines
pub trait OutputFormatter: Send + Sync {
    /// Lines for a single event; may be empty
    fn format_event(&self, event: &RunEvent) -> Vec<String>;

    /// Lines for the end-of-run summary
    fn format_summary(&self, summary: &RunSummary) -> Vec<String>;

    /// A non-fatal configuration warning
    fn format_warning(&self, warning: &str) -> String;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Enable colored output
    pub enable_color: bool,
    /// Enable verbose mode with detailed information
    pub verbose_mode: bool,
    /// Per-request timeout, quoted in timeout notices
    pub timeout: Duration,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            timeout: crate::defaults::DEFAULT_TIMEOUT,
        }
    }
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    /// Create a new plain formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub(crate) fn waiting_line(interval: Duration) -> String {
        format!("Waiting for {} ms", interval.as_millis())
    }

    pub(crate) fn starting_line(index: u32, total: u32, url: &str) -> String {
        format!("Request {} of {} to {}", index, total, url)
    }

    pub(crate) fn awaiting_line() -> String {
        "Awaiting response".to_string()
    }

    pub(crate) fn success_line(byte_length: u64) -> String {
        format!("Response was {} bytes long", byte_length)
    }

    pub(crate) fn timeout_line(timeout: Duration) -> String {
        format!(
            "Failed to receive a response within the given timeout of {} ms",
            timeout.as_millis()
        )
    }

    pub(crate) fn cancelled_line(index: u32) -> String {
        format!("Request {} cancelled", index)
    }

    pub(crate) fn summary_line(summary: &RunSummary) -> String {
        let mut line = format!(
            "Completed {} of {} requests: {} succeeded, {} timed out, {} failed",
            summary.attempted, summary.planned, summary.succeeded, summary.timed_out, summary.failed
        );
        if summary.cancelled > 0 {
            line.push_str(&format!(", {} cancelled", summary.cancelled));
        }
        line
    }

    pub(crate) fn detail_line(summary: &RunSummary) -> String {
        format!(
            "Received {} bytes in {:.1}s ({:.1}% success)",
            summary.total_bytes,
            summary.elapsed.as_secs_f64(),
            summary.success_rate()
        )
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_event(&self, event: &RunEvent) -> Vec<String> {
        match event {
            RunEvent::Waiting { interval, .. } => vec![Self::waiting_line(*interval)],
            RunEvent::Starting { index, total, url } => {
                vec![Self::starting_line(*index, *total, url), Self::awaiting_line()]
            }
            RunEvent::Outcome { index, outcome } => match outcome {
                IterationOutcome::Success { byte_length } => {
                    vec![Self::success_line(*byte_length), String::new()]
                }
                IterationOutcome::TimedOut => vec![Self::timeout_line(self.options.timeout)],
                IterationOutcome::Cancelled => vec![Self::cancelled_line(*index)],
                IterationOutcome::Failed { message } => {
                    vec!["EXCEPTION:".to_string(), format!("\t {}", message)]
                }
            },
        }
    }

    fn format_summary(&self, summary: &RunSummary) -> Vec<String> {
        let mut lines = Vec::new();
        if summary.stopped_early {
            lines.push("Stopped by user".to_string());
        }
        lines.push(Self::summary_line(summary));
        if self.options.verbose_mode {
            lines.push(Self::detail_line(summary));
        }
        lines
    }

    fn format_warning(&self, warning: &str) -> String {
        format!("Warning: {}", warning)
    }
}

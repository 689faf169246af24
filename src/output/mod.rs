//! Output formatting and reporting
//!
//! The scheduler never prints. Every event it produces is handed to a
//! [`ReportingSink`], which decides where the lines go: the console for the
//! binary, memory for tests.

mod colored;
mod formatter;
mod sink;

pub use colored::{ColorScheme, ColoredFormatter};
pub use formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
pub use sink::{ConsoleSink, MemorySink};

use crate::{executor::RunEvent, models::RunSummary};
use std::time::Duration;

/// Receives run progress in order
pub trait ReportingSink {
    /// Called once per scheduler event, in the order events happen
    fn report(&mut self, event: &RunEvent);

    /// Called once after the last event
    fn finish(&mut self, summary: &RunSummary);
}

impl<S: ReportingSink + ?Sized> ReportingSink for &mut S {
    fn report(&mut self, event: &RunEvent) {
        (**self).report(event)
    }

    fn finish(&mut self, summary: &RunSummary) {
        (**self).finish(summary)
    }
}

impl<S: ReportingSink + ?Sized> ReportingSink for Box<S> {
    fn report(&mut self, event: &RunEvent) {
        (**self).report(event)
    }

    fn finish(&mut self, summary: &RunSummary) {
        (**self).finish(summary)
    }
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool, timeout: Duration) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            timeout,
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Create a plain text formatter for scripts/logs
    pub fn create_plain_formatter(timeout: Duration) -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false, timeout)
    }
}

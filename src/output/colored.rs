//! Colored formatter implementation with terminal color support

use super::formatter::{FormattingOptions, OutputFormatter, PlainFormatter};
use crate::{
    executor::RunEvent,
    models::{IterationOutcome, RunSummary},
};
use colored::*;

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::BrightBlack,
        }
    }
}

/// Colored formatter implementation
pub struct ColoredFormatter {
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    /// Create a new colored formatter with options
    pub fn new(options: FormattingOptions) -> Self {
        Self {
            options,
            color_scheme: ColorScheme::default(),
        }
    }

    /// Create with custom color scheme
    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self { options, color_scheme }
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_event(&self, event: &RunEvent) -> Vec<String> {
        let scheme = &self.color_scheme;
        match event {
            RunEvent::Waiting { interval, .. } => {
                vec![PlainFormatter::waiting_line(*interval).color(scheme.muted).to_string()]
            }
            RunEvent::Starting { index, total, url } => {
                vec![
                    format!(
                        "{} {}",
                        format!("Request {} of {}", index, total).color(scheme.header).bold(),
                        format!("to {}", url)
                    ),
                    PlainFormatter::awaiting_line().color(scheme.muted).to_string(),
                ]
            }
            RunEvent::Outcome { index, outcome } => match outcome {
                IterationOutcome::Success { byte_length } => vec![
                    format!("✓ {}", PlainFormatter::success_line(*byte_length)).color(scheme.success).to_string(),
                    String::new(),
                ],
                IterationOutcome::TimedOut => vec![
                    format!("⏱ {}", PlainFormatter::timeout_line(self.options.timeout))
                        .color(scheme.warning)
                        .to_string(),
                ],
                IterationOutcome::Cancelled => {
                    vec![PlainFormatter::cancelled_line(*index).color(scheme.muted).to_string()]
                }
                IterationOutcome::Failed { message } => vec![
                    "EXCEPTION:".color(scheme.error).bold().to_string(),
                    format!("\t {}", message).color(scheme.error).to_string(),
                ],
            },
        }
    }

    fn format_summary(&self, summary: &RunSummary) -> Vec<String> {
        let scheme = &self.color_scheme;
        let mut lines = Vec::new();
        if summary.stopped_early {
            lines.push("Stopped by user".color(scheme.warning).bold().to_string());
        }

        let color = if summary.attempted > 0 && summary.succeeded == summary.attempted {
            scheme.success
        } else if summary.succeeded > 0 {
            scheme.warning
        } else {
            scheme.error
        };
        lines.push(PlainFormatter::summary_line(summary).color(color).to_string());

        if self.options.verbose_mode {
            lines.push(PlainFormatter::detail_line(summary).color(scheme.muted).to_string());
        }
        lines
    }

    fn format_warning(&self, warning: &str) -> String {
        format!("{} {}", "Warning:".color(self.color_scheme.warning).bold(), warning)
    }
}

//! Command-line interface
//!
//! Both the modern flag syntax and the original `/c:` and `/i:` switches are
//! accepted. Legacy switches are rewritten into clap flags before parsing.

pub mod help;

pub use help::HelpSystem;

use crate::error::{AppError, Result};
use clap::Parser;
use std::ffi::OsString;
use std::str::FromStr;

pub const LEGACY_COUNT: &str = "/c:";
pub const LEGACY_INTERVAL: &str = "/i:";
pub const LEGACY_HELP: &str = "/?";

/// Repeatedly GET a URL with a pause between requests
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "repeat-get")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// URL to GET
    #[arg(value_name = "URL")]
    pub url: Option<String>,

    /// Number of requests to perform [default: 1]
    #[arg(short, long, value_name = "N")]
    pub count: Option<u32>,

    /// Pause between requests in milliseconds [default: 500]
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Per-request timeout in milliseconds [default: 60000]
    #[arg(short, long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Force colored output
    #[arg(long, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long)]
    pub debug: bool,

    /// Do not stop on a keypress (Ctrl+C still stops)
    #[arg(long)]
    pub no_keypress: bool,

    /// Print help
    #[arg(short = 'h', long)]
    pub help: bool,

    /// Print version
    #[arg(short = 'V', long)]
    pub version: bool,
}

impl Cli {
    /// Parse arguments, program name first. Any parse failure is a
    /// configuration error.
    pub fn parse_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = rewrite_legacy_args(args)?;
        Self::try_parse_from(args).map_err(|e| AppError::config(clap_message(&e)))
    }

    /// Parse the process arguments
    pub fn from_env() -> Result<Self> {
        Self::parse_args(std::env::args_os())
    }

    /// Whether to print help instead of running
    pub fn wants_help(&self) -> bool {
        self.help
    }

    /// Explicit color choice from flags, if any
    pub fn color_override(&self) -> Option<bool> {
        if self.color {
            Some(true)
        } else if self.no_color {
            Some(false)
        } else {
            None
        }
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        self.color_override().unwrap_or_else(supports_color)
    }
}

/// Rewrite `/c:N`, `/i:N` and `/?` into their clap equivalents. The first
/// argument is the program name and is passed through untouched. Any
/// argument starting with `/?` asks for help.
pub fn rewrite_legacy_args<I, T>(args: I) -> Result<Vec<OsString>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut rewritten: Vec<OsString> = args.next().into_iter().collect();

    for arg in args {
        let Some(text) = arg.to_str() else {
            rewritten.push(arg);
            continue;
        };

        let replacement = if text.trim().starts_with(LEGACY_HELP) {
            "--help".to_string()
        } else if let Some(value) = text.strip_prefix(LEGACY_COUNT) {
            legacy_flag::<u32>(LEGACY_COUNT, "--count", value, text)?
        } else if let Some(value) = text.strip_prefix(LEGACY_INTERVAL) {
            legacy_flag::<u64>(LEGACY_INTERVAL, "--interval", value, text)?
        } else {
            rewritten.push(arg);
            continue;
        };
        rewritten.push(replacement.into());
    }

    Ok(rewritten)
}

fn legacy_flag<N: FromStr>(switch: &str, flag: &str, value: &str, original: &str) -> Result<String> {
    if value.trim().parse::<N>().is_err() {
        return Err(AppError::config(format!(
            "Unable to parse the '{}' argument correctly as integer, found '{}'",
            switch, original
        )));
    }
    Ok(format!("{}={}", flag, value.trim()))
}

/// First line of a clap error without its `error: ` prefix
fn clap_message(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

/// Check if the terminal supports color output
pub(crate) fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    #[cfg(unix)]
    {
        true
    }
    #[cfg(not(unix))]
    {
        false
    }
}

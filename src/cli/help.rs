//! Usage and help text

use super::{LEGACY_COUNT, LEGACY_INTERVAL};
use crate::{config::env::EnvManager, defaults};
use colored::*;

/// Renders the usage text and the longer help page
#[derive(Debug, Default)]
pub struct HelpSystem;

impl HelpSystem {
    pub fn new() -> Self {
        Self
    }

    /// Short usage: how to call, what the arguments mean, one example.
    /// Printed for a bare invocation and after configuration errors.
    pub fn display_usage(&self, use_colors: bool) -> String {
        let mut usage = String::new();

        usage.push_str(&heading("USAGE:", use_colors));
        usage.push_str(&format!(
            "\t repeat-get url [{}] [{}]\n",
            LEGACY_COUNT, LEGACY_INTERVAL
        ));

        usage.push_str(&heading("where", use_colors));
        usage.push_str("\t url is the url you would like to GET from\n");
        usage.push_str(&format!(
            "\t {0} is the count of times to perform the request (default {0}{1})\n",
            LEGACY_COUNT,
            defaults::DEFAULT_COUNT
        ));
        usage.push_str(&format!(
            "\t {0} is the interval in milliseconds between requests (default {0}{1})\n",
            LEGACY_INTERVAL,
            defaults::DEFAULT_INTERVAL.as_millis()
        ));
        usage.push('\n');

        usage.push_str(&heading("example:", use_colors));
        let example = format!("repeat-get https://www.bing.com {}5 {}2000", LEGACY_COUNT, LEGACY_INTERVAL);
        if use_colors {
            usage.push_str(&format!("\t {}\n", example.bright_white()));
        } else {
            usage.push_str(&format!("\t {}\n", example));
        }
        usage.push_str("\t will visit www.bing.com 5 times with a 2000ms (2 second) gap between requests\n");

        usage
    }

    /// Full help: usage, flags and environment variables
    pub fn display_main_help(&self, use_colors: bool) -> String {
        let mut help = String::new();

        help.push_str(&self.format_header(use_colors));
        help.push('\n');
        help.push_str(&self.display_usage(use_colors));
        help.push('\n');
        help.push_str(&self.format_options_section(use_colors));
        help.push('\n');
        help.push_str(&self.format_environment_section(use_colors));

        help
    }

    fn format_header(&self, use_colors: bool) -> String {
        let title = "repeat-get";
        let subtitle = "Repeatedly GET a URL, one request at a time";
        if use_colors {
            format!(
                "{} {}\n{}\n",
                title.bright_cyan().bold(),
                crate::VERSION.green(),
                subtitle.bright_blue()
            )
        } else {
            format!("{} {}\n{}\n", title, crate::VERSION, subtitle)
        }
    }

    fn format_options_section(&self, use_colors: bool) -> String {
        let options = [
            ("-c, --count <N>", format!("Number of requests (same as {}N)", LEGACY_COUNT)),
            ("-i, --interval <MS>", format!("Pause between requests (same as {}MS)", LEGACY_INTERVAL)),
            (
                "-t, --timeout <MS>",
                format!("Per-request timeout (default {})", defaults::DEFAULT_TIMEOUT.as_millis()),
            ),
            ("--color / --no-color", "Force or disable colored output".to_string()),
            ("--verbose", "Log run progress and print a detailed summary".to_string()),
            ("--debug", "Structured debug logs on stderr".to_string()),
            ("--no-keypress", "Only Ctrl+C stops the run".to_string()),
            ("-h, --help, /?", "Print this help".to_string()),
            ("-V, --version", "Print version".to_string()),
        ];

        let mut section = heading("OPTIONS:", use_colors);
        for (flag, description) in options {
            if use_colors {
                section.push_str(&format!("  {:<22} {}\n", flag.yellow(), description));
            } else {
                section.push_str(&format!("  {:<22} {}\n", flag, description));
            }
        }
        section.push_str("\n  Any key stops the run early; the request in flight is abandoned.\n");
        section
    }

    fn format_environment_section(&self, use_colors: bool) -> String {
        let mut section = heading("ENVIRONMENT:", use_colors);
        for (var, description, example) in EnvManager::get_supported_env_vars() {
            if use_colors {
                section.push_str(&format!("  {:<22} {} (e.g. {})\n", var.cyan(), description, example));
            } else {
                section.push_str(&format!("  {:<22} {} (e.g. {})\n", var, description, example));
            }
        }
        section.push_str("\n  Values are also read from a .env file in the working directory.\n");
        section.push_str("  Command-line arguments take precedence over environment variables.\n");
        section
    }
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        format!("{}\n", text.bright_green().bold())
    } else {
        format!("{}\n", text)
    }
}

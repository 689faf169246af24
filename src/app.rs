//! Main application orchestration and execution

use crate::{
    cli::{Cli, HelpSystem},
    client::HttpFetcher,
    config::{display_config_summary, validate_config, ConfigParser},
    error::Result,
    executor::RunController,
    input::StopListener,
    logging::Logger,
    models::RunSummary,
    output::{ConsoleSink, OutputFormatterFactory},
};
use std::path::PathBuf;

/// Main application struct that coordinates all components
pub struct App {
    cli: Cli,
    env_file: Option<PathBuf>,
}

impl App {
    /// Create a new application instance with CLI configuration
    pub fn new(cli: Cli) -> Self {
        Self { cli, env_file: None }
    }

    /// Read configuration from a specific env file instead of `./.env`
    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.env_file = Some(path.into());
        self
    }

    /// Run the application.
    ///
    /// Returns the run summary, or `None` when only help, usage or version
    /// text was printed. Errors are configuration problems found before the
    /// first request; once a run starts it always completes.
    pub async fn run(self) -> Result<Option<RunSummary>> {
        let use_colors = self.cli.use_colors();

        if self.cli.version {
            println!(
                "{} {} ({} {}, built {})",
                crate::PKG_NAME,
                crate::VERSION,
                crate::GIT_COMMIT,
                crate::TARGET_TRIPLE,
                crate::BUILD_TIME
            );
            return Ok(None);
        }

        if self.cli.wants_help() {
            print!("{}", HelpSystem::new().display_main_help(use_colors));
            return Ok(None);
        }

        let mut parser = ConfigParser::new(self.cli);
        if let Some(path) = self.env_file {
            parser = parser.with_env_file(path);
        }
        let config = parser.build()?;

        if config.url.is_empty() {
            print!("{}", HelpSystem::new().display_usage(use_colors));
            return Ok(None);
        }

        let warnings = validate_config(&config)?;
        let run_config = config.run_configuration()?;

        colored::control::set_override(config.enable_color);
        let logger = Logger::with_config(crate::PKG_NAME, &config);
        logger.debug("configuration loaded")
            .field("config", &config)
            .field("summary", display_config_summary(&config))
            .log()
            .await;

        let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose, run_config.timeout);
        let mut sink = ConsoleSink::stdout(formatter);
        for warning in warnings.iter().filter(|w| w.is_shown(config.verbose)) {
            sink.warn(&warning.message);
        }

        let fetcher = HttpFetcher::new()?;
        let controller = RunController::new(run_config, fetcher, logger.clone());

        let mut listener = StopListener::start(
            config.listen_for_keypress,
            controller.cancellation_token(),
            logger.child("input"),
        );
        logger.info("stop listener ready")
            .field("keyboard", listener.watches_keyboard())
            .log()
            .await;

        let summary = controller.execute(&mut sink, listener.stopped()).await;
        listener.shutdown().await;

        if let Some(e) = sink.take_error() {
            logger.warn("console output failed").field("error", e.to_string()).log().await;
        }

        Ok(Some(summary))
    }
}

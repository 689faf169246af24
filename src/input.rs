//! Stop requests from the user
//!
//! A run stops early on Ctrl+C or, when stdin is a terminal, on any key.
//! Keys are read by a blocking crossterm poll loop on tokio's blocking pool.
//! The loop watches the run's cancellation token so it exits once the run is
//! over, and the terminal leaves raw mode when it does.

use crate::{defaults, error::Result, logging::Logger};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal,
    tty::IsTty,
};
use std::future;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Restores cooked mode when dropped
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Blocks until a key is pressed (`true`) or `cancel` fires (`false`)
fn watch_keyboard(cancel: CancellationToken) -> Result<bool> {
    let _raw = RawModeGuard::enable()?;
    while !cancel.is_cancelled() {
        if event::poll(defaults::KEYPRESS_POLL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(true);
                }
            }
        }
    }
    Ok(false)
}

/// Resolves on Ctrl+C. Never resolves where the signal cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        future::pending::<()>().await;
    }
}

/// Listens for Ctrl+C and, optionally, a keypress
pub struct StopListener {
    keypress: Option<JoinHandle<Result<bool>>>,
    logger: Logger,
}

impl StopListener {
    /// Start listening. The keyboard is only watched when
    /// `listen_for_keypress` is set and stdin is a terminal.
    pub fn start(listen_for_keypress: bool, cancel: CancellationToken, logger: Logger) -> Self {
        let keypress = (listen_for_keypress && std::io::stdin().is_tty())
            .then(|| tokio::task::spawn_blocking(move || watch_keyboard(cancel)));
        Self { keypress, logger }
    }

    /// Whether a keypress can stop the run
    pub fn watches_keyboard(&self) -> bool {
        self.keypress.is_some()
    }

    /// Resolves when the user asks to stop
    pub async fn stopped(&mut self) {
        loop {
            let Some(handle) = self.keypress.as_mut() else {
                return interrupted().await;
            };

            let joined = tokio::select! {
                _ = interrupted() => return,
                joined = handle => joined,
            };
            self.keypress = None;

            match joined {
                Ok(Ok(true)) => return,
                Ok(Ok(false)) => {}
                Ok(Err(e)) => {
                    self.logger.warn("keyboard unavailable").error_info(&e).log().await;
                }
                Err(e) => {
                    self.logger.warn("keyboard listener failed").field("error", e.to_string()).log().await;
                }
            }
        }
    }

    /// Wait for the keyboard loop to exit. The run's token must already be
    /// cancelled, otherwise this waits for a keypress.
    pub async fn shutdown(self) {
        if let Some(handle) = self.keypress {
            if let Ok(Err(e)) = handle.await {
                self.logger.debug("keyboard listener ended with error").error_info(&e).log().await;
            }
        }
    }
}

/// Convenience for callers that only need the stop future
pub async fn wait_for_stop(listen_for_keypress: bool, cancel: &CancellationToken) {
    let (logger, _) = Logger::buffered("input", crate::logging::LogLevel::Error);
    let mut listener = StopListener::start(listen_for_keypress, cancel.clone(), logger);
    listener.stopped().await;
}

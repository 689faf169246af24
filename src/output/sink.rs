//! Concrete reporting sinks

use super::{OutputFormatter, ReportingSink};
use crate::{
    executor::RunEvent,
    models::{IterationOutcome, RunSummary},
};
use std::io::{self, Write};

/// Line terminator for console output. The terminal may be in raw mode
/// while a run is listening for keypresses, so a bare `\n` is not enough.
const LINE_END: &str = "\r\n";

/// Writes formatted events to a terminal or any other writer
pub struct ConsoleSink<W: Write> {
    writer: W,
    formatter: Box<dyn OutputFormatter>,
    error: Option<io::Error>,
}

impl ConsoleSink<io::Stdout> {
    /// Sink on standard output
    pub fn stdout(formatter: Box<dyn OutputFormatter>) -> Self {
        Self::new(io::stdout(), formatter)
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(writer: W, formatter: Box<dyn OutputFormatter>) -> Self {
        Self {
            writer,
            formatter,
            error: None,
        }
    }

    /// Print a configuration warning ahead of the run
    pub fn warn(&mut self, warning: &str) {
        let line = self.formatter.format_warning(warning);
        self.write_lines(std::iter::once(line));
    }

    /// First write error seen, if any. Later writes are skipped once one fails.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_lines(&mut self, lines: impl IntoIterator<Item = String>) {
        if self.error.is_some() {
            return;
        }
        let result = lines
            .into_iter()
            .try_for_each(|line| write!(self.writer, "{}{}", line, LINE_END))
            .and_then(|_| self.writer.flush());
        if let Err(e) = result {
            self.error = Some(e);
        }
    }
}

impl<W: Write> ReportingSink for ConsoleSink<W> {
    fn report(&mut self, event: &RunEvent) {
        let lines = self.formatter.format_event(event);
        self.write_lines(lines);
    }

    fn finish(&mut self, summary: &RunSummary) {
        let lines = self.formatter.format_summary(summary);
        self.write_lines(lines);
    }
}

/// Keeps everything in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Vec<RunEvent>,
    summary: Option<RunSummary>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Outcomes only, in iteration order
    pub fn outcomes(&self) -> Vec<IterationOutcome> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Outcome { outcome, .. } => Some(outcome.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }
}

impl ReportingSink for MemorySink {
    fn report(&mut self, event: &RunEvent) {
        self.events.push(event.clone());
    }

    fn finish(&mut self, summary: &RunSummary) {
        self.summary = Some(summary.clone());
    }
}

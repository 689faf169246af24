//! Top-level run control: the scheduler raced against a stop request

use super::{IterationScheduler, RunEvent};
use crate::{
    client::RequestExecutor,
    logging::Logger,
    models::{RunConfiguration, RunSummary},
    output::ReportingSink,
};
use futures::StreamExt;
use std::future::Future;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Owns the run's cancellation token and drives one run to completion
pub struct RunController<E> {
    config: RunConfiguration,
    executor: E,
    cancel: CancellationToken,
    logger: Logger,
}

impl<E: RequestExecutor> RunController<E> {
    pub fn new(config: RunConfiguration, executor: E, logger: Logger) -> Self {
        Self {
            config,
            executor,
            cancel: CancellationToken::new(),
            logger,
        }
    }

    /// A handle on the run's token. Stop listeners use it to learn that the
    /// run is over; cancelling it stops the run.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run every iteration, reporting each event to `sink` as it happens.
    ///
    /// `stop` resolves when the user asks to stop. Whichever of the scheduler
    /// and `stop` finishes first cancels the token; the scheduler is always
    /// drained before this returns, so no request outlives the call.
    pub async fn execute<S, F>(self, sink: &mut S, stop: F) -> RunSummary
    where
        S: ReportingSink + ?Sized,
        F: Future<Output = ()>,
    {
        let Self { config, executor, cancel, logger } = self;
        let started = Instant::now();
        let mut summary = RunSummary::new(config.count);

        let session_id = logger.start_session().await;
        logger.add_context_field("url", &config.url).await;
        logger.info("run started")
            .field("count", config.count)
            .field("interval_ms", config.interval.as_millis() as u64)
            .field("timeout_ms", config.timeout.as_millis() as u64)
            .log()
            .await;

        let scheduler = IterationScheduler::new(config, executor, cancel.clone())
            .with_logger(logger.child("scheduler"));

        let stopped_early = {
            let events = scheduler.events();
            tokio::pin!(events);

            let drive = async {
                while let Some(event) = events.next().await {
                    if let RunEvent::Outcome { outcome, .. } = &event {
                        summary.record(outcome);
                    }
                    sink.report(&event);
                }
            };
            tokio::pin!(drive);
            tokio::pin!(stop);

            let stopped = tokio::select! {
                biased;
                _ = &mut drive => false,
                _ = &mut stop => {
                    cancel.cancel();
                    true
                }
            };

            if stopped {
                // Let the scheduler observe the cancellation and finish
                drive.await;
            }
            stopped
        };

        // Releases the stop listener when the run ended on its own
        cancel.cancel();

        summary.elapsed = started.elapsed();
        summary.stopped_early = stopped_early;

        logger.info("run finished")
            .field("session", &session_id)
            .field("stopped_early", stopped_early)
            .summary(&summary)
            .log()
            .await;

        sink.finish(&summary);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::{Behavior, MockExecutor};
    use crate::logging::LogLevel;
    use crate::models::IterationOutcome;
    use crate::output::MemorySink;
    use std::time::Duration;

    fn controller(count: u32, interval_ms: u64, executor: MockExecutor) -> RunController<MockExecutor> {
        let config = RunConfiguration::new(
            "http://example.test",
            count,
            Duration::from_millis(interval_ms),
            Duration::from_millis(1000),
        )
        .unwrap();
        let (logger, _) = Logger::buffered("controller", LogLevel::Error);
        RunController::new(config, executor, logger)
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_to_completion() {
        let executor = MockExecutor::always(Behavior::Succeed(100));
        let controller = controller(3, 0, executor);
        let token = controller.cancellation_token();
        let mut sink = MemorySink::new();

        let summary = controller.execute(&mut sink, std::future::pending()).await;

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 3);
        assert_eq!(summary.total_bytes, 300);
        assert!(!summary.stopped_early);
        assert!(summary.is_complete());
        assert_eq!(sink.outcomes().len(), 3);
        assert_eq!(sink.summary(), Some(&summary));
        // The token is released once the run is over
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_request_cancels_and_drains() {
        let executor = MockExecutor::always(Behavior::Hang);
        let controller = controller(5, 0, executor.clone());
        let mut sink = MemorySink::new();

        let stop = tokio::time::sleep(Duration::from_millis(300));
        let summary = controller.execute(&mut sink, stop).await;

        assert!(summary.stopped_early);
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(sink.outcomes(), vec![IterationOutcome::Cancelled]);
        assert_eq!(executor.in_flight(), 0);
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_wait_emits_no_extra_outcome() {
        let executor = MockExecutor::always(Behavior::Succeed(1));
        let controller = controller(3, 5_000, executor.clone());
        let mut sink = MemorySink::new();

        let stop = tokio::time::sleep(Duration::from_millis(1_000));
        let summary = controller.execute(&mut sink, stop).await;

        assert!(summary.stopped_early);
        assert_eq!(summary.attempted, 1);
        assert_eq!(summary.succeeded, 1);
        assert!(!summary.is_complete());
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_and_failures_do_not_end_run() {
        let executor = MockExecutor::new(vec![
            Behavior::Hang,
            Behavior::Fail("refused".into()),
            Behavior::Succeed(4),
        ]);
        let controller = controller(3, 10, executor);
        let mut sink = MemorySink::new();

        let summary = controller.execute(&mut sink, std::future::pending()).await;

        assert_eq!(summary.timed_out, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
        assert!(!summary.stopped_early);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancel_through_token() {
        let executor = MockExecutor::always(Behavior::SucceedAfter(Duration::from_millis(100), 1));
        let controller = controller(10, 0, executor);
        let token = controller.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            token.cancel();
        });

        let mut sink = MemorySink::new();
        let summary = controller.execute(&mut sink, std::future::pending()).await;

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.attempted, 3);
    }
}

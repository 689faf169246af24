//! Iteration scheduling: count, interval, ordering

use super::{race::race_with_timeout, RunEvent};
use crate::{
    client::RequestExecutor,
    logging::Logger,
    models::RunConfiguration,
};
use async_stream::stream;
use futures::Stream;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Drives the request loop for one run.
///
/// Consumed by [`IterationScheduler::events`]; a scheduler cannot be restarted.
pub struct IterationScheduler<E> {
    config: RunConfiguration,
    executor: E,
    cancel: CancellationToken,
    logger: Option<Logger>,
}

impl<E: RequestExecutor> IterationScheduler<E> {
    pub fn new(config: RunConfiguration, executor: E, cancel: CancellationToken) -> Self {
        Self {
            config,
            executor,
            cancel,
            logger: None,
        }
    }

    /// Log per-iteration timing through `logger`
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Lazily run the iterations, yielding events in order.
    ///
    /// Nothing happens until the stream is polled. For each iteration the
    /// stream yields an optional `Waiting`, then `Starting`, then exactly one
    /// `Outcome`. It ends after `count` outcomes, when the token is cancelled
    /// before an iteration starts, during a wait, or after a `Cancelled` outcome.
    pub fn events(self) -> impl Stream<Item = RunEvent> {
        let Self { config, executor, cancel, logger } = self;

        stream! {
            for index in 1..=config.count {
                if cancel.is_cancelled() {
                    break;
                }

                if index > 1 && !config.interval.is_zero() {
                    yield RunEvent::Waiting { index, interval: config.interval };

                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(config.interval) => {}
                    }
                }

                yield RunEvent::Starting {
                    index,
                    total: config.count,
                    url: config.url.clone(),
                };

                let started = Instant::now();
                let outcome = race_with_timeout(
                    |scope| {
                        let executor = &executor;
                        let url = config.url.as_str();
                        async move { executor.fetch(url, &scope).await }
                    },
                    config.timeout,
                    &cancel,
                )
                .await;

                if let Some(logger) = &logger {
                    logger.debug("iteration finished")
                        .outcome(index, &outcome)
                        .field("elapsed_ms", started.elapsed().as_millis() as u64)
                        .log()
                        .await;
                }

                let stop = outcome.is_cancelled();
                yield RunEvent::Outcome { index, outcome };

                if stop {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::{Behavior, MockExecutor};
    use crate::logging::LogLevel;
    use crate::models::IterationOutcome;
    use futures::StreamExt;
    use proptest::prelude::*;
    use std::time::Duration;

    fn run_config(count: u32, interval_ms: u64, timeout_ms: u64) -> RunConfiguration {
        RunConfiguration::new(
            "http://example.test",
            count,
            Duration::from_millis(interval_ms),
            Duration::from_millis(timeout_ms),
        )
        .unwrap()
    }

    fn outcomes(events: &[RunEvent]) -> Vec<(u32, IterationOutcome)> {
        events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Outcome { index, outcome } => Some((*index, outcome.clone())),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_successes_without_waits() {
        let executor = MockExecutor::always(Behavior::Succeed(100));
        let scheduler = IterationScheduler::new(run_config(3, 0, 1000), executor.clone(), CancellationToken::new());

        let started = tokio::time::Instant::now();
        let events: Vec<RunEvent> = scheduler.events().collect().await;

        assert_eq!(
            outcomes(&events),
            vec![
                (1, IterationOutcome::Success { byte_length: 100 }),
                (2, IterationOutcome::Success { byte_length: 100 }),
                (3, IterationOutcome::Success { byte_length: 100 }),
            ]
        );
        assert!(!events.iter().any(|e| matches!(e, RunEvent::Waiting { .. })));
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(executor.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_then_wait_then_success() {
        let executor = MockExecutor::new(vec![Behavior::Hang, Behavior::Succeed(50)]);
        let scheduler = IterationScheduler::new(run_config(2, 500, 1000), executor.clone(), CancellationToken::new());

        let start = tokio::time::Instant::now();
        let events: Vec<RunEvent> = scheduler.events().collect().await;

        assert_eq!(
            outcomes(&events),
            vec![
                (1, IterationOutcome::TimedOut),
                (2, IterationOutcome::Success { byte_length: 50 }),
            ]
        );

        let calls = executor.call_times();
        assert_eq!(calls[0] - start, Duration::ZERO);
        // timeout of the first call plus the interval
        let second = calls[1] - start;
        assert!(second >= Duration::from_millis(1500), "second call at {:?}", second);
        assert!(second < Duration::from_millis(1600), "second call at {:?}", second);
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_order_per_iteration() {
        let executor = MockExecutor::always(Behavior::Succeed(1));
        let scheduler = IterationScheduler::new(run_config(2, 250, 1000), executor, CancellationToken::new());
        let events: Vec<RunEvent> = scheduler.events().collect().await;

        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                RunEvent::Waiting { .. } => "wait",
                RunEvent::Starting { .. } => "start",
                RunEvent::Outcome { .. } => "outcome",
            })
            .collect();
        assert_eq!(kinds, vec!["start", "outcome", "wait", "start", "outcome"]);

        assert_eq!(
            events[2],
            RunEvent::Waiting { index: 2, interval: Duration::from_millis(250) }
        );
        assert_eq!(
            events[3],
            RunEvent::Starting { index: 2, total: 2, url: "http://example.test".to_string() }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_separates_iterations() {
        let executor = MockExecutor::always(Behavior::Succeed(1));
        let scheduler = IterationScheduler::new(run_config(4, 300, 1000), executor.clone(), CancellationToken::new());
        let _: Vec<RunEvent> = scheduler.events().collect().await;

        let calls = executor.call_times();
        assert_eq!(calls.len(), 4);
        for pair in calls.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(300));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_the_run() {
        let executor = MockExecutor::new(vec![
            Behavior::Fail("connection reset".into()),
            Behavior::Hang,
            Behavior::Succeed(9),
        ]);
        let scheduler = IterationScheduler::new(run_config(3, 0, 100), executor, CancellationToken::new());
        let events: Vec<RunEvent> = scheduler.events().collect().await;
        let results = outcomes(&events);

        assert_eq!(results.len(), 3);
        assert!(matches!(&results[0].1, IterationOutcome::Failed { message } if message.contains("connection reset")));
        assert_eq!(results[1].1, IterationOutcome::TimedOut);
        assert_eq!(results[2].1, IterationOutcome::Success { byte_length: 9 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_in_flight_stops_after_cancelled_outcome() {
        let executor = MockExecutor::always(Behavior::Hang);
        let token = CancellationToken::new();
        let scheduler = IterationScheduler::new(run_config(5, 0, 60_000), executor.clone(), token.clone());

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let events: Vec<RunEvent> = scheduler.events().collect().await;
        assert_eq!(outcomes(&events), vec![(1, IterationOutcome::Cancelled)]);
        assert_eq!(executor.call_count(), 1);
        assert_eq!(executor.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_ends_without_outcome() {
        let executor = MockExecutor::always(Behavior::Succeed(1));
        let token = CancellationToken::new();
        let scheduler = IterationScheduler::new(run_config(3, 10_000, 1000), executor.clone(), token.clone());

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2_000)).await;
            canceller.cancel();
        });

        let events: Vec<RunEvent> = scheduler.events().collect().await;
        assert_eq!(outcomes(&events).len(), 1);
        assert!(matches!(events.last(), Some(RunEvent::Waiting { index: 2, .. })));
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pre_cancelled_token_produces_nothing() {
        let executor = MockExecutor::always(Behavior::Succeed(1));
        let token = CancellationToken::new();
        token.cancel();
        let scheduler = IterationScheduler::new(run_config(3, 0, 1000), executor.clone(), token);

        let events: Vec<RunEvent> = scheduler.events().collect().await;
        assert!(events.is_empty());
        assert_eq!(executor.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_is_lazy() {
        let executor = MockExecutor::always(Behavior::Succeed(1));
        let scheduler = IterationScheduler::new(run_config(3, 0, 1000), executor.clone(), CancellationToken::new());
        let events = scheduler.events();
        tokio::pin!(events);

        assert_eq!(executor.call_count(), 0);
        let first = events.next().await;
        assert!(matches!(first, Some(RunEvent::Starting { index: 1, .. })));
        assert_eq!(executor.call_count(), 0);
        let second = events.next().await;
        assert!(matches!(second, Some(RunEvent::Outcome { index: 1, .. })));
        assert_eq!(executor.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logger_records_each_iteration() {
        let (logger, buffer) = Logger::buffered("scheduler", LogLevel::Debug);
        let executor = MockExecutor::always(Behavior::Succeed(3));
        let scheduler = IterationScheduler::new(run_config(2, 0, 1000), executor, CancellationToken::new())
            .with_logger(logger);
        let _: Vec<RunEvent> = scheduler.events().collect().await;

        let lines = buffer.lock().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.contains("outcome=\"success\"")));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_uncancelled_run_yields_count_ordered_outcomes(
            count in 1u32..20,
            interval_ms in 0u64..50,
            script in proptest::collection::vec(0u8..3, 1..8),
        ) {
            let behaviors: Vec<Behavior> = script
                .iter()
                .map(|kind| match kind {
                    0 => Behavior::Succeed(10),
                    1 => Behavior::Fail("boom".into()),
                    _ => Behavior::Hang,
                })
                .collect();

            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();

            let events = runtime.block_on(async {
                let scheduler = IterationScheduler::new(
                    run_config(count, interval_ms, 100),
                    MockExecutor::new(behaviors),
                    CancellationToken::new(),
                );
                scheduler.events().collect::<Vec<_>>().await
            });

            let indices: Vec<u32> = outcomes(&events).into_iter().map(|(index, _)| index).collect();
            prop_assert_eq!(indices, (1..=count).collect::<Vec<_>>());
        }
    }
}

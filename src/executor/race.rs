//! Racing one request against its deadline and the run's cancellation

use crate::{error::Result, models::IterationOutcome};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Run `op` against a `timeout` deadline and the `cancel` token.
///
/// `op` receives a child of `cancel` scoped to this call. The child is
/// cancelled when the deadline passes and whenever this function returns, so
/// an operation that ignores the dropped future still observes the abort.
///
/// First to finish wins:
/// - `cancel` fires: `Cancelled`
/// - `op` completes: `Success` or `Failed` (an op reporting cancellation maps to `Cancelled`)
/// - deadline passes: `TimedOut`
pub async fn race_with_timeout<F, Fut>(
    op: F,
    timeout: Duration,
    cancel: &CancellationToken,
) -> IterationOutcome
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<u64>>,
{
    if cancel.is_cancelled() {
        return IterationOutcome::Cancelled;
    }

    let scope = cancel.child_token();
    let _scope_guard = scope.clone().drop_guard();

    let operation = op(scope.clone());
    tokio::pin!(operation);
    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    tokio::select! {
        biased;

        _ = cancel.cancelled() => IterationOutcome::Cancelled,

        result = &mut operation => match result {
            Ok(byte_length) => IterationOutcome::Success { byte_length },
            Err(e) if e.is_cancellation() => IterationOutcome::Cancelled,
            Err(e) => IterationOutcome::Failed { message: e.to_string() },
        },

        _ = &mut deadline => {
            scope.cancel();
            IterationOutcome::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    #[tokio::test(start_paused = true)]
    async fn test_completed_operation_is_success() {
        let token = CancellationToken::new();
        let outcome = race_with_timeout(|_| async { Ok(100) }, Duration::from_secs(1), &token).await;
        assert_eq!(outcome, IterationOutcome::Success { byte_length: 100 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_operation_carries_message() {
        let token = CancellationToken::new();
        let outcome = race_with_timeout(
            |_| async { Err(AppError::network("connection refused")) },
            Duration::from_secs(1),
            &token,
        )
        .await;
        match outcome {
            IterationOutcome::Failed { message } => assert!(message.contains("connection refused")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_operation_times_out_and_is_aborted() {
        let token = CancellationToken::new();
        let observed_abort = Arc::new(AtomicBool::new(false));
        let flag = observed_abort.clone();
        let started = tokio::time::Instant::now();

        let outcome = race_with_timeout(
            |scope| async move {
                // Spawned so the abort is observable after the op future is dropped
                tokio::spawn(async move {
                    scope.cancelled().await;
                    flag.store(true, Ordering::SeqCst);
                });
                std::future::pending::<Result<u64>>().await
            },
            Duration::from_millis(1000),
            &token,
        )
        .await;

        assert_eq!(outcome, IterationOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(1000));
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        assert!(observed_abort.load(Ordering::SeqCst));
        // The parent token is untouched by a per-iteration timeout
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_during_operation() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            canceller.cancel();
        });

        let outcome = race_with_timeout(
            |_| std::future::pending::<Result<u64>>(),
            Duration::from_secs(60),
            &token,
        )
        .await;
        assert_eq!(outcome, IterationOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_starts_operation() {
        let token = CancellationToken::new();
        token.cancel();
        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();

        let outcome = race_with_timeout(
            |_| async move {
                flag.store(true, Ordering::SeqCst);
                Ok(1)
            },
            Duration::from_secs(1),
            &token,
        )
        .await;

        assert_eq!(outcome, IterationOutcome::Cancelled);
        assert!(!started.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_operation_reporting_cancellation_maps_to_cancelled() {
        let token = CancellationToken::new();
        let outcome = race_with_timeout(
            |_| async { Err(AppError::cancelled("aborted")) },
            Duration::from_secs(1),
            &token,
        )
        .await;
        assert_eq!(outcome, IterationOutcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scope_is_cancelled_after_success() {
        let token = CancellationToken::new();
        let mut captured = None;
        let outcome = race_with_timeout(
            |scope| {
                captured = Some(scope.clone());
                async { Ok(5) }
            },
            Duration::from_secs(1),
            &token,
        )
        .await;

        assert!(outcome.is_success());
        assert!(captured.unwrap().is_cancelled());
        assert!(!token.is_cancelled());
    }
}

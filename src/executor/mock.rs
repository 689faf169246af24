//! Scripted request executor for scheduler and controller tests

use crate::{
    client::RequestExecutor,
    error::{AppError, Result},
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What a single scripted call does
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Return this many bytes immediately
    Succeed(u64),
    /// Return this many bytes after a delay
    SucceedAfter(Duration, u64),
    /// Fail with a network error
    Fail(String),
    /// Never complete unless cancelled
    Hang,
}

/// Executor that follows a script, repeating the last behavior when it runs out
#[derive(Debug, Clone)]
pub struct MockExecutor {
    script: Arc<Mutex<VecDeque<Behavior>>>,
    fallback: Behavior,
    calls: Arc<Mutex<Vec<Instant>>>,
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter however the call ends, including when
/// its future is dropped mid-flight.
struct InFlight(Arc<AtomicUsize>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockExecutor {
    pub fn new(script: Vec<Behavior>) -> Self {
        let fallback = script.last().cloned().unwrap_or(Behavior::Succeed(0));
        Self {
            script: Arc::new(Mutex::new(script.into())),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn always(behavior: Behavior) -> Self {
        Self::new(vec![behavior])
    }

    /// Instants at which each call started
    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Calls started but not yet finished or dropped
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    fn next_behavior(&self) -> Behavior {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl RequestExecutor for MockExecutor {
    async fn fetch(&self, _url: &str, cancel: &CancellationToken) -> Result<u64> {
        self.calls.lock().unwrap().push(Instant::now());
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = InFlight(self.in_flight.clone());

        match self.next_behavior() {
            Behavior::Succeed(bytes) => Ok(bytes),
            Behavior::SucceedAfter(delay, bytes) => {
                tokio::select! {
                    _ = cancel.cancelled() => Err(AppError::cancelled("mock aborted")),
                    _ = tokio::time::sleep(delay) => Ok(bytes),
                }
            }
            Behavior::Fail(message) => Err(AppError::network(message)),
            Behavior::Hang => {
                cancel.cancelled().await;
                Err(AppError::cancelled("mock aborted"))
            }
        }
    }
}

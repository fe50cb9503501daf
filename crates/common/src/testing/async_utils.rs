//! Polling and timeout helpers for tests that observe background work
//!
//! Cache refresh loops run on their own task, so tests wait for an observable
//! condition instead of sleeping for a fixed guess.

use std::future::Future;
use std::time::{Duration, Instant};

/// Run a future under a deadline, returning `Err(Elapsed)` if it overruns
///
/// ```no_run
/// use std::time::Duration;
///
/// use itemcache_common::testing::timeout_ok;
///
/// # async fn demo() {
/// let value = timeout_ok(Duration::from_millis(100), async { 42 }).await;
/// assert_eq!(value.ok(), Some(42));
/// # }
/// ```
pub async fn timeout_ok<F, T>(duration: Duration, fut: F) -> Result<T, tokio::time::error::Elapsed>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut).await
}

/// Poll an async condition every `interval` until it holds or `timeout` passes
///
/// Returns whether the condition was observed to hold.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();

    loop {
        if condition().await {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}

/// Blocking counterpart of [`poll_until`] for tests running on plain threads
pub fn poll_until_blocking<F>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = Instant::now();

    loop {
        if condition() {
            return true;
        }
        if start.elapsed() >= timeout {
            return false;
        }
        std::thread::sleep(interval);
    }
}

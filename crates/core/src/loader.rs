//! Loader contracts
//!
//! A loader produces the next value for a cache. It receives a
//! [`CancellationToken`] that is cancelled when the attempt exceeds its load
//! timeout, and it may be invoked again after an abandoned attempt, so it
//! must tolerate overlapping with its own earlier call.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio_util::sync::CancellationToken;

use crate::error::{LoadError, LoadResult};

/// Asynchronous value source
#[async_trait]
pub trait Loader<T>: Send + Sync {
    /// Produce a fresh value
    async fn load(&self, cancel: CancellationToken) -> LoadResult<T>;
}

/// Synchronous value source, run on the calling thread
pub trait BlockingLoader<T>: Send + Sync {
    /// Produce a fresh value
    fn load(&self, cancel: &CancellationToken) -> LoadResult<T>;
}

impl<T, F> BlockingLoader<T> for F
where
    F: Fn(&CancellationToken) -> LoadResult<T> + Send + Sync,
{
    fn load(&self, cancel: &CancellationToken) -> LoadResult<T> {
        self(cancel)
    }
}

/// Adapts a closure returning a future into a [`Loader`]
pub(crate) struct FnLoader<F>(pub(crate) F);

#[async_trait]
impl<T, F, Fut> Loader<T> for FnLoader<F>
where
    T: Send + 'static,
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = LoadResult<T>> + Send + 'static,
{
    async fn load(&self, cancel: CancellationToken) -> LoadResult<T> {
        (self.0)(cancel).await
    }
}

/// Run one async attempt with panic capture and an optional timeout
///
/// On timeout the attempt's token is cancelled so a cooperative loader can
/// stop early; the attempt itself is dropped.
pub(crate) async fn run_async<T>(
    loader: &Arc<dyn Loader<T>>,
    load_timeout: Option<Duration>,
) -> Result<T, LoadError> {
    let cancel = CancellationToken::new();
    let attempt = AssertUnwindSafe(loader.load(cancel.clone())).catch_unwind();

    let outcome = match load_timeout {
        Some(limit) => match tokio::time::timeout(limit, attempt).await {
            Ok(outcome) => outcome,
            Err(_) => {
                cancel.cancel();
                return Err(LoadError::TimedOut(limit));
            }
        },
        None => attempt.await,
    };

    match outcome {
        Ok(result) => result.map_err(LoadError::Failed),
        Err(payload) => Err(LoadError::from_panic(payload.as_ref())),
    }
}

/// Run one blocking attempt on the current thread with panic capture
///
/// The caller owns `cancel` and cancels it if it stops waiting for the
/// attempt.
pub(crate) fn run_blocking<T>(
    loader: &Arc<dyn BlockingLoader<T>>,
    cancel: &CancellationToken,
) -> Result<T, LoadError> {
    match std::panic::catch_unwind(AssertUnwindSafe(|| loader.load(cancel))) {
        Ok(result) => result.map_err(LoadError::Failed),
        Err(payload) => Err(LoadError::from_panic(payload.as_ref())),
    }
}

//! Background refresh loop
//!
//! One task per cache. Each cycle loads, publishes on success, then waits
//! for whichever comes first: the delay, an invalidation, or shutdown.
//! Invalidation uses a wake token that is re-armed right before each load,
//! so an invalidation arriving during a load cancels the following wait
//! instead of being lost. Shutdown is a separate token that is never re-armed.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::state::RefreshState;
use crate::config::PushCacheConfig;
use crate::error::LoadError;
use crate::loader::{self, Loader};
use crate::sink::{LoadErrorSink, PUSH_LOAD_FAILED};
use crate::slot::{Freshness, SlotCell};
use crate::stats::MetricsCollector;
use crate::sync::InitLatch;

/// State shared between a push cache handle and its refresh task
pub(super) struct RefreshShared<T> {
    pub(super) name: String,
    pub(super) slot: SlotCell<T>,
    pub(super) loader: Arc<dyn Loader<T>>,
    pub(super) sink: Arc<dyn LoadErrorSink>,
    pub(super) config: PushCacheConfig,
    pub(super) state: Mutex<RefreshState>,
    pub(super) wake: Mutex<CancellationToken>,
    pub(super) shutdown: CancellationToken,
    pub(super) initialized: InitLatch,
    pub(super) metrics: MetricsCollector,
}

impl<T> RefreshShared<T> {
    pub(super) fn state(&self) -> RefreshState {
        *self.state.lock()
    }

    /// Move to `Disposed` and stop the task; returns whether this call did it
    pub(super) fn dispose(&self) -> bool {
        {
            let mut state = self.state.lock();
            if !state.can_transition_to(RefreshState::Disposed) {
                return false;
            }
            *state = RefreshState::Disposed;
        }
        self.shutdown.cancel();
        self.wake();
        self.initialized.close();
        true
    }

    /// Cut the current wait short
    pub(super) fn wake(&self) {
        self.wake.lock().cancel();
    }

    fn wake_token(&self) -> CancellationToken {
        self.wake.lock().clone()
    }

    fn rearm_wake(&self) {
        let mut wake = self.wake.lock();
        if wake.is_cancelled() {
            *wake = CancellationToken::new();
        }
    }

    /// Publish a loaded value unless the cache was disposed meanwhile
    fn publish(&self, value: T) {
        let mut state = self.state.lock();
        if state.is_terminal() {
            debug!(cache = %self.name, "discarding value loaded after disposal");
            return;
        }

        let slot = self.slot.publish(value, Freshness::UntilReplaced, None, Instant::now());
        self.metrics.record_load();

        if state.can_transition_to(RefreshState::Steady) {
            *state = RefreshState::Steady;
            self.initialized.open();
            info!(cache = %self.name, generation = slot.generation(), "push cache initialized");
        } else {
            debug!(cache = %self.name, generation = slot.generation(), "push cache refreshed");
        }
    }

    fn report(&self, err: &LoadError) {
        self.metrics.record_load_failure();
        self.sink.load_failed(&self.name, err, PUSH_LOAD_FAILED);
    }
}

/// Refresh until shutdown is cancelled
pub(super) async fn run<T>(shared: Arc<RefreshShared<T>>)
where
    T: Send + Sync + 'static,
{
    info!(cache = %shared.name, "refresh loop started");

    while !shared.shutdown.is_cancelled() {
        shared.rearm_wake();

        match loader::run_async(&shared.loader, shared.config.load_timeout).await {
            Ok(value) => shared.publish(value),
            Err(err) => shared.report(&err),
        }

        let delay = if shared.state() == RefreshState::Steady {
            shared.config.refresh_period
        } else {
            shared.config.initial_retry_delay
        };
        let wake = shared.wake_token();

        tokio::select! {
            biased;
            () = shared.shutdown.cancelled() => break,
            () = wake.cancelled() => {
                debug!(cache = %shared.name, "refresh wait interrupted by invalidation");
            }
            () = tokio::time::sleep(delay) => {}
        }
    }

    info!(cache = %shared.name, "refresh loop stopped");
}

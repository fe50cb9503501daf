//! Eagerly refreshed cache
//!
//! A push cache owns one background task that keeps replacing its value on a
//! fixed period. Reads never load; they return a copy of whatever the last
//! successful refresh published, or the placeholder until the first one
//! lands. Until then the task retries with `initial_retry_delay` between
//! attempts.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use itemcache::{LoadResult, PushCache, SharedCloner};
//! use tokio_util::sync::CancellationToken;
//!
//! async fn fetch_rates(_cancel: CancellationToken) -> LoadResult<Vec<u64>> {
//!     Ok(vec![1, 2, 3])
//! }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = PushCache::builder(Vec::new())
//!     .refresh_period(Duration::from_secs(30))
//!     .cloner(SharedCloner)
//!     .load_with(fetch_rates)
//!     .build()?;
//!
//! cache.initialize().await?;
//! let rates = cache.get()?;
//! # let _ = rates;
//! cache.shutdown(Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

mod refresh;
mod state;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use itemcache_common::error::CommonError;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

pub use state::RefreshState;

use self::refresh::RefreshShared;
use crate::clone::DeepCloner;
use crate::config::PushCacheConfig;
use crate::error::{CacheError, CacheResult, LoadResult};
use crate::loader::{FnLoader, Loader};
use crate::sink::{LoadErrorSink, TracingErrorSink};
use crate::slot::{Freshness, SlotCell};
use crate::stats::{CacheStats, MetricsCollector};
use crate::sync::{InitLatch, LatchOutcome};

/// Single-value cache refreshed by a background task
///
/// Dropping the cache disposes it. Use [`shutdown`](Self::shutdown) to also
/// wait for the task to finish.
pub struct PushCache<T> {
    shared: Arc<RefreshShared<T>>,
    cloner: Arc<dyn DeepCloner<T>>,
    runtime: Handle,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> PushCache<T>
where
    T: Send + Sync + 'static,
{
    /// Start building a cache that serves `placeholder` until the first load
    pub fn builder(placeholder: T) -> PushCacheBuilder<T> {
        PushCacheBuilder::new(placeholder)
    }

    /// Spawn the refresh task without waiting for it
    ///
    /// Only the first call has an effect. Does nothing once disposed.
    #[instrument(skip(self), fields(cache = %self.shared.name))]
    pub fn start_initialization(&self) {
        let mut state = self.shared.state.lock();
        if !state.can_transition_to(RefreshState::Initializing) {
            return;
        }
        *state = RefreshState::Initializing;

        let handle = self.runtime.spawn(refresh::run(Arc::clone(&self.shared)));
        *self.task.lock() = Some(handle);
        info!(
            refresh_period_ms = self.shared.config.refresh_period.as_millis() as u64,
            "push cache initialization started"
        );
    }

    /// Start initialization and block until the first successful load
    ///
    /// Must not be called from a thread driving the cache's own runtime.
    ///
    /// # Errors
    /// Returns [`CacheError::Disposed`] if the cache is disposed before a
    /// value is loaded.
    pub fn initialize_blocking(&self) -> CacheResult<()> {
        self.start_initialization();
        Self::settled(self.shared.initialized.wait_blocking(None))
    }

    /// Start initialization and wait for the first successful load
    ///
    /// # Errors
    /// Returns [`CacheError::Disposed`] if the cache is disposed before a
    /// value is loaded.
    pub async fn initialize(&self) -> CacheResult<()> {
        self.start_initialization();
        Self::settled(self.shared.initialized.wait(None).await)
    }

    /// Block for up to `timeout` waiting for the first successful load
    ///
    /// Returns `Ok(false)` when the timeout elapses or the cache is disposed
    /// before loading.
    ///
    /// # Errors
    /// Returns [`CacheError::InitializationNotStarted`] if initialization was
    /// never started.
    pub fn await_initialization(&self, timeout: Duration) -> CacheResult<bool> {
        self.ensure_started()?;
        Ok(self.shared.initialized.wait_blocking(Some(timeout)) == LatchOutcome::Opened)
    }

    /// Suspending variant of [`await_initialization`](Self::await_initialization)
    ///
    /// # Errors
    /// Returns [`CacheError::InitializationNotStarted`] if initialization was
    /// never started.
    pub async fn await_initialization_async(&self, timeout: Duration) -> CacheResult<bool> {
        self.ensure_started()?;
        Ok(self.shared.initialized.wait(Some(timeout)).await == LatchOutcome::Opened)
    }

    /// Copy of the most recently published value
    ///
    /// Never waits and never loads.
    ///
    /// # Errors
    /// Returns [`CacheError::Clone`] if the value cannot be copied.
    pub fn get(&self) -> CacheResult<T> {
        let slot = self.shared.slot.load();
        if slot.is_placeholder() {
            self.shared.metrics.record_miss();
        } else {
            self.shared.metrics.record_hit();
        }
        Ok(self.cloner.deep_clone(slot.value())?)
    }

    /// Ask the refresh task to reload now instead of at the end of its wait
    ///
    /// Reads keep returning the current value until the reload succeeds. If
    /// a load is running, the wait after it is skipped.
    #[instrument(skip(self), fields(cache = %self.shared.name))]
    pub fn invalidate(&self) {
        self.shared.metrics.record_invalidation();
        self.shared.wake();
        debug!("push cache refresh requested");
    }

    /// Stop refreshing
    ///
    /// Idempotent. A load in progress is allowed to finish but its result is
    /// discarded. Pending initialization waiters are released.
    #[instrument(skip(self), fields(cache = %self.shared.name))]
    pub fn dispose(&self) {
        if self.shared.dispose() {
            info!("push cache disposed");
        }
    }

    /// Dispose and wait up to `join_timeout` for the refresh task to exit
    ///
    /// # Errors
    /// - `CommonError::Timeout` if the task is still running a load when the
    ///   timeout elapses
    /// - `CommonError::Internal` if the task panicked
    pub async fn shutdown(&self, join_timeout: Duration) -> CacheResult<()> {
        self.dispose();

        let handle = self.task.lock().take();
        let Some(handle) = handle else {
            return Ok(());
        };

        match tokio::time::timeout(join_timeout, handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(join_err)) => Err(CommonError::internal_with_context(
                format!("refresh task failed: {}", join_err),
                self.shared.name.clone(),
            )
            .into()),
            Err(_) => Err(CommonError::timeout("push cache shutdown", join_timeout).into()),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> RefreshState {
        self.shared.state()
    }

    /// Whether a loaded value has replaced the placeholder
    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.is_open()
    }

    /// Counter snapshot
    pub fn stats(&self) -> CacheStats {
        self.shared.metrics.snapshot()
    }

    /// Name used in logs and error sink reports
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Validated configuration
    pub fn config(&self) -> &PushCacheConfig {
        &self.shared.config
    }

    fn ensure_started(&self) -> CacheResult<()> {
        if self.shared.state() == RefreshState::Uninitialized {
            return Err(CacheError::InitializationNotStarted);
        }
        Ok(())
    }

    fn settled(outcome: LatchOutcome) -> CacheResult<()> {
        match outcome {
            LatchOutcome::Opened => Ok(()),
            LatchOutcome::Closed | LatchOutcome::TimedOut => Err(CacheError::Disposed),
        }
    }
}

impl<T> Drop for PushCache<T> {
    fn drop(&mut self) {
        if self.shared.dispose() {
            debug!(cache = %self.shared.name, "push cache disposed on drop");
        }
    }
}

/// Builder for [`PushCache`]
pub struct PushCacheBuilder<T> {
    placeholder: T,
    name: Option<String>,
    config: PushCacheConfig,
    loader: Option<Arc<dyn Loader<T>>>,
    cloner: Option<Arc<dyn DeepCloner<T>>>,
    sink: Arc<dyn LoadErrorSink>,
    runtime: Option<Handle>,
}

impl<T> PushCacheBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn new(placeholder: T) -> Self {
        Self {
            placeholder,
            name: None,
            config: PushCacheConfig::default(),
            loader: None,
            cloner: None,
            sink: Arc::new(TracingErrorSink),
            runtime: None,
        }
    }

    /// Name used in logs and error sink reports
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PushCacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the delay between successful refreshes
    pub fn refresh_period(mut self, period: Duration) -> Self {
        self.config.refresh_period = period;
        self
    }

    /// Bound each load attempt (`None` for no bound)
    pub fn load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.load_timeout = timeout;
        self
    }

    /// Copy strategy applied to every value handed out
    pub fn cloner<D>(mut self, cloner: D) -> Self
    where
        D: DeepCloner<T> + 'static,
    {
        self.cloner = Some(Arc::new(cloner));
        self
    }

    /// Loader run by the refresh task
    pub fn loader(mut self, loader: Arc<dyn Loader<T>>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Loader from a closure returning a future
    pub fn load_with<F, Fut>(self, load: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LoadResult<T>> + Send + 'static,
    {
        self.loader(Arc::new(FnLoader(load)))
    }

    /// Receiver for load failures (defaults to [`TracingErrorSink`])
    pub fn error_sink(mut self, sink: Arc<dyn LoadErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Runtime the refresh task is spawned on
    ///
    /// Defaults to the runtime current at `build` time.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Validate the configuration and create the cache
    ///
    /// The task is not spawned until initialization is started.
    ///
    /// # Errors
    /// - `CacheError::Common(CommonError::Config)` for an invalid
    ///   configuration, a missing cloner or loader, or no runtime
    /// - [`CacheError::Clone`] if the placeholder cannot be copied
    pub fn build(self) -> CacheResult<PushCache<T>> {
        self.config.validate()?;

        let cloner = self
            .cloner
            .ok_or_else(|| CacheError::config_field("clone_strategy", "no cloner configured"))?;
        let loader =
            self.loader.ok_or_else(|| CacheError::config_field("loader", "no loader configured"))?;
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|e| {
                CacheError::config_field("runtime", format!("no Tokio runtime available: {}", e))
            })?,
        };
        cloner.deep_clone(&self.placeholder)?;

        let name = self.name.unwrap_or_else(|| std::any::type_name::<T>().to_string());
        info!(
            cache = %name,
            strategy = %cloner.strategy(),
            refresh_period_ms = self.config.refresh_period.as_millis() as u64,
            "push cache created"
        );

        let shared = Arc::new(RefreshShared {
            name,
            slot: SlotCell::new(self.placeholder, Freshness::UntilReplaced, None),
            loader,
            sink: self.sink,
            config: self.config,
            state: Mutex::new(RefreshState::Uninitialized),
            wake: Mutex::new(CancellationToken::new()),
            shutdown: CancellationToken::new(),
            initialized: InitLatch::new(),
            metrics: MetricsCollector::default(),
        });

        Ok(PushCache { shared, cloner, runtime, task: Mutex::new(None) })
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for push.
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::clone::SharedCloner;
    use crate::error::BoxedError;

    fn counting_cache(calls: Arc<AtomicU32>) -> PushCache<u32> {
        PushCache::builder(0_u32)
            .refresh_period(Duration::from_secs(60))
            .cloner(SharedCloner)
            .load_with(move |_cancel| {
                let calls = Arc::clone(&calls);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Ok::<u32, BoxedError>(100 + 25 * n)
                }
            })
            .build()
            .expect("valid cache")
    }

    /// Validates `PushCache` lifecycle transitions.
    ///
    /// Assertions:
    /// - Ensures the state starts `Uninitialized` and reads the placeholder.
    /// - Ensures `initialize` moves to `Steady` with the loaded value.
    /// - Ensures `dispose` moves to `Disposed` and is idempotent.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_lifecycle() {
        let cache = counting_cache(Arc::new(AtomicU32::new(0)));
        assert_eq!(cache.state(), RefreshState::Uninitialized);
        assert_eq!(cache.get().expect("placeholder"), 0);

        cache.initialize().await.expect("initialized");
        assert_eq!(cache.state(), RefreshState::Steady);
        assert!(cache.is_initialized());
        assert_eq!(cache.get().expect("loaded"), 125);

        cache.dispose();
        cache.dispose();
        assert_eq!(cache.state(), RefreshState::Disposed);
        assert_eq!(cache.get().expect("last value"), 125);
    }

    /// Validates `PushCache::start_initialization` behavior for repeat calls.
    ///
    /// Assertions:
    /// - Confirms only one refresh task runs, so a long period yields one load.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_start_is_idempotent() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache = counting_cache(Arc::clone(&calls));

        cache.start_initialization();
        cache.start_initialization();
        cache.initialize().await.expect("initialized");
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        cache.shutdown(Duration::from_secs(1)).await.expect("clean shutdown");
    }

    /// Validates `PushCache::await_initialization_async` behavior before
    /// initialization was started.
    ///
    /// Assertions:
    /// - Ensures the call fails with `InitializationNotStarted`.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_await_requires_start() {
        let cache = counting_cache(Arc::new(AtomicU32::new(0)));

        let result = cache.await_initialization_async(Duration::from_millis(10)).await;
        assert!(matches!(result, Err(CacheError::InitializationNotStarted)));
    }

    /// Validates `PushCache::initialize` behavior after disposal.
    ///
    /// Assertions:
    /// - Ensures initializing a disposed cache fails with `Disposed`.
    /// - Ensures no load is attempted.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_initialize_after_dispose() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache = counting_cache(Arc::clone(&calls));

        cache.dispose();
        assert!(matches!(cache.initialize().await, Err(CacheError::Disposed)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Validates `PushCacheBuilder::build` behavior without a runtime.
    ///
    /// Assertions:
    /// - Ensures building outside a runtime without a handle is a
    ///   configuration error naming `runtime`.
    #[test]
    fn test_build_requires_runtime() {
        let result = PushCache::builder(0_u32)
            .cloner(SharedCloner)
            .load_with(|_cancel| async { Ok::<u32, BoxedError>(1) })
            .build();

        match result {
            Err(CacheError::Common(err)) => assert_eq!(err.field(), Some("runtime")),
            other => panic!("expected runtime config error, got {:?}", other.err()),
        }
    }
}

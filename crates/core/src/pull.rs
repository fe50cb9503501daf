//! On-demand cache with time-to-live expiry and single-flight reloads
//!
//! A read serves the current slot while it is fresh. Once it expires, one
//! reader takes the [`SingleFlightGate`] and reloads; readers that cannot
//! take the gate within the slot's retry budget get the current (stale)
//! value instead of queueing. Freshness is checked again after the gate is
//! acquired, so a reader that waited behind a successful reload serves that
//! result instead of loading a second time.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use itemcache::{LoadResult, PullCache, SharedCloner};
//!
//! fn fetch_rate() -> LoadResult<u64> {
//!     Ok(42)
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cache = PullCache::builder(0_u64)
//!     .caching_period(Duration::from_secs(30))
//!     .cloner(SharedCloner)
//!     .load_blocking_with(|_cancel| fetch_rate())
//!     .build()?;
//!
//! let rate = cache.get()?;
//! # let _ = rate;
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use itemcache_common::{Clock, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::clone::DeepCloner;
use crate::config::PullCacheConfig;
use crate::error::{CacheError, CacheResult, LoadError, LoadResult};
use crate::loader::{self, BlockingLoader, FnLoader, Loader};
use crate::sink::{LoadErrorSink, TracingErrorSink, PULL_LOAD_FAILED};
use crate::slot::{CacheSlot, Freshness, SlotCell};
use crate::stats::{CacheStats, MetricsCollector};
use crate::sync::SingleFlightGate;

/// Loaders available to a pull cache; at least one is always present
enum Loaders<T> {
    Async(Arc<dyn Loader<T>>),
    Blocking(Arc<dyn BlockingLoader<T>>),
    Both(Arc<dyn Loader<T>>, Arc<dyn BlockingLoader<T>>),
}

impl<T> Loaders<T> {
    fn blocking(&self) -> Option<&Arc<dyn BlockingLoader<T>>> {
        match self {
            Self::Blocking(loader) | Self::Both(_, loader) => Some(loader),
            Self::Async(_) => None,
        }
    }
}

/// Lazily loaded single-value cache with TTL expiry
pub struct PullCache<T, C = SystemClock> {
    name: String,
    slot: SlotCell<T>,
    gate: SingleFlightGate,
    loaders: Loaders<T>,
    cloner: Arc<dyn DeepCloner<T>>,
    sink: Arc<dyn LoadErrorSink>,
    config: PullCacheConfig,
    clock: C,
    metrics: MetricsCollector,
}

impl<T> PullCache<T>
where
    T: Send + Sync + 'static,
{
    /// Start building a cache whose first read will replace `initial_value`
    pub fn builder(initial_value: T) -> PullCacheBuilder<T> {
        PullCacheBuilder::new(initial_value)
    }
}

impl<T, C> PullCache<T, C>
where
    T: Send + Sync + 'static,
    C: Clock,
{
    /// Return a copy of the current value, reloading it first if stale
    ///
    /// Blocks the calling thread while waiting for the gate (bounded by the
    /// slot's retry budget) and while running the blocking loader. Load
    /// failures are reported to the error sink and the previous value is
    /// returned.
    ///
    /// # Errors
    /// - [`CacheError::LoaderUnavailable`] if the cache has no blocking loader
    /// - [`CacheError::Clone`] if the value cannot be copied
    pub fn get(&self) -> CacheResult<T> {
        let loader = self
            .loaders
            .blocking()
            .ok_or(CacheError::LoaderUnavailable { operation: "get", required: "blocking" })?;

        let observed = self.slot.load();
        if observed.is_fresh_at(self.clock.now()) {
            self.metrics.record_hit();
            return self.clone_out(&observed);
        }
        self.metrics.record_miss();

        let Some(permit) = self.gate.acquire_blocking(observed.retry_budget()) else {
            return self.stale_fallback();
        };

        let current = self.slot.load();
        if current.is_fresh_at(self.clock.now()) {
            drop(permit);
            return self.clone_out(&current);
        }

        let slot = match loader::run_blocking(loader, &CancellationToken::new()) {
            Ok(value) => self.publish(value),
            Err(err) => self.report(&err, current),
        };
        drop(permit);
        self.clone_out(&slot)
    }

    /// Suspending variant of [`get`](Self::get)
    ///
    /// Uses the async loader when configured, otherwise runs the blocking
    /// loader on Tokio's blocking pool. Each attempt is bounded by the
    /// configured load timeout.
    ///
    /// # Errors
    /// - [`CacheError::Clone`] if the value cannot be copied
    pub async fn get_async(&self) -> CacheResult<T> {
        let observed = self.slot.load();
        if observed.is_fresh_at(self.clock.now()) {
            self.metrics.record_hit();
            return self.clone_out(&observed);
        }
        self.metrics.record_miss();

        let Some(permit) = self.gate.acquire(observed.retry_budget()).await else {
            return self.stale_fallback();
        };

        let current = self.slot.load();
        if current.is_fresh_at(self.clock.now()) {
            drop(permit);
            return self.clone_out(&current);
        }

        let slot = match self.load_async().await {
            Ok(value) => self.publish(value),
            Err(err) => self.report(&err, current),
        };
        drop(permit);
        self.clone_out(&slot)
    }

    /// Mark the current value as expired without discarding it
    ///
    /// The next read reloads; readers that time out on the gate meanwhile
    /// still receive the old value.
    #[instrument(skip(self), fields(cache = %self.name))]
    pub fn invalidate(&self) {
        self.metrics.record_invalidation();
        let slot = self.slot.expire();
        debug!(generation = slot.generation(), "pull cache invalidated");
    }

    /// Whether a read right now would be served without reloading
    pub fn is_fresh(&self) -> bool {
        self.slot.load().is_fresh_at(self.clock.now())
    }

    /// Counter snapshot
    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }

    /// Name used in logs and error sink reports
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validated configuration
    pub fn config(&self) -> &PullCacheConfig {
        &self.config
    }

    async fn load_async(&self) -> Result<T, LoadError> {
        let blocking = match &self.loaders {
            Loaders::Async(loader) | Loaders::Both(loader, _) => {
                return loader::run_async(loader, self.config.load_timeout).await;
            }
            Loaders::Blocking(loader) => Arc::clone(loader),
        };

        let cancel = CancellationToken::new();
        let attempt = cancel.clone();
        let task = tokio::task::spawn_blocking(move || loader::run_blocking(&blocking, &attempt));
        let joined = match self.config.load_timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    cancel.cancel();
                    return Err(LoadError::TimedOut(limit));
                }
            },
            None => task.await,
        };
        joined.unwrap_or_else(|e| Err(LoadError::Panicked(e.to_string())))
    }

    fn publish(&self, value: T) -> Arc<CacheSlot<T>> {
        let now = self.clock.now();
        let freshness = now
            .checked_add(self.config.caching_period)
            .map_or(Freshness::UntilReplaced, Freshness::FreshUntil);
        let slot =
            self.slot.publish(value, freshness, self.config.repeat_retrieval_timeout, now);
        self.metrics.record_load();
        debug!(cache = %self.name, generation = slot.generation(), "pull cache reloaded");
        slot
    }

    fn report(&self, err: &LoadError, current: Arc<CacheSlot<T>>) -> Arc<CacheSlot<T>> {
        self.metrics.record_load_failure();
        self.sink.load_failed(&self.name, err, PULL_LOAD_FAILED);
        current
    }

    fn stale_fallback(&self) -> CacheResult<T> {
        self.metrics.record_stale_fallback();
        let slot = self.slot.load();
        debug!(
            cache = %self.name,
            generation = slot.generation(),
            "reload in progress elsewhere; serving current value"
        );
        self.clone_out(&slot)
    }

    fn clone_out(&self, slot: &CacheSlot<T>) -> CacheResult<T> {
        Ok(self.cloner.deep_clone(slot.value())?)
    }
}

/// Builder for [`PullCache`]
pub struct PullCacheBuilder<T, C = SystemClock> {
    initial_value: T,
    name: Option<String>,
    config: PullCacheConfig,
    loader: Option<Arc<dyn Loader<T>>>,
    blocking_loader: Option<Arc<dyn BlockingLoader<T>>>,
    cloner: Option<Arc<dyn DeepCloner<T>>>,
    sink: Arc<dyn LoadErrorSink>,
    clock: C,
}

impl<T> PullCacheBuilder<T>
where
    T: Send + Sync + 'static,
{
    fn new(initial_value: T) -> Self {
        Self {
            initial_value,
            name: None,
            config: PullCacheConfig::default(),
            loader: None,
            blocking_loader: None,
            cloner: None,
            sink: Arc::new(TracingErrorSink),
            clock: SystemClock,
        }
    }
}

impl<T, C> PullCacheBuilder<T, C>
where
    T: Send + Sync + 'static,
    C: Clock,
{
    /// Name used in logs and error sink reports
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: PullCacheConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how long a loaded value stays fresh
    pub fn caching_period(mut self, period: Duration) -> Self {
        self.config.caching_period = period;
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

    /// Async loader used by [`PullCache::get_async`]
    pub fn loader(mut self, loader: Arc<dyn Loader<T>>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Async loader from a closure returning a future
    pub fn load_with<F, Fut>(self, load: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LoadResult<T>> + Send + 'static,
    {
        self.loader(Arc::new(FnLoader(load)))
    }

    /// Blocking loader used by [`PullCache::get`]
    pub fn blocking_loader(mut self, loader: Arc<dyn BlockingLoader<T>>) -> Self {
        self.blocking_loader = Some(loader);
        self
    }

    /// Blocking loader from a closure
    pub fn load_blocking_with<F>(self, load: F) -> Self
    where
        F: Fn(&CancellationToken) -> LoadResult<T> + Send + Sync + 'static,
    {
        self.blocking_loader(Arc::new(load))
    }

    /// Receiver for load failures (defaults to [`TracingErrorSink`])
    pub fn error_sink(mut self, sink: Arc<dyn LoadErrorSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Time source used for freshness decisions
    pub fn clock<C2: Clock>(self, clock: C2) -> PullCacheBuilder<T, C2> {
        PullCacheBuilder {
            initial_value: self.initial_value,
            name: self.name,
            config: self.config,
            loader: self.loader,
            blocking_loader: self.blocking_loader,
            cloner: self.cloner,
            sink: self.sink,
            clock,
        }
    }

    /// Validate the configuration and create the cache
    ///
    /// The cloner is applied once to the initial value so an incompatible
    /// value graph is reported here rather than on first read.
    ///
    /// # Errors
    /// - `CacheError::Common(CommonError::Config)` for an invalid
    ///   configuration, a missing cloner, or no loader at all
    /// - [`CacheError::Clone`] if the initial value cannot be copied
    pub fn build(self) -> CacheResult<PullCache<T, C>> {
        self.config.validate()?;

        let cloner = self
            .cloner
            .ok_or_else(|| CacheError::config_field("clone_strategy", "no cloner configured"))?;
        let loaders = match (self.loader, self.blocking_loader) {
            (Some(a), Some(b)) => Loaders::Both(a, b),
            (Some(a), None) => Loaders::Async(a),
            (None, Some(b)) => Loaders::Blocking(b),
            (None, None) => {
                return Err(CacheError::config_field("loader", "no loader configured"));
            }
        };
        cloner.deep_clone(&self.initial_value)?;

        let name = self.name.unwrap_or_else(|| std::any::type_name::<T>().to_string());
        info!(
            cache = %name,
            strategy = %cloner.strategy(),
            caching_period_ms = self.config.caching_period.as_millis() as u64,
            "pull cache created"
        );

        Ok(PullCache {
            name,
            slot: SlotCell::new(
                self.initial_value,
                Freshness::Expired,
                self.config.initial_retrieval_timeout,
            ),
            gate: SingleFlightGate::new(),
            loaders,
            cloner,
            sink: self.sink,
            config: self.config,
            clock: self.clock,
            metrics: MetricsCollector::default(),
        })
    }
}

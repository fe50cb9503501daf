//! Cache configuration types and builder patterns
//!
//! Periods and timeouts are validated when a cache is built, so an invalid
//! setting fails at startup instead of on first read. Unbounded timeouts are
//! written as `None`; a zero timeout is rejected rather than read as "never
//! wait".

pub mod loader;

use std::time::Duration;

use itemcache_common::error::{CommonError, CommonResult};
use itemcache_common::{duration_millis, option_duration_millis};
use serde::{Deserialize, Serialize};

pub use loader::{load_from_env, load_from_file, parse_settings, CacheSettings, ConfigFormat};

/// Smallest accepted caching or refresh period
pub const MIN_PERIOD: Duration = Duration::from_millis(10);

/// Default caching period for pull caches and refresh period for push caches
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(60);

/// Default gate timeout for warm misses
pub const DEFAULT_REPEAT_RETRIEVAL_TIMEOUT: Duration = Duration::from_millis(100);

/// Default pause between failed initial loads of a push cache
pub const DEFAULT_INITIAL_RETRY_DELAY: Duration = Duration::from_secs(2);

fn default_period() -> Duration {
    DEFAULT_PERIOD
}

fn default_repeat_retrieval_timeout() -> Option<Duration> {
    Some(DEFAULT_REPEAT_RETRIEVAL_TIMEOUT)
}

fn default_initial_retry_delay() -> Duration {
    DEFAULT_INITIAL_RETRY_DELAY
}

fn check_period(field: &str, period: Duration) -> CommonResult<()> {
    if period < MIN_PERIOD {
        return Err(CommonError::config_field(
            field,
            format!("must be at least {:?}, got {:?}", MIN_PERIOD, period),
        ));
    }
    Ok(())
}

fn check_timeout(field: &str, timeout: Option<Duration>) -> CommonResult<()> {
    if timeout == Some(Duration::ZERO) {
        return Err(CommonError::config_field(
            field,
            "must be greater than zero; leave unset for an unbounded wait",
        ));
    }
    Ok(())
}

/// Configuration for a pull (on-demand, TTL) cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PullCacheConfig {
    /// How long a loaded value stays fresh
    #[serde(rename = "caching_period_ms", with = "duration_millis", default = "default_period")]
    pub caching_period: Duration,

    /// Gate timeout for the very first (cold) miss; `None` = unbounded
    #[serde(rename = "initial_retrieval_timeout_ms", with = "option_duration_millis", default)]
    pub initial_retrieval_timeout: Option<Duration>,

    /// Gate timeout for misses after a successful load; `None` = unbounded,
    /// written as `"unbounded"` in TOML where there is no `null`
    #[serde(
        rename = "repeat_retrieval_timeout_ms",
        with = "option_duration_millis",
        default = "default_repeat_retrieval_timeout"
    )]
    pub repeat_retrieval_timeout: Option<Duration>,

    /// Limit for one async load attempt; `None` = unbounded
    #[serde(rename = "load_timeout_ms", with = "option_duration_millis", default)]
    pub load_timeout: Option<Duration>,
}

impl Default for PullCacheConfig {
    fn default() -> Self {
        Self {
            caching_period: DEFAULT_PERIOD,
            initial_retrieval_timeout: None,
            repeat_retrieval_timeout: Some(DEFAULT_REPEAT_RETRIEVAL_TIMEOUT),
            load_timeout: None,
        }
    }
}

impl PullCacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> PullCacheConfigBuilder {
        PullCacheConfigBuilder::default()
    }

    /// Defaults with the given caching period
    pub fn with_caching_period(caching_period: Duration) -> Self {
        Self { caching_period, ..Self::default() }
    }

    /// Check every field
    ///
    /// # Errors
    /// Returns `CommonError::Config` naming the first invalid field.
    pub fn validate(&self) -> CommonResult<()> {
        check_period("caching_period", self.caching_period)?;
        check_timeout("initial_retrieval_timeout", self.initial_retrieval_timeout)?;
        check_timeout("repeat_retrieval_timeout", self.repeat_retrieval_timeout)?;
        check_timeout("load_timeout", self.load_timeout)
    }
}

/// Builder for PullCacheConfig with fluent API
#[derive(Debug, Default)]
pub struct PullCacheConfigBuilder {
    config: PullCacheConfig,
}

impl PullCacheConfigBuilder {
    /// Set how long a loaded value stays fresh
    pub fn caching_period(mut self, period: Duration) -> Self {
        self.config.caching_period = period;
        self
    }

    /// Set the cold-miss gate timeout (`None` = unbounded)
    pub fn initial_retrieval_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.initial_retrieval_timeout = timeout;
        self
    }

    /// Set the warm-miss gate timeout (`None` = unbounded)
    pub fn repeat_retrieval_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.repeat_retrieval_timeout = timeout;
        self
    }

    /// Set the async load timeout (`None` = unbounded)
    pub fn load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.load_timeout = timeout;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// Returns `CommonError::Config` naming the first invalid field.
    pub fn build(self) -> CommonResult<PullCacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for a push (background refresh) cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushCacheConfig {
    /// Wait between refreshes once initialized
    #[serde(rename = "refresh_period_ms", with = "duration_millis", default = "default_period")]
    pub refresh_period: Duration,

    /// Limit for one load attempt; `None` = unbounded
    #[serde(rename = "load_timeout_ms", with = "option_duration_millis", default)]
    pub load_timeout: Option<Duration>,

    /// Wait between failed loads before the first success
    #[serde(
        rename = "initial_retry_delay_ms",
        with = "duration_millis",
        default = "default_initial_retry_delay"
    )]
    pub initial_retry_delay: Duration,
}

impl Default for PushCacheConfig {
    fn default() -> Self {
        Self {
            refresh_period: DEFAULT_PERIOD,
            load_timeout: None,
            initial_retry_delay: DEFAULT_INITIAL_RETRY_DELAY,
        }
    }
}

impl PushCacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> PushCacheConfigBuilder {
        PushCacheConfigBuilder::default()
    }

    /// Defaults with the given refresh period
    pub fn with_refresh_period(refresh_period: Duration) -> Self {
        Self { refresh_period, ..Self::default() }
    }

    /// Check every field
    ///
    /// # Errors
    /// Returns `CommonError::Config` naming the first invalid field.
    pub fn validate(&self) -> CommonResult<()> {
        check_period("refresh_period", self.refresh_period)?;
        check_timeout("load_timeout", self.load_timeout)?;
        if self.initial_retry_delay.is_zero() {
            return Err(CommonError::config_field("initial_retry_delay", "must be greater than zero"));
        }
        Ok(())
    }
}

/// Builder for PushCacheConfig with fluent API
#[derive(Debug, Default)]
pub struct PushCacheConfigBuilder {
    config: PushCacheConfig,
}

impl PushCacheConfigBuilder {
    /// Set the wait between refreshes
    pub fn refresh_period(mut self, period: Duration) -> Self {
        self.config.refresh_period = period;
        self
    }

    /// Set the per-attempt load timeout (`None` = unbounded)
    pub fn load_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.load_timeout = timeout;
        self
    }

    /// Set the pause between failed initial loads
    pub fn initial_retry_delay(mut self, delay: Duration) -> Self {
        self.config.initial_retry_delay = delay;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    /// Returns `CommonError::Config` naming the first invalid field.
    pub fn build(self) -> CommonResult<PushCacheConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

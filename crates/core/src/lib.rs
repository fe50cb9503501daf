//! # ItemCache
//!
//! In-process single-value caches for data that is expensive to fetch.
//!
//! Two flavors share the same snapshot, copy, and error-reporting machinery:
//!
//! - [`PullCache`]: loads on demand when a read finds the value older than
//!   its caching period. Only one reader reloads at a time; others wait a
//!   bounded time and then take the stale value.
//! - [`PushCache`]: a background task reloads the value on a fixed period.
//!   Reads never block.
//!
//! Every read hands out a copy produced by the cache's [`DeepCloner`], so
//! callers can mutate their result freely. Load failures never reach
//! readers; they go to a [`LoadErrorSink`] and the previous value is kept.
//!
//! ## Architecture Principles
//! - Only depends on `itemcache-common` plus the async runtime
//! - Snapshots are immutable and published atomically
//! - Blocking and async call styles over the same state

#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod clone;
pub mod config;
pub mod error;
pub mod loader;
pub mod pull;
pub mod push;
pub mod sink;
pub mod slot;
pub mod stats;
pub mod sync;

pub use clone::{
    CloneStrategy, DeepCloner, DeepCopy, DelegatedCloner, OptionalCloner, SharedCloner,
    StructuralCloner,
};
pub use config::{CacheSettings, PullCacheConfig, PushCacheConfig};
pub use error::{BoxedError, CacheError, CacheResult, CloneError, LoadError, LoadResult};
pub use loader::{BlockingLoader, Loader};
pub use pull::{PullCache, PullCacheBuilder};
pub use push::{PushCache, PushCacheBuilder, RefreshState};
pub use sink::{LoadErrorSink, TracingErrorSink};
pub use slot::{CacheSlot, Freshness};
pub use stats::CacheStats;
pub use sync::{InitLatch, SingleFlightGate};

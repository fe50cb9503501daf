//! Testing utilities and helpers
//!
//! - **[`async_utils`]**: polling and timeout helpers for async tests
//! - **[`time`]**: [`MockClock`] for deterministic freshness checks
//! - **[`tracing`]**: one-time test subscriber installation
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use itemcache_common::testing::MockClock;
//! use itemcache_common::Clock;
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
//! ```

pub mod async_utils;
pub mod time;
pub mod tracing;

pub use async_utils::{poll_until, poll_until_blocking, timeout_ok};
pub use time::MockClock;
pub use self::tracing::init_test_tracing;

//! Time source abstraction
//!
//! Components that make freshness decisions read time through [`Clock`] so
//! tests can substitute a controllable clock (see
//! `testing::MockClock` behind the `test-utils` feature).

use std::sync::Arc;
use std::time::Instant;

/// Monotonic time source
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient sharing
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

//! Where load failures go
//!
//! Load failures never reach readers; the caches hand them to a
//! [`LoadErrorSink`] together with a short context message and keep serving
//! the previous value. Successes are never reported.

use itemcache_common::error::{ErrorClassification, ErrorSeverity};
use tracing::{error, warn};

use crate::error::LoadError;

/// Context passed by the push cache refresh loop
pub const PUSH_LOAD_FAILED: &str = "failure to load cache from source";

/// Context passed by the pull cache reload path
pub const PULL_LOAD_FAILED: &str = "failure to reload expired cache value";

/// Receives every load failure of a cache
///
/// Implementations must not panic; they run on the refresh task or on the
/// reader that performed the reload.
pub trait LoadErrorSink: Send + Sync {
    /// Record one failed load attempt
    fn load_failed(&self, cache: &str, error: &LoadError, context: &str);
}

/// Default sink writing through `tracing`
///
/// Timeouts are logged at `warn`, everything else at `error`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingErrorSink;

impl LoadErrorSink for TracingErrorSink {
    fn load_failed(&self, cache: &str, err: &LoadError, context: &str) {
        let severity = err.severity();
        if severity <= ErrorSeverity::Warning {
            warn!(cache, error = %err, severity = %severity, "{}", context);
        } else {
            error!(
                cache,
                error = %err,
                severity = %severity,
                retryable = err.is_retryable(),
                "{}",
                context
            );
        }
    }
}

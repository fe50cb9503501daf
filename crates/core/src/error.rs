//! Error types for the cache engine
//!
//! Three families with different propagation rules:
//!
//! - [`CacheError`] reaches callers synchronously: bad configuration, clone
//!   incompatibility, API misuse.
//! - [`CloneError`] is the clone-failure detail carried inside
//!   [`CacheError::Clone`].
//! - [`LoadError`] never reaches readers. It is handed to the configured
//!   [`LoadErrorSink`](crate::sink::LoadErrorSink) and the previous value
//!   stays current.

use std::time::Duration;

use itemcache_common::error::{CommonError, ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// Error type produced by user-supplied loaders
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type returned by loaders
pub type LoadResult<T> = Result<T, BoxedError>;

/// Errors surfaced to cache callers
#[derive(Debug, Error)]
pub enum CacheError {
    /// Shared errors; invalid configuration arrives as `CommonError::Config`
    #[error(transparent)]
    Common(#[from] CommonError),

    /// The cached value could not be deep-copied
    #[error(transparent)]
    Clone(#[from] CloneError),

    /// The requested call style has no matching loader configured
    #[error("{operation} requires a {required} loader, but none was configured")]
    LoaderUnavailable { operation: &'static str, required: &'static str },

    /// Waiting for initialization before it was started
    #[error("initialization has not been started")]
    InitializationNotStarted,

    /// The cache was disposed before the operation could complete
    #[error("cache has been disposed")]
    Disposed,
}

impl CacheError {
    /// Create a configuration error for a named option
    pub fn config_field<S: Into<String>>(field: &str, message: S) -> Self {
        Self::Common(CommonError::config_field(field, message))
    }

    /// Whether this is a construction-time configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Common(CommonError::Config { .. }))
    }
}

impl ErrorClassification for CacheError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Common(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Common(e) => e.severity(),
            Self::Clone(_) | Self::LoaderUnavailable { .. } => ErrorSeverity::Error,
            Self::InitializationNotStarted => ErrorSeverity::Error,
            Self::Disposed => ErrorSeverity::Warning,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Common(e) if e.is_critical())
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Deep-copy failures
#[derive(Debug, Error)]
pub enum CloneError {
    /// The value graph cannot survive a structural copy
    #[error("value of type {type_name} is not compatible with structural cloning: {source}")]
    Incompatible {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The round trip succeeded but rebuilt a different value, as happens to
    /// `Some(None)` or `Some(())` whose payload serializes as `null`
    #[error("structural copy of {type_name} does not match the original")]
    Lossy { type_name: &'static str },
}

/// Loader failures, reported to the log sink only
#[derive(Debug, Error)]
pub enum LoadError {
    /// The loader returned an error
    #[error("loader failed: {0}")]
    Failed(#[source] BoxedError),

    /// The attempt exceeded its load timeout
    #[error("load timed out after {0:?}")]
    TimedOut(Duration),

    /// The loader panicked
    #[error("loader panicked: {0}")]
    Panicked(String),
}

impl LoadError {
    pub(crate) fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked(message)
    }
}

impl ErrorClassification for LoadError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::Panicked(_))
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::TimedOut(_) => ErrorSeverity::Warning,
            Self::Failed(_) => ErrorSeverity::Error,
            Self::Panicked(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for error.
    use super::*;

    /// Validates `CacheError::config_field` behavior for the below minimum
    /// period scenario.
    ///
    /// Assertions:
    /// - Ensures the error is classified as a configuration error.
    /// - Confirms the message names the offending field.
    #[test]
    fn test_config_error_names_field() {
        let err = CacheError::config_field("refresh_period", "must be at least 10ms");

        assert!(err.is_config_error());
        assert!(err.to_string().contains("refresh_period"));
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }

    /// Validates `LoadError::from_panic` behavior for string payloads.
    ///
    /// Assertions:
    /// - Confirms both `&str` and `String` payloads keep their message.
    #[test]
    fn test_panic_payloads() {
        let static_payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        let owned_payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));

        assert_eq!(LoadError::from_panic(static_payload.as_ref()).to_string(), "loader panicked: boom");
        assert_eq!(LoadError::from_panic(owned_payload.as_ref()).to_string(), "loader panicked: bang");
    }

    /// Validates `LoadError` classification scenario.
    ///
    /// Assertions:
    /// - Ensures timeouts are retryable warnings and panics are critical.
    #[test]
    fn test_load_error_classification() {
        let timed_out = LoadError::TimedOut(Duration::from_millis(50));
        assert!(timed_out.is_retryable());
        assert_eq!(timed_out.severity(), ErrorSeverity::Warning);

        let panicked = LoadError::Panicked("oops".into());
        assert!(panicked.is_critical());
        assert!(!panicked.is_retryable());
    }

    /// Validates `CacheError::LoaderUnavailable` display scenario.
    ///
    /// Assertions:
    /// - Confirms the message names the operation and the missing loader.
    #[test]
    fn test_loader_unavailable_message() {
        let err = CacheError::LoaderUnavailable { operation: "get", required: "blocking" };

        assert_eq!(err.to_string(), "get requires a blocking loader, but none was configured");
    }
}

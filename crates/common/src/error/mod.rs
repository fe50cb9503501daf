//! Unified error handling patterns
//!
//! This module provides the shared error vocabulary used by the cache crates:
//!
//! - [`CommonError`]: variants that recur across modules (configuration,
//!   timeouts, internal faults)
//! - [`ErrorClassification`]: consistent retry/severity semantics so that log
//!   sinks and callers can decide how loudly to react
//! - [`ErrorSeverity`]: ordered severity levels
//!
//! # Composing module errors
//!
//! Module-specific errors embed `CommonError` through a transparent variant
//! and delegate classification to it:
//!
//! ```rust
//! use std::time::Duration;
//!
//! use itemcache_common::error::{CommonError, ErrorClassification, ErrorSeverity};
//!
//! #[derive(Debug)]
//! pub enum WidgetError {
//!     Common(CommonError),
//!     Jammed,
//! }
//!
//! impl ErrorClassification for WidgetError {
//!     fn is_retryable(&self) -> bool {
//!         match self {
//!             Self::Common(e) => e.is_retryable(),
//!             Self::Jammed => true,
//!         }
//!     }
//!
//!     fn severity(&self) -> ErrorSeverity {
//!         match self {
//!             Self::Common(e) => e.severity(),
//!             Self::Jammed => ErrorSeverity::Warning,
//!         }
//!     }
//!
//!     fn is_critical(&self) -> bool {
//!         matches!(self, Self::Common(e) if e.is_critical())
//!     }
//!
//!     fn retry_after(&self) -> Option<Duration> {
//!         None
//!     }
//! }
//! ```

use std::fmt;
use std::time::Duration;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Common error variants that appear across multiple modules
///
/// This enum provides standardized error types that can be embedded in
/// module-specific error enums to ensure consistency across the crates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// Configuration-related errors
    Config { message: String, field: Option<String> },

    /// Timeout errors
    Timeout { operation: String, duration: Duration },

    /// Internal errors that shouldn't normally occur
    Internal { message: String, context: Option<String> },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { message, field } => {
                if let Some(field) = field {
                    write!(f, "Configuration error in field '{}': {}", field, message)
                } else {
                    write!(f, "Configuration error: {}", message)
                }
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Operation '{}' timed out after {:?}", operation, duration)
            }
            Self::Internal { message, context } => {
                if let Some(ctx) = context {
                    write!(f, "Internal error in '{}': {}", ctx, message)
                } else {
                    write!(f, "Internal error: {}", message)
                }
            }
        }
    }
}

impl std::error::Error for CommonError {}

impl ErrorClassification for CommonError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config { .. } => ErrorSeverity::Error,
            Self::Timeout { .. } => ErrorSeverity::Warning,
            Self::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl CommonError {
    /// Create a simple configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), field: None }
    }

    /// Create a configuration error for a specific field
    pub fn config_field<S: Into<String>, F: Into<String>>(field: F, message: S) -> Self {
        Self::Config { message: message.into(), field: Some(field.into()) }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), context: None }
    }

    /// Create an internal error with context
    pub fn internal_with_context<S: Into<String>, C: Into<String>>(message: S, context: C) -> Self {
        Self::Internal { message: message.into(), context: Some(context.into()) }
    }

    /// Returns the offending field for configuration errors
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Config { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Convert error to structured logging fields
    pub fn as_tracing_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("error.type", self.error_type_name().to_string()),
            ("error.severity", self.severity().to_string()),
        ];
        match self {
            Self::Config { field: Some(field), .. } => fields.push(("error.field", field.clone())),
            Self::Timeout { operation, duration } => {
                fields.push(("error.operation", operation.clone()));
                fields.push(("error.duration_ms", duration.as_millis().to_string()));
            }
            Self::Internal { context: Some(ctx), .. } => fields.push(("error.context", ctx.clone())),
            _ => {}
        }
        fields
    }

    fn error_type_name(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Timeout { .. } => "timeout",
            Self::Internal { .. } => "internal",
        }
    }
}

/// Trait for consistent error classification across modules
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient issues that may succeed if attempted
    /// again, such as timeouts or a temporarily unavailable backend.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    ///
    /// Used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        Self::config(format!("Invalid JSON format: {}", err))
    }
}

impl From<toml::de::Error> for CommonError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(format!("Invalid TOML format: {}", err))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for error::mod.
    use super::*;

    /// Validates `CommonError::config_field` behavior for the display with
    /// field scenario.
    ///
    /// Assertions:
    /// - Confirms the rendered message names the field.
    /// - Confirms `err.field()` equals `Some("refresh_period")`.
    #[test]
    fn test_config_field_display() {
        let err = CommonError::config_field("refresh_period", "must be at least 10ms");

        assert_eq!(
            err.to_string(),
            "Configuration error in field 'refresh_period': must be at least 10ms"
        );
        assert_eq!(err.field(), Some("refresh_period"));
    }

    /// Validates `ErrorClassification` behavior for the severity mapping
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures timeouts are retryable warnings.
    /// - Ensures internal errors are critical.
    #[test]
    fn test_classification() {
        let timeout = CommonError::timeout("join refresh task", Duration::from_secs(1));
        assert!(timeout.is_retryable());
        assert_eq!(timeout.severity(), ErrorSeverity::Warning);

        let internal = CommonError::internal_with_context("task panicked", "refresh");
        assert!(internal.is_critical());
        assert_eq!(internal.severity(), ErrorSeverity::Critical);
        assert!(!CommonError::config("bad").is_retryable());
    }

    /// Validates `CommonError::as_tracing_fields` behavior for the timeout
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms type, operation, and duration fields are present.
    #[test]
    fn test_tracing_fields() {
        let fields =
            CommonError::timeout("initialize", Duration::from_millis(50)).as_tracing_fields();

        assert!(fields.contains(&("error.type", "timeout".to_string())));
        assert!(fields.contains(&("error.operation", "initialize".to_string())));
        assert!(fields.contains(&("error.duration_ms", "50".to_string())));
    }

    /// Validates `ErrorSeverity` ordering scenario.
    ///
    /// Assertions:
    /// - Ensures severities are ordered from Info to Critical.
    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARN");
    }
}

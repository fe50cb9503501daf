//! Configuration loader
//!
//! Loads cache settings from environment variables or from a file.
//!
//! ## Environment Variables
//! With prefix `ITEMCACHE`, the following variables override defaults (all in
//! milliseconds; an empty value or `unbounded` clears an optional timeout):
//! - `ITEMCACHE_CACHING_PERIOD_MS`
//! - `ITEMCACHE_INITIAL_RETRIEVAL_TIMEOUT_MS`
//! - `ITEMCACHE_REPEAT_RETRIEVAL_TIMEOUT_MS`
//! - `ITEMCACHE_REFRESH_PERIOD_MS`
//! - `ITEMCACHE_INITIAL_RETRY_DELAY_MS`
//! - `ITEMCACHE_LOAD_TIMEOUT_MS` (applies to both caches)
//!
//! ## File Format
//! TOML or JSON (detected by file extension) with optional `pull` and `push`
//! tables:
//!
//! ```toml
//! [pull]
//! caching_period_ms = 120000
//! repeat_retrieval_timeout_ms = 50
//!
//! [push]
//! refresh_period_ms = 30000
//! load_timeout_ms = 5000
//! ```

use std::path::Path;
use std::time::Duration;

use itemcache_common::error::{CommonError, CommonResult};
use itemcache_common::option_duration_millis;
use serde::{Deserialize, Serialize};

use super::{PullCacheConfig, PushCacheConfig};

/// Settings for both cache flavors
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    /// Pull cache settings
    pub pull: PullCacheConfig,
    /// Push cache settings
    pub push: PushCacheConfig,
}

impl CacheSettings {
    /// Validate both sections
    ///
    /// # Errors
    /// Returns `CommonError::Config` naming the first invalid field.
    pub fn validate(&self) -> CommonResult<()> {
        self.pull.validate()?;
        self.push.validate()
    }
}

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document
    Toml,
    /// JSON document
    Json,
}

impl ConfigFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(Self::Toml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Load settings from environment variables named `{prefix}_...`
///
/// Unset variables keep their defaults.
///
/// # Errors
/// Returns `CommonError::Config` if a variable is not a valid number of
/// milliseconds or the resulting settings fail validation.
pub fn load_from_env(prefix: &str) -> CommonResult<CacheSettings> {
    let settings = load_from_vars(prefix, |name| std::env::var(name).ok())?;
    tracing::info!(prefix, "Cache settings loaded from environment variables");
    Ok(settings)
}

/// Load settings from a TOML or JSON file
///
/// # Errors
/// Returns `CommonError::Config` if:
/// - the file cannot be read
/// - the extension is neither `.toml` nor `.json`
/// - the document is malformed or fails validation
pub fn load_from_file(path: &Path) -> CommonResult<CacheSettings> {
    let format = ConfigFormat::from_path(path).ok_or_else(|| {
        CommonError::config(format!("Unsupported config format: {}", path.display()))
    })?;

    tracing::info!(path = %path.display(), "Loading cache settings from file");

    let contents = std::fs::read_to_string(path).map_err(|e| {
        CommonError::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    parse_settings(&contents, format)
}

/// Parse and validate settings from document text
///
/// # Errors
/// Returns `CommonError::Config` if the document is malformed or fails
/// validation.
pub fn parse_settings(contents: &str, format: ConfigFormat) -> CommonResult<CacheSettings> {
    let settings: CacheSettings = match format {
        ConfigFormat::Toml => toml::from_str(contents)?,
        ConfigFormat::Json => serde_json::from_str(contents)?,
    };
    settings.validate()?;
    Ok(settings)
}

fn load_from_vars<F>(prefix: &str, lookup: F) -> CommonResult<CacheSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let read = |suffix: &str| -> CommonResult<Option<Option<Duration>>> {
        let name = format!("{}_{}", prefix, suffix);
        match lookup(&name) {
            None => Ok(None),
            Some(raw) => parse_millis(&name, &raw).map(Some),
        }
    };
    let required = |suffix: &str, value: Option<Option<Duration>>| -> CommonResult<Option<Duration>> {
        match value {
            Some(None) => Err(CommonError::config_field(
                format!("{}_{}", prefix, suffix),
                "cannot be unbounded",
            )),
            Some(Some(duration)) => Ok(Some(duration)),
            None => Ok(None),
        }
    };

    let mut settings = CacheSettings::default();

    if let Some(period) = required("CACHING_PERIOD_MS", read("CACHING_PERIOD_MS")?)? {
        settings.pull.caching_period = period;
    }
    if let Some(timeout) = read("INITIAL_RETRIEVAL_TIMEOUT_MS")? {
        settings.pull.initial_retrieval_timeout = timeout;
    }
    if let Some(timeout) = read("REPEAT_RETRIEVAL_TIMEOUT_MS")? {
        settings.pull.repeat_retrieval_timeout = timeout;
    }
    if let Some(period) = required("REFRESH_PERIOD_MS", read("REFRESH_PERIOD_MS")?)? {
        settings.push.refresh_period = period;
    }
    if let Some(delay) = required("INITIAL_RETRY_DELAY_MS", read("INITIAL_RETRY_DELAY_MS")?)? {
        settings.push.initial_retry_delay = delay;
    }
    if let Some(timeout) = read("LOAD_TIMEOUT_MS")? {
        settings.pull.load_timeout = timeout;
        settings.push.load_timeout = timeout;
    }

    settings.validate()?;
    Ok(settings)
}

/// `Some(duration)` for a number of milliseconds, `None` for unbounded
fn parse_millis(name: &str, raw: &str) -> CommonResult<Option<Duration>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case(option_duration_millis::UNBOUNDED) {
        return Ok(None);
    }
    raw.parse::<u64>()
        .map(|millis| Some(Duration::from_millis(millis)))
        .map_err(|e| CommonError::config_field(name, format!("invalid milliseconds '{}': {}", raw, e)))
}

//! Integration tests for configuration loader
//!
//! Tests loading cache settings from TOML and JSON files and building caches
//! from the result.

use std::io::Write;
use std::time::Duration;

use itemcache::config::{load_from_file, parse_settings, ConfigFormat};
use itemcache::{BoxedError, CacheSettings, PullCache, SharedCloner};
use tempfile::Builder;
use tokio_util::sync::CancellationToken;

fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().expect("Failed to create temp file");
    file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    file
}

#[test]
fn test_load_settings_from_toml_file() {
    let file = write_config(
        ".toml",
        r#"
        [pull]
        caching_period_ms = 120000
        initial_retrieval_timeout_ms = 250
        repeat_retrieval_timeout_ms = 50

        [push]
        refresh_period_ms = 30000
        load_timeout_ms = 5000
        "#,
    );

    let settings = load_from_file(file.path()).expect("valid TOML settings");

    assert_eq!(settings.pull.caching_period, Duration::from_secs(120));
    assert_eq!(settings.pull.initial_retrieval_timeout, Some(Duration::from_millis(250)));
    assert_eq!(settings.pull.repeat_retrieval_timeout, Some(Duration::from_millis(50)));
    assert_eq!(settings.push.refresh_period, Duration::from_secs(30));
    assert_eq!(settings.push.load_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn test_load_settings_from_json_file() {
    let file = write_config(
        ".json",
        r#"{
            "pull": { "caching_period_ms": 2000, "repeat_retrieval_timeout_ms": null },
            "push": { "refresh_period_ms": 15000, "initial_retry_delay_ms": 500 }
        }"#,
    );

    let settings = load_from_file(file.path()).expect("valid JSON settings");

    assert_eq!(settings.pull.caching_period, Duration::from_secs(2));
    assert_eq!(settings.pull.repeat_retrieval_timeout, None);
    assert_eq!(settings.push.initial_retry_delay, Duration::from_millis(500));
}

#[test]
fn test_missing_sections_use_defaults() {
    let settings = parse_settings("", ConfigFormat::Toml).expect("empty document");

    assert_eq!(settings, CacheSettings::default());
}

#[test]
fn test_invalid_documents_are_config_errors() {
    let short = parse_settings("[push]\nrefresh_period_ms = 5\n", ConfigFormat::Toml)
        .expect_err("below minimum");
    assert_eq!(short.field(), Some("refresh_period"));

    let unknown = parse_settings(r#"{"pull": {"ttl": 5}}"#, ConfigFormat::Json);
    assert!(unknown.is_err(), "unknown fields must be rejected");

    let file = write_config(".yaml", "pull: {}");
    assert!(load_from_file(file.path()).is_err(), "unsupported extension");
}

#[test]
fn test_settings_drive_cache_construction() -> anyhow::Result<()> {
    let settings = parse_settings("[pull]\ncaching_period_ms = 45000\n", ConfigFormat::Toml)?;

    let cache = PullCache::builder(0_u32)
        .config(settings.pull)
        .cloner(SharedCloner)
        .load_blocking_with(|_cancel: &CancellationToken| Ok::<u32, BoxedError>(1))
        .build()?;

    assert_eq!(cache.config().caching_period, Duration::from_secs(45));
    assert_eq!(cache.get()?, 1);
    Ok(())
}

#[test]
fn test_toml_unbounded_keyword_clears_timeout() {
    let file = write_config(
        ".toml",
        r#"
        [pull]
        repeat_retrieval_timeout_ms = "unbounded"

        [push]
        load_timeout_ms = "unbounded"
        "#,
    );

    let settings = load_from_file(file.path()).expect("valid TOML settings");

    assert_eq!(settings.pull.repeat_retrieval_timeout, None);
    assert_eq!(settings.push.load_timeout, None);
    assert!(parse_settings("[pull]\nrepeat_retrieval_timeout_ms = \"later\"\n", ConfigFormat::Toml)
        .is_err());
}

//! Serialization helpers for configuration durations
//!
//! Cache settings express every period and timeout as whole milliseconds so
//! that the same document reads naturally in TOML, JSON, and environment
//! variables.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde serialization result type
type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

fn millis(duration: &Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Custom serialization module for Duration as milliseconds
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use itemcache_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     period: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    /// Serialize a Duration as milliseconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(millis(duration))
    }

    /// Deserialize milliseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Optional Duration as milliseconds, where `None` means "unbounded"
///
/// Absent fields, explicit `null` and the string `"unbounded"` all
/// deserialize to `None`; TOML has no `null`, so the keyword is the only way
/// a TOML document can clear a timeout that defaults to a bound. Combine with
/// `#[serde(default)]` so the field may be omitted.
pub mod option_duration_millis {
    use serde::de::Error as _;

    use super::*;

    /// Keyword accepted in place of a number of milliseconds
    pub const UNBOUNDED: &str = "unbounded";

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimeout {
        Millis(u64),
        Keyword(String),
    }

    /// Serialize `Some(duration)` as milliseconds and `None` as unit
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        match duration {
            Some(duration) => serializer.serialize_some(&millis(duration)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize optional milliseconds into an optional Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<RawTimeout>::deserialize(deserializer)? {
            None => Ok(None),
            Some(RawTimeout::Millis(millis)) => Ok(Some(Duration::from_millis(millis))),
            Some(RawTimeout::Keyword(word)) if word.eq_ignore_ascii_case(UNBOUNDED) => Ok(None),
            Some(RawTimeout::Keyword(word)) => Err(D::Error::custom(format!(
                "expected milliseconds or \"{}\", found \"{}\"",
                UNBOUNDED, word
            ))),
        }
    }
}

//! `publishedAt` parsing and canonical formatting.
//!
//! Canonical form is RFC 3339 in UTC with millisecond precision and a `Z`
//! suffix, e.g. `2024-05-01T12:00:00.000Z`. Every timestamp the store keeps is
//! truncated to milliseconds so a value survives a save/load cycle unchanged.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc};

use crate::error::{BoardError, Result};

/// Naive date-time layouts accepted without an offset (read as UTC).
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"];

/// Current time in canonical precision.
pub fn now() -> DateTime<Utc> {
    normalize(Utc::now())
}

/// Truncates to millisecond precision.
pub fn normalize(value: DateTime<Utc>) -> DateTime<Utc> {
    value.trunc_subsecs(3)
}

/// Formats a timestamp in canonical form.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a caller- or storage-supplied timestamp.
///
/// Accepts RFC 3339 with any offset, a naive date-time (treated as UTC), or a
/// bare `YYYY-MM-DD` date (midnight UTC). Surrounding whitespace is ignored.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(normalize(parsed.with_timezone(&Utc)));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(normalize(Utc.from_utc_datetime(&naive)));
        }
    }

    if let Some(midnight) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    Err(BoardError::ValidationError(
        "publishedAt must be a valid ISO date string".into(),
    ))
}

/// Serde adapter writing canonical form and reading anything [`parse_timestamp`] accepts.
pub mod iso8601 {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes in canonical form.
    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    /// Deserializes from any accepted layout.
    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

//! Timestamp formats and the process base time
//!
//! Full timestamps are rendered through a [`TimestampFormat`]. The compact
//! form used by interactive text output counts whole seconds since the
//! process base time, captured once by [`init_base_timestamp`] or on first
//! use of [`base_timestamp`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::LazyLock;

static BASE_TIMESTAMP: LazyLock<DateTime<Utc>> = LazyLock::new(Utc::now);

/// Capture the process base time if it has not been captured yet.
///
/// The logger calls this on construction so that compact timestamps count
/// from logger setup rather than from the first rendered record.
pub fn init_base_timestamp() {
    LazyLock::force(&BASE_TIMESTAMP);
}

/// The instant compact timestamps are measured from
pub fn base_timestamp() -> DateTime<Utc> {
    *BASE_TIMESTAMP
}

/// Render `at` as `[NNNN]`: whole seconds elapsed since `base`, zero padded
/// to four digits and clamped at zero.
///
/// ```
/// use chrono::{Duration, Utc};
/// use rust_field_logger::core::compact_timestamp;
///
/// let base = Utc::now();
/// assert_eq!(compact_timestamp(base + Duration::seconds(12), base), "[0012]");
/// ```
pub fn compact_timestamp(at: DateTime<Utc>, base: DateTime<Utc>) -> String {
    let elapsed = (at - base).num_seconds().max(0);
    format!("[{:04}]", elapsed)
}

/// Standardized timestamp format options
///
/// # Examples
///
/// ```
/// use rust_field_logger::core::TimestampFormat;
/// use chrono::Utc;
///
/// let format = TimestampFormat::Iso8601;
/// let timestamp = format.format(&Utc::now());
/// assert!(timestamp.ends_with('Z'));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// ISO 8601 with milliseconds: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// ISO 8601 with microseconds: `2025-01-08T10:30:45.123456Z`
    Iso8601Micros,

    /// RFC 3339 with offset: `2025-01-08T10:30:45+00:00`
    ///
    /// This is the default format for both bundled formatters.
    #[default]
    Rfc3339,

    /// Unix timestamp in seconds: `1736332245`
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Unix timestamp in microseconds: `1736332245123456`
    UnixMicros,

    /// Custom strftime format
    ///
    /// ```
    /// use rust_field_logger::core::TimestampFormat;
    ///
    /// // Apache log format
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Format a `DateTime<Utc>` according to this format
    #[must_use]
    pub fn format(&self, datetime: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Iso8601 => datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            TimestampFormat::Iso8601Micros => datetime.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
            TimestampFormat::Rfc3339 => datetime.to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
            TimestampFormat::Unix => datetime.timestamp().to_string(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().to_string(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().to_string(),
            TimestampFormat::Custom(format_str) => {
                // Invalid strftime specifiers fail at render time.
                let mut out = String::new();
                if write!(out, "{}", datetime.format(format_str)).is_err() {
                    out.clear();
                    out.push_str(&datetime.to_rfc3339());
                }
                out
            }
        }
    }

    /// Format as a JSON value: a number for the Unix formats, a string otherwise
    #[must_use]
    pub fn to_json_value(&self, datetime: &DateTime<Utc>) -> serde_json::Value {
        match self {
            TimestampFormat::Unix => datetime.timestamp().into(),
            TimestampFormat::UnixMillis => datetime.timestamp_millis().into(),
            TimestampFormat::UnixMicros => datetime.timestamp_micros().into(),
            _ => self.format(datetime).into(),
        }
    }

    /// Check if this is a Unix-based numeric format
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TimestampFormat::Unix | TimestampFormat::UnixMillis | TimestampFormat::UnixMicros
        )
    }
}

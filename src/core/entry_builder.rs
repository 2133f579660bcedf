//! Fluent construction of entries that carry fields
//!
//! Obtained from [`Logger::with_field`], [`Logger::with_fields`] or
//! [`Logger::with_error`]; terminated by one of the level methods.

use super::error::Result;
use super::field::{FieldValue, Fields};
use super::log_entry::LogEntry;
use super::log_level::LogLevel;
use super::logger::Logger;
use chrono::{DateTime, Utc};

/// Key used by [`EntryBuilder::with_error`]
pub const ERROR_KEY: &str = "error";

/// Builder for entries with structured fields
///
/// # Example
///
/// ```
/// use rust_field_logger::prelude::*;
///
/// let logger = Logger::builder().output(Output::writer(std::io::sink())).build();
///
/// logger
///     .with_field("user_id", 12345)
///     .with_field("latency_ms", 42.5)
///     .info("request processed")
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct EntryBuilder<'a> {
    logger: &'a Logger,
    fields: Fields,
    timestamp: Option<DateTime<Utc>>,
    location: Option<(&'static str, &'static str, u32)>,
}

impl<'a> EntryBuilder<'a> {
    pub fn new(logger: &'a Logger) -> Self {
        Self {
            logger,
            fields: Fields::new(),
            timestamp: None,
            location: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key, value);
        self
    }

    /// Add several fields; later keys replace earlier ones.
    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        for (key, value) in fields {
            self.fields.insert(key, value);
        }
        self
    }

    /// Attach an error under the `error` key
    #[must_use]
    pub fn with_error<E>(self, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.with_field(ERROR_KEY, FieldValue::error(err))
    }

    /// Override the entry timestamp
    #[must_use]
    pub fn with_time(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the call site reported when the logger has caller reporting on
    #[must_use]
    pub fn location(mut self, function: &'static str, file: &'static str, line: u32) -> Self {
        self.location = Some((function, file, line));
        self
    }

    pub fn log(self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        if !self.logger.is_enabled(level) {
            return Ok(());
        }
        let mut entry = LogEntry::new(level, message).with_fields(self.fields);
        if let Some(timestamp) = self.timestamp {
            entry.timestamp = timestamp;
        }
        match self.location {
            Some((function, file, line)) => self.logger.log_entry_at(entry, function, file, line),
            None => self.logger.log_entry(entry),
        }
    }

    pub fn debug(self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Error, message)
    }

    pub fn panic(self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Panic, message)
    }

    pub fn fatal(self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Fatal, message)
    }
}

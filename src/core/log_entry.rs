//! Log entry structure

use super::field::{FieldValue, Fields};
use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use std::fmt;

/// Source location of a logging call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// `file:line`, the form renderers use for the file key
    pub fn location(&self) -> String {
        format!("{}:{}", self.file, self.line)
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.function, self.file, self.line)
    }
}

/// One logging event
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub fields: Fields,
    pub timestamp: DateTime<Utc>,
    pub caller: Option<Caller>,
}

impl LogEntry {
    /// Sanitize log message to prevent log injection attacks
    ///
    /// Replaces newlines, carriage returns, and tabs with escape sequences
    /// so a single call always renders as a single line.
    fn sanitize_message(message: String) -> String {
        if !message.contains(['\n', '\r', '\t']) {
            return message;
        }
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: Self::sanitize_message(message.into()),
            fields: Fields::new(),
            timestamp: Utc::now(),
            caller: None,
        }
    }

    /// An empty entry, as handed out by the pool
    pub(crate) fn blank() -> Self {
        Self {
            level: LogLevel::default(),
            message: String::new(),
            fields: Fields::new(),
            timestamp: DateTime::<Utc>::default(),
            caller: None,
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key, value);
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        if self.fields.is_empty() {
            self.fields = fields;
        } else {
            for (key, value) in fields {
                self.fields.insert(key, value);
            }
        }
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn has_caller(&self) -> bool {
        self.caller.is_some()
    }

    /// Clear every mutable attribute, keeping allocations for reuse
    pub fn reset(&mut self) {
        self.level = LogLevel::default();
        self.message.clear();
        self.fields.clear();
        self.timestamp = DateTime::<Utc>::default();
        self.caller = None;
    }
}

//! # Rust Field Logger
//!
//! A structured-event logging core: entries carry a level, a message and a
//! set of typed fields, pass a level gate, get rendered by a formatter and
//! are fanned out to level-filtered hooks.
//!
//! ## Features
//!
//! - **Lock-free gate**: disabled levels cost one atomic load
//! - **Two text layouts**: `key=value` lines when piped, aligned and colored
//!   lines on a terminal
//! - **JSON output**: one object per line with renameable core keys
//! - **Fallible hooks**: a failing or panicking hook never affects the others
//!
//! ## Example
//!
//! ```
//! use rust_field_logger::prelude::*;
//!
//! let logger = Logger::builder()
//!     .level(LogLevel::Debug)
//!     .output(Output::writer(std::io::sink()))
//!     .formatter(JsonFormatter::new())
//!     .build();
//!
//! logger.with_field("code", 503).warn("request failed")?;
//! # Ok::<(), LoggerError>(())
//! ```

pub mod core;
pub mod formatters;
pub mod hooks;
pub mod macros;

pub mod prelude {
    pub use crate::core::{
        terminal, Caller, ColorScheme, EntryBuilder, FieldValue, Fields, FnHook, Formatter, Hook,
        LevelHooks, LogEntry, LogLevel, Logger, LoggerBuilder, LoggerError, LoggerMetrics, Output,
        Result, TimestampFormat,
    };
    pub use crate::formatters::{FieldOrdering, JsonFormatter, TextFormatter};
    pub use crate::hooks::WriterHook;
}

pub use crate::core::{
    Caller, ColorScheme, EntryBuilder, EntryPool, FieldKey, FieldMap, FieldValue, Fields, FnHook,
    Formatter, Hook, LevelCheck, LevelHooks, LogEntry, LogLevel, Logger, LoggerBuilder,
    LoggerError, LoggerMetrics, Output, PooledEntry, Result, TimestampFormat,
};
pub use crate::formatters::{JsonFormatter, TextFormatter};

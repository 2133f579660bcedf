//! Core logger types and traits

pub mod color;
pub mod entry_builder;
pub mod entry_pool;
pub mod error;
pub mod field;
pub mod field_map;
pub mod formatter;
pub mod hook;
pub mod log_entry;
pub mod log_level;
pub mod log_writer;
pub mod logger;
pub mod metrics;
pub mod terminal;
pub mod timestamp;

pub use color::{ColorScheme, CompiledColorScheme, Style};
pub use entry_builder::{EntryBuilder, ERROR_KEY};
pub use entry_pool::{EntryPool, PooledEntry};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldKind, FieldValue, Fields};
pub use field_map::{resolve_field_clashes, FieldKey, FieldMap, CLASH_PREFIX};
pub use formatter::Formatter;
pub use hook::{FnHook, Hook, LevelHooks};
pub use log_entry::{Caller, LogEntry};
pub use log_level::{check, LevelCheck, LogLevel, ALL_LEVELS, LEVEL_COUNT};
pub use log_writer::LogWriter;
pub use logger::{ErrorHandler, Logger, LoggerBuilder, Output};
pub use metrics::LoggerMetrics;
pub use terminal::{color_override, env_color_override, TerminalCheck};
pub use timestamp::{base_timestamp, compact_timestamp, init_base_timestamp, TimestampFormat};

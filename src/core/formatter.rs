//! Formatter trait for rendering log entries

use super::{error::Result, log_entry::LogEntry};
use std::sync::Arc;

/// Renders one entry into bytes, including the trailing newline.
///
/// Implementations must be safe to call from many threads at once.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>>;

    fn name(&self) -> &str {
        "custom"
    }
}

impl<F: Formatter + ?Sized> Formatter for Arc<F> {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        (**self).format(entry)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<F: Formatter + ?Sized> Formatter for Box<F> {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        (**self).format(entry)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

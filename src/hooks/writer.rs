//! Hook that formats entries and writes them to any `io::Write`

use crate::core::{Formatter, Hook, LogEntry, LogLevel, LoggerError, Result, ALL_LEVELS};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

/// Formats each delivered entry with its own formatter and writes the bytes
/// to `W`, flushing after every entry.
///
/// # Example
///
/// ```
/// use rust_field_logger::hooks::WriterHook;
/// use rust_field_logger::prelude::*;
///
/// let audit = WriterHook::new(Vec::new(), JsonFormatter::new())
///     .with_levels(vec![LogLevel::Error, LogLevel::Fatal])
///     .with_name("audit");
/// assert_eq!(audit.name(), "audit");
/// ```
pub struct WriterHook<W: Write + Send> {
    writer: Mutex<W>,
    formatter: Arc<dyn Formatter>,
    levels: Vec<LogLevel>,
    name: String,
}

impl<W: Write + Send> WriterHook<W> {
    /// Hook for every level
    pub fn new<F: Formatter + 'static>(writer: W, formatter: F) -> Self {
        Self {
            writer: Mutex::new(writer),
            formatter: Arc::new(formatter),
            levels: ALL_LEVELS.to_vec(),
            name: "writer".to_string(),
        }
    }

    #[must_use]
    pub fn with_levels(mut self, levels: Vec<LogLevel>) -> Self {
        self.levels = levels;
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> Hook for WriterHook<W> {
    fn levels(&self) -> Vec<LogLevel> {
        self.levels.clone()
    }

    fn fire(&self, entry: &LogEntry) -> Result<()> {
        let bytes = self.formatter.format(entry)?;

        let mut writer = self.writer.lock();
        writer
            .write_all(&bytes)
            .and_then(|()| writer.flush())
            .map_err(|e| {
                LoggerError::io_operation(format!("firing hook '{}'", self.name), e.to_string(), e)
            })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::{JsonFormatter, TextFormatter};
    use std::io;
    use tempfile::NamedTempFile;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fire_writes_formatted_entry() {
        let hook = WriterHook::new(
            Vec::new(),
            TextFormatter::new()
                .with_terminal_check(crate::core::terminal::fixed(false))
                .with_disable_timestamp(true),
        );
        hook.fire(&LogEntry::new(LogLevel::Info, "sent")).expect("fire");
        hook.fire(&LogEntry::new(LogLevel::Warn, "again")).expect("fire");

        assert_eq!(hook.into_inner(), b"level=info msg=sent\nlevel=warn msg=again\n");
    }

    #[test]
    fn test_fire_to_file() {
        let file = NamedTempFile::new().expect("temp file");
        let hook = WriterHook::new(
            file.reopen().expect("reopen"),
            JsonFormatter::new().with_disable_timestamp(true),
        )
        .with_levels(vec![LogLevel::Error]);

        assert_eq!(hook.levels(), vec![LogLevel::Error]);
        hook.fire(&LogEntry::new(LogLevel::Error, "disk full")).expect("fire");

        let contents = std::fs::read_to_string(file.path()).expect("read back");
        assert_eq!(contents, "{\"level\":\"error\",\"msg\":\"disk full\"}\n");
    }

    #[test]
    fn test_write_failure_names_hook() {
        let hook = WriterHook::new(BrokenPipe, JsonFormatter::new()).with_name("remote");
        let err = hook
            .fire(&LogEntry::new(LogLevel::Info, "x"))
            .expect_err("write fails");
        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("firing hook 'remote'"));
    }
}

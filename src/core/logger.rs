//! Main logger implementation

use super::{
    entry_builder::EntryBuilder,
    error::{LoggerError, Result},
    field::{FieldValue, Fields},
    formatter::Formatter,
    hook::{Hook, LevelHooks},
    log_entry::{Caller, LogEntry},
    log_level::LogLevel,
    log_writer::LogWriter,
    metrics::LoggerMetrics,
    terminal::{self, TerminalCheck},
    timestamp::init_base_timestamp,
};
use crate::formatters::TextFormatter;
use parking_lot::{Mutex, RwLock};
use std::any::Any;
use std::fmt;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/// Receives hook failures; the first argument is the hook name.
pub type ErrorHandler = Arc<dyn Fn(&str, &LoggerError) + Send + Sync>;

fn default_error_handler() -> ErrorHandler {
    Arc::new(|hook, err| {
        eprintln!("[LOGGER ERROR] Failed to fire hook '{}': {}", hook, err);
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Destination of the primary rendering
pub enum Output {
    Stdout,
    Stderr,
    Writer(Box<dyn Write + Send>),
}

impl Output {
    pub fn writer<W: Write + Send + 'static>(writer: W) -> Self {
        Output::Writer(Box::new(writer))
    }

    /// Terminal probe matching this output. Arbitrary writers never count
    /// as terminals.
    pub fn terminal_check(&self) -> TerminalCheck {
        match self {
            Output::Stdout => terminal::stdout(),
            Output::Stderr => terminal::stderr(),
            Output::Writer(_) => terminal::fixed(false),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout => io::stdout().lock().write(buf),
            Output::Stderr => io::stderr().lock().write(buf),
            Output::Writer(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().lock().write_all(buf),
            Output::Stderr => io::stderr().lock().write_all(buf),
            Output::Writer(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().flush(),
            Output::Stderr => io::stderr().flush(),
            Output::Writer(w) => w.flush(),
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Stdout => f.write_str("Stdout"),
            Output::Stderr => f.write_str("Stderr"),
            Output::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

/// Synchronous dispatcher: gate, render, write, then fire hooks.
///
/// Every setter takes `&self`, so a logger can be shared behind an `Arc`
/// and reconfigured while other threads log through it.
pub struct Logger {
    level: AtomicU8,
    formatter: RwLock<Arc<dyn Formatter>>,
    output: Mutex<Output>,
    hooks: RwLock<LevelHooks>,
    report_caller: AtomicBool,
    error_handler: RwLock<ErrorHandler>,
    /// Pipeline health counters
    metrics: LoggerMetrics,
}

impl Logger {
    /// Logger writing text to stderr at `Info`
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_field_logger::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .level(LogLevel::Debug)
    ///     .output(Output::writer(std::io::sink()))
    ///     .build();
    /// assert!(logger.is_enabled(LogLevel::Debug));
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn set_level(&self, level: LogLevel) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or_default()
    }

    /// Lock-free gate; call sites consult it before building fields.
    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level as u8 >= self.level.load(Ordering::Relaxed)
    }

    pub fn set_formatter<F: Formatter + 'static>(&self, formatter: F) {
        *self.formatter.write() = Arc::new(formatter);
    }

    /// Replace the output stream. The formatter keeps whatever terminal
    /// decision it already made.
    pub fn set_output(&self, output: Output) {
        *self.output.lock() = output;
    }

    pub fn add_hook<H: Hook + 'static>(&self, hook: H) {
        self.hooks.write().add(Arc::new(hook));
    }

    /// Swap the whole hook registry, returning the previous one.
    pub fn replace_hooks(&self, hooks: LevelHooks) -> LevelHooks {
        std::mem::replace(&mut *self.hooks.write(), hooks)
    }

    pub fn set_report_caller(&self, enabled: bool) {
        self.report_caller.store(enabled, Ordering::Relaxed);
    }

    pub fn report_caller(&self) -> bool {
        self.report_caller.load(Ordering::Relaxed)
    }

    pub fn set_error_handler(&self, handler: ErrorHandler) {
        *self.error_handler.write() = handler;
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> Result<()> {
        if !self.is_enabled(level) {
            return Ok(());
        }
        self.dispatch(&LogEntry::new(level, message))
    }

    pub fn log_fields(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        fields: Fields,
    ) -> Result<()> {
        if !self.is_enabled(level) {
            return Ok(());
        }
        self.dispatch(&LogEntry::new(level, message).with_fields(fields))
    }

    /// Dispatch a prepared entry, subject to the level gate.
    pub fn log_entry(&self, entry: LogEntry) -> Result<()> {
        if !self.is_enabled(entry.level) {
            return Ok(());
        }
        self.dispatch(&entry)
    }

    /// Like [`Logger::log_entry`], attaching the call site when caller
    /// reporting is on. The logging macros go through here.
    pub fn log_entry_at(
        &self,
        mut entry: LogEntry,
        function: &str,
        file: &str,
        line: u32,
    ) -> Result<()> {
        if !self.is_enabled(entry.level) {
            return Ok(());
        }
        if self.report_caller() {
            entry.caller = Some(Caller::new(function, file, line));
        }
        self.dispatch(&entry)
    }

    #[inline]
    pub fn debug(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Debug, message)
    }

    #[inline]
    pub fn info(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Info, message)
    }

    #[inline]
    pub fn warn(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Warn, message)
    }

    #[inline]
    pub fn error(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Error, message)
    }

    /// Logs at `Panic`. Does not unwind.
    #[inline]
    pub fn panic(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Panic, message)
    }

    /// Logs at `Fatal`. Does not exit; termination is up to the caller.
    #[inline]
    pub fn fatal(&self, message: impl Into<String>) -> Result<()> {
        self.log(LogLevel::Fatal, message)
    }

    pub fn with_field(&self, key: impl Into<String>, value: impl Into<FieldValue>) -> EntryBuilder<'_> {
        EntryBuilder::new(self).with_field(key, value)
    }

    pub fn with_fields(&self, fields: Fields) -> EntryBuilder<'_> {
        EntryBuilder::new(self).with_fields(fields)
    }

    pub fn with_error<E>(&self, err: E) -> EntryBuilder<'_>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EntryBuilder::new(self).with_error(err)
    }

    /// An `io::Write` adapter that logs each written line at `level`
    pub fn writer(&self, level: LogLevel) -> LogWriter<'_> {
        LogWriter::new(self, level)
    }

    fn dispatch(&self, entry: &LogEntry) -> Result<()> {
        self.metrics.record_logged();
        let primary = self.write_primary(entry);
        self.fire_hooks(entry);
        primary
    }

    fn write_primary(&self, entry: &LogEntry) -> Result<()> {
        let formatter = self.formatter.read().clone();
        let bytes = formatter.format(entry).inspect_err(|_| {
            self.metrics.record_format_failure();
        })?;

        let mut output = self.output.lock();
        output
            .write_all(&bytes)
            .and_then(|()| output.flush())
            .map_err(|e| {
                self.metrics.record_write_failure();
                LoggerError::io_operation("writing log entry", e.to_string(), e)
            })
    }

    /// Fire every hook registered for the entry's level, in registration
    /// order. Failures and panics go to the error handler and never reach
    /// the caller.
    fn fire_hooks(&self, entry: &LogEntry) {
        let hooks = self.hooks.read().hooks_for(entry.level);
        if hooks.is_empty() {
            return;
        }
        let handler = self.error_handler.read().clone();

        for hook in hooks {
            let err = match panic::catch_unwind(AssertUnwindSafe(|| hook.fire(entry))) {
                Ok(Ok(())) => {
                    self.metrics.record_hook_fired();
                    continue;
                }
                Ok(Err(e)) => e,
                Err(payload) => LoggerError::hook_panicked(hook.name(), panic_message(&*payload)),
            };
            self.metrics.record_hook_failure();
            handler(hook.name(), &err);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("formatter", &self.formatter.read().name())
            .field("hooks", &*self.hooks.read())
            .field("report_caller", &self.report_caller())
            .finish()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_field_logger::prelude::*;
/// use std::sync::Arc;
///
/// let logger = Logger::builder()
///     .level(LogLevel::Warn)
///     .formatter(JsonFormatter::new())
///     .output(Output::writer(Vec::new()))
///     .report_caller(true)
///     .error_handler(Arc::new(|hook, err| eprintln!("{}: {}", hook, err)))
///     .build();
/// ```
pub struct LoggerBuilder {
    level: LogLevel,
    output: Output,
    formatter: Option<Arc<dyn Formatter>>,
    hooks: LevelHooks,
    report_caller: bool,
    error_handler: Option<ErrorHandler>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            level: LogLevel::Info,
            output: Output::Stderr,
            formatter: None,
            hooks: LevelHooks::new(),
            report_caller: false,
            error_handler: None,
        }
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    /// Set the primary formatter
    ///
    /// Without one, the logger renders text and decides between
    /// interactive and structured output by probing the configured output.
    #[must_use = "builder methods return a new value"]
    pub fn formatter<F: Formatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    /// Register a hook
    #[must_use = "builder methods return a new value"]
    pub fn hook<H: Hook + 'static>(mut self, hook: H) -> Self {
        self.hooks.add(Arc::new(hook));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn report_caller(mut self, enabled: bool) -> Self {
        self.report_caller = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = Some(handler);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        init_base_timestamp();

        let formatter = self.formatter.unwrap_or_else(|| {
            Arc::new(TextFormatter::new().with_terminal_check(self.output.terminal_check()))
        });

        Logger {
            level: AtomicU8::new(self.level as u8),
            formatter: RwLock::new(formatter),
            output: Mutex::new(self.output),
            hooks: RwLock::new(self.hooks),
            report_caller: AtomicBool::new(self.report_caller),
            error_handler: RwLock::new(self.error_handler.unwrap_or_else(default_error_handler)),
            metrics: LoggerMetrics::new(),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FnHook;
    use crate::formatters::JsonFormatter;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingFormatter;

    impl Formatter for FailingFormatter {
        fn format(&self, _entry: &LogEntry) -> Result<Vec<u8>> {
            Err(LoggerError::formatter("test", "unsupported value"))
        }
    }

    fn text_logger(buffer: &SharedBuffer) -> Logger {
        Logger::builder()
            .output(Output::writer(buffer.clone()))
            .formatter(
                TextFormatter::new()
                    .with_terminal_check(terminal::fixed(false))
                    .with_disable_timestamp(true),
            )
            .build()
    }

    #[test]
    fn test_builder_defaults() {
        let logger = Logger::builder().output(Output::writer(io::sink())).build();
        assert_eq!(logger.level(), LogLevel::Info);
        assert!(!logger.report_caller());
        assert_eq!(logger.metrics().total_logged(), 0);
    }

    #[test]
    fn test_gate_skips_dispatch() {
        let buffer = SharedBuffer::default();
        let logger = text_logger(&buffer);
        logger.set_level(LogLevel::Warn);

        logger.info("ignored").expect("gated call succeeds");
        logger.warn("kept").expect("write succeeds");

        assert_eq!(buffer.contents(), "level=warn msg=kept\n");
        assert_eq!(logger.metrics().total_logged(), 1);
    }

    #[test]
    fn test_default_formatter_is_structured_for_writers() {
        let buffer = SharedBuffer::default();
        let logger = Logger::builder().output(Output::writer(buffer.clone())).build();
        logger.info("hello").expect("write succeeds");

        let out = buffer.contents();
        assert!(out.starts_with("time="), "got {out:?}");
        assert!(out.ends_with(" level=info msg=hello\n"));
    }

    #[test]
    fn test_fatal_and_panic_do_not_terminate() {
        let buffer = SharedBuffer::default();
        let logger = text_logger(&buffer);
        logger.panic("still here").expect("write succeeds");
        logger.fatal("and here").expect("write succeeds");

        assert_eq!(
            buffer.contents(),
            "level=panic msg=\"still here\"\nlevel=fatal msg=\"and here\"\n"
        );
    }

    #[test]
    fn test_report_caller_attaches_location() {
        let buffer = SharedBuffer::default();
        let logger = text_logger(&buffer);
        let entry = LogEntry::new(LogLevel::Info, "hi");

        logger
            .log_entry_at(entry.clone(), "app::run", "src/main.rs", 7)
            .expect("write succeeds");
        logger.set_report_caller(true);
        logger
            .log_entry_at(entry, "app::run", "src/main.rs", 7)
            .expect("write succeeds");

        let out = buffer.contents();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "level=info msg=hi");
        assert_eq!(lines[1], "level=info msg=hi function=\"app::run\" file=\"src/main.rs:7\"");
    }

    #[test]
    fn test_primary_failure_returned_after_hooks() {
        let fired = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&fired);
        let logger = Logger::builder()
            .output(Output::writer(io::sink()))
            .formatter(FailingFormatter)
            .hook(FnHook::new("count", vec![LogLevel::Error], move |_| {
                *counter.lock() += 1;
                Ok(())
            }))
            .build();

        let result = logger.error("boom");
        assert!(matches!(result, Err(LoggerError::FormatterError { .. })));
        assert_eq!(*fired.lock(), 1);
        assert_eq!(logger.metrics().format_failures(), 1);
    }

    #[test]
    fn test_hook_errors_and_panics_are_isolated() {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reported);
        let delivered = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&delivered);

        let logger = Logger::builder()
            .output(Output::writer(io::sink()))
            .hook(FnHook::new("failing", vec![LogLevel::Warn], |_| {
                Err(LoggerError::hook("failing", "connection refused"))
            }))
            .hook(FnHook::new("panicking", vec![LogLevel::Warn], |_| {
                panic!("hook exploded")
            }))
            .hook(FnHook::new("recording", vec![LogLevel::Warn], move |entry| {
                seen.lock().push(entry.message.clone());
                Ok(())
            }))
            .error_handler(Arc::new(move |hook, err| {
                sink.lock().push(format!("{}: {}", hook, err));
            }))
            .build();

        logger.warn("disk almost full").expect("primary write succeeds");

        assert_eq!(*delivered.lock(), vec!["disk almost full".to_string()]);
        let reported = reported.lock();
        assert_eq!(reported.len(), 2);
        assert!(reported[0].starts_with("failing: Hook 'failing' failed"));
        assert!(reported[1].contains("hook exploded"));
        assert_eq!(logger.metrics().hook_failures(), 2);
        assert_eq!(logger.metrics().hooks_fired(), 1);
    }

    #[test]
    fn test_hooks_only_receive_their_levels() {
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let logger = Logger::builder()
            .level(LogLevel::Debug)
            .output(Output::writer(io::sink()))
            .build();
        logger.add_hook(FnHook::new("errors", vec![LogLevel::Error, LogLevel::Fatal], move |_| {
            *counter.lock() += 1;
            Ok(())
        }));

        logger.debug("d").expect("ok");
        logger.info("i").expect("ok");
        logger.error("e").expect("ok");
        logger.fatal("f").expect("ok");
        assert_eq!(*count.lock(), 2);

        let previous = logger.replace_hooks(LevelHooks::new());
        assert_eq!(previous.len(), 1);
        logger.error("e").expect("ok");
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn test_swap_formatter_and_output() {
        let first = SharedBuffer::default();
        let second = SharedBuffer::default();
        let logger = text_logger(&first);

        logger.set_formatter(JsonFormatter::new().with_disable_timestamp(true));
        logger.set_output(Output::writer(second.clone()));
        logger
            .with_field("code", 503)
            .warn("request failed")
            .expect("write succeeds");

        assert!(first.contents().is_empty());
        assert_eq!(
            second.contents(),
            "{\"code\":503,\"level\":\"warn\",\"msg\":\"request failed\"}\n"
        );
    }
}

//! Logging macros
//!
//! The macros check the level gate before formatting the message or building
//! fields, and record the call site when the logger reports callers.
//!
//! # Examples
//!
//! ```
//! use rust_field_logger::prelude::*;
//! use rust_field_logger::{info, warn};
//!
//! let logger = Logger::builder().output(Output::writer(std::io::sink())).build();
//!
//! // Basic logging
//! info!(logger, "Server started")?;
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port)?;
//!
//! // With fields
//! warn!(logger, "slow query"; "table" => "users", "ms" => 900)?;
//! # Ok::<(), LoggerError>(())
//! ```

/// Log at an explicit level.
///
/// Evaluates to the logger's `Result<()>`.
///
/// # Examples
///
/// ```
/// # use rust_field_logger::prelude::*;
/// # let logger = Logger::builder().output(Output::writer(std::io::sink())).build();
/// use rust_field_logger::log;
/// log!(logger, LogLevel::Info, "Simple message")?;
/// log!(logger, LogLevel::Error, "Error code: {}", 500)?;
/// log!(logger, LogLevel::Warn, "request failed"; "code" => 503, "path" => "/x y")?;
/// # Ok::<(), LoggerError>(())
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $msg:expr; $($key:expr => $value:expr),+ $(,)?) => {{
        let logger = &$logger;
        let level: $crate::LogLevel = $level;
        if logger.is_enabled(level) {
            let entry = $crate::LogEntry::new(level, $msg)$(.with_field($key, $value))+;
            logger.log_entry_at(entry, module_path!(), file!(), line!())
        } else {
            Ok(())
        }
    }};
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        let logger = &$logger;
        let level: $crate::LogLevel = $level;
        if logger.is_enabled(level) {
            let entry = $crate::LogEntry::new(level, format!($($arg)+));
            logger.log_entry_at(entry, module_path!(), file!(), line!())
        } else {
            Ok(())
        }
    }};
}

/// Build a [`Fields`](crate::Fields) set from `key => value` pairs.
///
/// ```
/// use rust_field_logger::fields;
///
/// let fields = fields! { "user" => "alice", "attempt" => 3 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::Fields::new()$(.with($key, $value))*
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use rust_field_logger::prelude::*;
/// # let logger = Logger::builder().output(Output::writer(std::io::sink())).build();
/// use rust_field_logger::debug;
/// debug!(logger, "Counter value: {}", 10)?;
/// # Ok::<(), LoggerError>(())
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use rust_field_logger::prelude::*;
/// # let logger = Logger::builder().output(Output::writer(std::io::sink())).build();
/// use rust_field_logger::error;
/// error!(logger, "Failed to connect to database"; "attempt" => 3)?;
/// # Ok::<(), LoggerError>(())
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message. The process keeps running.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Fatal, $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    use crate::core::{terminal, Logger, LogLevel, Output, Result};
    use crate::formatters::TextFormatter;
    use parking_lot::Mutex;
    use std::io::{self, Write};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logger(capture: &Capture) -> Logger {
        Logger::builder()
            .output(Output::writer(capture.clone()))
            .formatter(
                TextFormatter::new()
                    .with_terminal_check(terminal::fixed(false))
                    .with_disable_timestamp(true),
            )
            .build()
    }

    #[test]
    fn test_log_macro() -> Result<()> {
        let capture = Capture::default();
        let logger = logger(&capture);

        log!(logger, LogLevel::Info, "Test message")?;
        log!(logger, LogLevel::Warn, "Formatted: {}", 42)?;

        assert_eq!(
            capture.contents(),
            "level=info msg=\"Test message\"\nlevel=warn msg=\"Formatted: 42\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_fields_arm() -> Result<()> {
        let capture = Capture::default();
        let logger = logger(&capture);

        warn!(logger, "request failed"; "path" => "/x y", "code" => 503,)?;

        assert_eq!(
            capture.contents(),
            "level=warn msg=\"request failed\" code=503 path=\"/x y\"\n"
        );
        Ok(())
    }

    #[test]
    fn test_level_macros() -> Result<()> {
        let capture = Capture::default();
        let logger = logger(&capture);
        logger.set_level(LogLevel::Debug);

        debug!(logger, "d")?;
        info!(logger, "i")?;
        error!(logger, "e {}", 1)?;
        fatal!(logger, "f")?;

        assert_eq!(
            capture.contents(),
            "level=debug msg=d\nlevel=info msg=i\nlevel=error msg=\"e 1\"\nlevel=fatal msg=f\n"
        );
        Ok(())
    }

    #[test]
    fn test_gated_macro_skips_arguments() -> Result<()> {
        let capture = Capture::default();
        let logger = logger(&capture);
        let evaluated = AtomicUsize::new(0);
        let expensive = || {
            evaluated.fetch_add(1, Ordering::SeqCst);
            "value"
        };

        debug!(logger, "hidden {}", expensive())?;
        debug!(logger, "hidden"; "k" => expensive())?;

        assert_eq!(evaluated.load(Ordering::SeqCst), 0);
        assert!(capture.contents().is_empty());
        Ok(())
    }

    #[test]
    fn test_macro_reports_call_site() -> Result<()> {
        let capture = Capture::default();
        let logger = logger(&capture);
        logger.set_report_caller(true);

        info!(logger, "here")?;

        let line = capture.contents();
        assert!(line.contains("function=\"rust_field_logger::macros::tests\""));
        assert!(line.contains("file=\"src/macros.rs:"));
        Ok(())
    }

    #[test]
    fn test_fields_macro() {
        let fields = fields! { "a" => 1, "b" => "two" };
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("b"));
        assert!(fields!().is_empty());
    }
}

//! `io::Write` adapter that turns written lines into log entries

use super::log_level::LogLevel;
use super::logger::Logger;
use std::io::{self, Write};

/// Buffers bytes and logs each complete line at a fixed level.
///
/// Trailing `\r\n` is stripped. A partial line is logged on
/// [`flush`](Write::flush) or when the writer is dropped.
///
/// ```
/// use rust_field_logger::prelude::*;
/// use std::io::Write;
///
/// let logger = Logger::builder().output(Output::writer(std::io::sink())).build();
/// let mut out = logger.writer(LogLevel::Info);
/// writeln!(out, "child process started").unwrap();
/// ```
#[derive(Debug)]
pub struct LogWriter<'a> {
    logger: &'a Logger,
    level: LogLevel,
    pending: Vec<u8>,
}

impl<'a> LogWriter<'a> {
    pub fn new(logger: &'a Logger, level: LogLevel) -> Self {
        Self {
            logger,
            level,
            pending: Vec::new(),
        }
    }

    fn emit(&self, line: &[u8]) -> io::Result<()> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\r', '\n']);
        self.logger
            .log(self.level, line)
            .map_err(|e| io::Error::other(e.to_string()))
    }
}

impl Write for LogWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let line = std::mem::take(&mut self.pending);
        self.emit(&line)
    }
}

impl Drop for LogWriter<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush log writer: {}", e);
        }
    }
}

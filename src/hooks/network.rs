//! TCP transport for remote hooks
//!
//! Sends rendered entries to a remote server over TCP. Useful for
//! centralized logging in distributed systems.

use crate::core::Result;
use std::io::{self, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Read and write timeout applied to every connection
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Writer that streams bytes to a remote TCP server
///
/// # Example
///
/// ```no_run
/// use rust_field_logger::hooks::{TcpWriter, WriterHook};
/// use rust_field_logger::prelude::*;
///
/// let transport = TcpWriter::connect("127.0.0.1:5000")?;
/// let logger = Logger::new();
/// logger.add_hook(WriterHook::new(transport, JsonFormatter::new()));
/// # Ok::<(), LoggerError>(())
/// ```
#[derive(Debug)]
pub struct TcpWriter {
    stream: Option<TcpStream>,
    address: String,
    reconnect_on_error: bool,
}

impl TcpWriter {
    /// Connect to `addr` (e.g. `"localhost:5000"`)
    ///
    /// # Errors
    ///
    /// Returns error if connection fails
    pub fn connect(addr: impl ToSocketAddrs + ToString) -> Result<Self> {
        let address = addr.to_string();
        let stream = Self::open(&address)?;

        Ok(Self {
            stream: Some(stream),
            address,
            reconnect_on_error: true,
        })
    }

    /// Enable or disable one reconnect-and-resend attempt after a failed write
    ///
    /// Default: enabled
    #[must_use]
    pub fn with_reconnect(mut self, enable: bool) -> Self {
        self.reconnect_on_error = enable;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn open(address: &str) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(address)?;
        stream.set_write_timeout(Some(DEFAULT_TIMEOUT))?;
        stream.set_read_timeout(Some(DEFAULT_TIMEOUT))?;
        // Entries are small; send them as soon as they are written.
        stream.set_nodelay(true)?;
        Ok(stream)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<()> {
        match self.stream {
            Some(ref mut stream) => stream.write_all(buf),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                format!("not connected to {}", self.address),
            )),
        }
    }
}

impl Write for TcpWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        let err = match self.send(buf) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        self.stream = None;
        if !self.reconnect_on_error {
            return Err(err);
        }

        match Self::open(&self.address) {
            Ok(stream) => {
                self.stream = Some(stream);
                self.send(buf)
            }
            Err(reconnect_err) => Err(io::Error::new(
                err.kind(),
                format!(
                    "failed to send log and reconnect: {} (reconnect: {})",
                    err, reconnect_err
                ),
            )),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            Some(ref mut stream) => stream.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for TcpWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

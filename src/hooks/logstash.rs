//! Logstash formatting and hook
//!
//! Entries are sent as JSON with `@timestamp` and `message` keys plus a set
//! of default fields. Defaults are applied to a pooled copy of the entry, so
//! the primary rendering and other hooks never see them.

use super::network::TcpWriter;
use super::writer::WriterHook;
use crate::core::{EntryPool, FieldKey, FieldMap, Fields, Formatter, LogEntry, Result};
use crate::formatters::JsonFormatter;
use std::net::ToSocketAddrs;
use std::sync::Arc;

/// Name map used by the default Logstash formatter
pub fn logstash_field_map() -> FieldMap {
    FieldMap::new()
        .with(FieldKey::Time, "@timestamp")
        .with(FieldKey::Msg, "message")
}

/// Add `@version=1` and `type=log` unless `fields` already sets them
pub fn with_logstash_defaults(mut fields: Fields) -> Fields {
    fields.insert_missing("@version", "1");
    fields.insert_missing("type", "log");
    fields
}

/// Formatter that renders a copy of each entry with default fields added.
///
/// Entry fields take precedence over the defaults.
pub struct LogstashFormatter {
    inner: Box<dyn Formatter>,
    defaults: Fields,
    pool: Option<Arc<EntryPool>>,
}

impl LogstashFormatter {
    /// JSON output with the Logstash key names and default fields
    pub fn new(defaults: Fields) -> Self {
        Self::with_formatter(
            JsonFormatter::new().with_field_map(logstash_field_map()),
            with_logstash_defaults(defaults),
        )
    }

    /// Use `inner` as-is with exactly `defaults`
    pub fn with_formatter<F: Formatter + 'static>(inner: F, defaults: Fields) -> Self {
        Self {
            inner: Box::new(inner),
            defaults,
            pool: None,
        }
    }

    /// Draw copies from `pool` instead of the process-wide pool
    #[must_use]
    pub fn with_pool(mut self, pool: Arc<EntryPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn defaults(&self) -> &Fields {
        &self.defaults
    }

    fn pool(&self) -> &EntryPool {
        match self.pool {
            Some(ref pool) => pool,
            None => EntryPool::global(),
        }
    }
}

impl Formatter for LogstashFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        // The copy goes back to the pool when it drops, on success or error.
        let copy = self.pool().copy_entry(entry, &self.defaults);
        self.inner.format(&copy)
    }

    fn name(&self) -> &str {
        "logstash"
    }
}

/// Hook shipping every level to a Logstash TCP input at `addr`
pub fn logstash_hook(
    addr: impl ToSocketAddrs + ToString,
    defaults: Fields,
) -> Result<WriterHook<TcpWriter>> {
    let transport = TcpWriter::connect(addr)?;
    Ok(WriterHook::new(transport, LogstashFormatter::new(defaults)).with_name("logstash"))
}

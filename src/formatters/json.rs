//! JSON formatter for structured logging
//!
//! Writes each entry as a single-line JSON object (JSONL format), compatible
//! with log aggregation tools like ELK or Loki.

use super::{caller_parts, CallerPrettyfier};
use crate::core::{
    resolve_field_clashes, FieldKey, FieldMap, Formatter, LogEntry, Result, TimestampFormat,
};
use serde_json::{Map, Value};

/// JSON formatter
///
/// Caller fields share the top-level object with `time`, `level` and `msg`
/// unless a data key nests them; clashing keys are renamed the same way the
/// text formatter renames them.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    timestamp_format: TimestampFormat,
    disable_timestamp: bool,
    field_map: FieldMap,
    data_key: Option<String>,
    pretty_print: bool,
    caller_prettyfier: Option<CallerPrettyfierSlot>,
}

/// Wrapper so the formatter can keep deriving `Debug`
#[derive(Clone)]
struct CallerPrettyfierSlot(CallerPrettyfier);

impl std::fmt::Debug for CallerPrettyfierSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CallerPrettyfier(..)")
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_disable_timestamp(mut self, disable: bool) -> Self {
        self.disable_timestamp = disable;
        self
    }

    #[must_use]
    pub fn with_field_map(mut self, field_map: FieldMap) -> Self {
        self.field_map = field_map;
        self
    }

    /// Nest caller fields under `key` instead of the top level
    #[must_use]
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }

    #[must_use]
    pub fn with_caller_prettyfier(mut self, prettyfier: CallerPrettyfier) -> Self {
        self.caller_prettyfier = Some(CallerPrettyfierSlot(prettyfier));
        self
    }

    pub fn field_map(&self) -> &FieldMap {
        &self.field_map
    }

    /// Build the JSON object for an entry without serializing it
    pub fn to_object(&self, entry: &LogEntry) -> Result<Map<String, Value>> {
        let mut root = Map::new();

        match self.data_key {
            Some(ref data_key) => {
                if !entry.fields.is_empty() {
                    let mut data = Map::new();
                    for (key, value) in entry.fields.iter() {
                        data.insert(key.to_string(), value.to_json_value(key)?);
                    }
                    root.insert(data_key.clone(), Value::Object(data));
                }
            }
            None => {
                for (key, value) in
                    resolve_field_clashes(&entry.fields, &self.field_map, entry.has_caller())
                {
                    let json = value.to_json_value(&key)?;
                    root.insert(key.into_owned(), json);
                }
            }
        }

        if !self.disable_timestamp {
            root.insert(
                self.field_map.resolve(FieldKey::Time).to_string(),
                self.timestamp_format.to_json_value(&entry.timestamp),
            );
        }
        root.insert(
            self.field_map.resolve(FieldKey::Msg).to_string(),
            Value::String(entry.message.clone()),
        );
        root.insert(
            self.field_map.resolve(FieldKey::Level).to_string(),
            Value::String(entry.level.as_str().to_string()),
        );

        if let Some(ref caller) = entry.caller {
            let prettyfier = self.caller_prettyfier.as_ref().map(|slot| &slot.0);
            let (function, file) = caller_parts(caller, prettyfier);
            if !function.is_empty() {
                root.insert(self.field_map.resolve(FieldKey::Func).to_string(), function.into());
            }
            if !file.is_empty() {
                root.insert(self.field_map.resolve(FieldKey::File).to_string(), file.into());
            }
        }

        Ok(root)
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let object = Value::Object(self.to_object(entry)?);
        let mut bytes = if self.pretty_print {
            serde_json::to_vec_pretty(&object)?
        } else {
            serde_json::to_vec(&object)?
        };
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn name(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Caller, FieldValue, LogLevel, LoggerError};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).expect("valid JSON")
    }

    fn fixed_entry() -> LogEntry {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).single().expect("valid");
        LogEntry::new(LogLevel::Warn, "request failed")
            .with_field("code", 503)
            .with_field("path", "/x y")
            .with_timestamp(at)
    }

    #[test]
    fn test_basic_object() {
        let bytes = JsonFormatter::new().format(&fixed_entry()).expect("format");
        assert_eq!(bytes.last(), Some(&b'\n'));
        assert_eq!(
            parse(&bytes),
            serde_json::json!({
                "time": "2024-03-01T08:00:00+00:00",
                "level": "warn",
                "msg": "request failed",
                "code": 503,
                "path": "/x y"
            })
        );
    }

    #[test]
    fn test_numeric_timestamp() {
        let formatter = JsonFormatter::new().with_timestamp_format(TimestampFormat::Unix);
        let value = parse(&formatter.format(&fixed_entry()).expect("format"));
        assert_eq!(value["time"], serde_json::json!(1709280000_i64));
    }

    #[test]
    fn test_clashes_and_field_map() {
        let formatter = JsonFormatter::new()
            .with_disable_timestamp(true)
            .with_field_map(FieldMap::new().with(FieldKey::Msg, "message"));
        let entry = LogEntry::new(LogLevel::Info, "real")
            .with_field("message", "shadow")
            .with_field("level", "custom");
        let value = parse(&formatter.format(&entry).expect("format"));

        assert_eq!(value["message"], "real");
        assert_eq!(value["fields.message"], "shadow");
        assert_eq!(value["level"], "info");
        assert_eq!(value["fields.level"], "custom");
        assert!(value.get("time").is_none());
    }

    #[test]
    fn test_data_key_nests_fields() {
        let formatter = JsonFormatter::new().with_data_key("data").with_disable_timestamp(true);
        let entry = LogEntry::new(LogLevel::Info, "m").with_field("msg", "inner");
        let value = parse(&formatter.format(&entry).expect("format"));
        assert_eq!(value["msg"], "m");
        assert_eq!(value["data"]["msg"], "inner");
    }

    #[test]
    fn test_caller_and_error_values() {
        let formatter = JsonFormatter::new()
            .with_disable_timestamp(true)
            .with_caller_prettyfier(Arc::new(|c: &Caller| (c.function.clone(), String::new())));
        let entry = LogEntry::new(LogLevel::Error, "failed")
            .with_field("error", FieldValue::error(std::io::Error::other("timeout")))
            .with_caller(Caller::new("svc::call", "src/svc.rs", 9));
        let value = parse(&formatter.format(&entry).expect("format"));

        assert_eq!(value["function"], "svc::call");
        assert!(value.get("file").is_none());
        assert_eq!(value["error"], "timeout");
    }

    #[test]
    fn test_non_finite_float_is_render_failure() {
        let entry = LogEntry::new(LogLevel::Info, "m").with_field("ratio", f64::NAN);
        let result = JsonFormatter::new().format(&entry);
        assert!(matches!(result, Err(LoggerError::FormatterError { .. })));
    }

    #[test]
    fn test_pretty_print() {
        let formatter = JsonFormatter::new().with_pretty_print(true).with_disable_timestamp(true);
        let bytes = formatter.format(&LogEntry::new(LogLevel::Info, "m")).expect("format");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.contains("\n  \"level\": \"info\""));
        assert!(text.ends_with("}\n"));
    }
}

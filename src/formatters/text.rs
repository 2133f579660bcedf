//! Text formatter
//!
//! Renders an entry in one of two layouts, chosen once per formatter from
//! the terminal probe (or forced with `force_formatting`):
//!
//! - structured: `time=... level=warn msg="request failed" code=503`
//! - interactive: `[0012]  WARN db: connection closed code=503`, with the
//!   level, prefix and timestamp colored when the color policy allows it

use super::{caller_parts, CallerPrettyfier};
use crate::core::{
    base_timestamp, compact_timestamp, resolve_field_clashes, terminal, ColorScheme,
    CompiledColorScheme, FieldKey, FieldMap, FieldValue, Formatter, LogEntry, LogLevel,
    LoggerError, Result, TerminalCheck, TimestampFormat,
};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::sync::{Arc, LazyLock, OnceLock};

static PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.*?)\]").expect("Invalid prefix regex"));

const DEFAULT_QUOTE: &str = "\"";

/// Split a leading `[tag]` off a message.
///
/// Returns the tag and the trimmed remainder, or `("", message)` when the
/// message has no non-empty bracketed tag.
///
/// ```
/// use rust_field_logger::formatters::extract_prefix;
///
/// assert_eq!(extract_prefix("[db] connection closed"), ("db", "connection closed"));
/// assert_eq!(extract_prefix("[db]"), ("db", ""));
/// assert_eq!(extract_prefix("no brackets here"), ("", "no brackets here"));
/// ```
pub fn extract_prefix(message: &str) -> (&str, &str) {
    let Some(caps) = PREFIX_REGEX.captures(message) else {
        return ("", message);
    };
    let (Some(whole), Some(tag)) = (caps.get(0), caps.get(1)) else {
        return ("", message);
    };
    if tag.as_str().is_empty() {
        return ("", message);
    }
    (tag.as_str(), message[whole.end()..].trim())
}

/// Order of the field tail in structured output
#[derive(Clone, Default)]
pub enum FieldOrdering {
    /// Byte-wise by key
    #[default]
    Lexical,
    /// Insertion order of the entry's fields
    Unsorted,
    /// Caller-supplied comparator over keys
    Custom(Arc<dyn Fn(&str, &str) -> Ordering + Send + Sync>),
}

impl fmt::Debug for FieldOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldOrdering::Lexical => f.write_str("Lexical"),
            FieldOrdering::Unsorted => f.write_str("Unsorted"),
            FieldOrdering::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Values computed on first render and fixed afterwards
#[derive(Debug, Clone, Copy)]
struct FormatterState {
    is_terminal: bool,
    level_width: usize,
}

/// Text formatter
///
/// # Example
///
/// ```
/// use rust_field_logger::prelude::*;
///
/// let formatter = TextFormatter::new()
///     .with_terminal_check(terminal::fixed(false))
///     .with_disable_timestamp(true);
///
/// let entry = LogEntry::new(LogLevel::Warn, "request failed")
///     .with_field("code", 503)
///     .with_field("path", "/x y");
/// let line = formatter.format(&entry).unwrap();
/// assert_eq!(line, b"level=warn msg=\"request failed\" code=503 path=\"/x y\"\n");
/// ```
pub struct TextFormatter {
    force_colors: bool,
    disable_colors: bool,
    force_quote: bool,
    disable_quote: bool,
    environment_override_colors: bool,
    disable_timestamp: bool,
    full_timestamp: bool,
    timestamp_format: TimestampFormat,
    field_ordering: FieldOrdering,
    level_truncation: Option<usize>,
    quote_empty_fields: bool,
    field_map: FieldMap,
    caller_prettyfier: Option<CallerPrettyfier>,
    force_formatting: bool,
    disable_uppercase: bool,
    quote_character: String,
    space_padding: usize,
    color_scheme: Option<CompiledColorScheme>,
    terminal_check: TerminalCheck,
    base_timestamp: Option<DateTime<Utc>>,
    state: OnceLock<FormatterState>,
}

impl TextFormatter {
    /// Formatter probing stderr, lexical field order, RFC 3339 timestamps
    pub fn new() -> Self {
        Self {
            force_colors: false,
            disable_colors: false,
            force_quote: false,
            disable_quote: false,
            environment_override_colors: false,
            disable_timestamp: false,
            full_timestamp: false,
            timestamp_format: TimestampFormat::default(),
            field_ordering: FieldOrdering::default(),
            level_truncation: None,
            quote_empty_fields: false,
            field_map: FieldMap::new(),
            caller_prettyfier: None,
            force_formatting: false,
            disable_uppercase: false,
            quote_character: DEFAULT_QUOTE.to_string(),
            space_padding: 0,
            color_scheme: None,
            terminal_check: terminal::stderr(),
            base_timestamp: None,
            state: OnceLock::new(),
        }
    }

    /// Build a formatter from a deserialized configuration
    pub fn from_config(config: &TextFormatterConfig) -> Result<Self> {
        if config.level_truncation == Some(0) {
            return Err(LoggerError::config(
                "text formatter",
                "level_truncation must be at least 1",
            ));
        }

        let mut formatter = Self::new()
            .with_force_colors(config.force_colors)
            .with_disable_colors(config.disable_colors)
            .with_force_quote(config.force_quote)
            .with_disable_quote(config.disable_quote)
            .with_environment_override_colors(config.environment_override_colors)
            .with_disable_timestamp(config.disable_timestamp)
            .with_full_timestamp(config.full_timestamp)
            .with_timestamp_format(config.timestamp_format.clone())
            .with_quote_empty_fields(config.quote_empty_fields)
            .with_field_map(config.field_map.clone())
            .with_force_formatting(config.force_formatting)
            .with_disable_uppercase(config.disable_uppercase)
            .with_quote_character(config.quote_character.clone())
            .with_space_padding(config.space_padding);

        if config.disable_sorting {
            formatter = formatter.with_field_ordering(FieldOrdering::Unsorted);
        }
        if let Some(width) = config.level_truncation {
            formatter = formatter.with_level_truncation(width);
        }
        if let Some(ref scheme) = config.color_scheme {
            formatter = formatter.with_color_scheme(scheme);
        }
        Ok(formatter)
    }

    #[must_use]
    pub fn with_force_colors(mut self, force: bool) -> Self {
        self.force_colors = force;
        self
    }

    #[must_use]
    pub fn with_disable_colors(mut self, disable: bool) -> Self {
        self.disable_colors = disable;
        self
    }

    /// Quote every textual value. Takes precedence over `disable_quote`.
    #[must_use]
    pub fn with_force_quote(mut self, force: bool) -> Self {
        self.force_quote = force;
        self
    }

    #[must_use]
    pub fn with_disable_quote(mut self, disable: bool) -> Self {
        self.disable_quote = disable;
        self
    }

    /// Honor `CLICOLOR_FORCE` and `CLICOLOR` when deciding on colors
    #[must_use]
    pub fn with_environment_override_colors(mut self, enabled: bool) -> Self {
        self.environment_override_colors = enabled;
        self
    }

    #[must_use]
    pub fn with_disable_timestamp(mut self, disable: bool) -> Self {
        self.disable_timestamp = disable;
        self
    }

    /// Show the formatted wall-clock time instead of seconds since start
    /// in interactive output.
    #[must_use]
    pub fn with_full_timestamp(mut self, full: bool) -> Self {
        self.full_timestamp = full;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Order of structured-mode fields. Interactive output always sorts
    /// lexically.
    #[must_use]
    pub fn with_field_ordering(mut self, ordering: FieldOrdering) -> Self {
        self.field_ordering = ordering;
        self
    }

    /// Truncate interactive level labels to `width` characters and align
    /// them to that width.
    #[must_use]
    pub fn with_level_truncation(mut self, width: usize) -> Self {
        self.level_truncation = Some(width.max(1));
        self
    }

    #[must_use]
    pub fn with_quote_empty_fields(mut self, quote: bool) -> Self {
        self.quote_empty_fields = quote;
        self
    }

    #[must_use]
    pub fn with_field_map(mut self, field_map: FieldMap) -> Self {
        self.field_map = field_map;
        self
    }

    #[must_use]
    pub fn with_caller_prettyfier(mut self, prettyfier: CallerPrettyfier) -> Self {
        self.caller_prettyfier = Some(prettyfier);
        self
    }

    /// Use the interactive layout even when not writing to a terminal
    #[must_use]
    pub fn with_force_formatting(mut self, force: bool) -> Self {
        self.force_formatting = force;
        self
    }

    #[must_use]
    pub fn with_disable_uppercase(mut self, disable: bool) -> Self {
        self.disable_uppercase = disable;
        self
    }

    /// Replace the `"` used around quoted values. An empty string restores
    /// the default.
    #[must_use]
    pub fn with_quote_character(mut self, quote: impl Into<String>) -> Self {
        self.quote_character = quote.into();
        self
    }

    /// Right-pad interactive messages to `width` characters
    #[must_use]
    pub fn with_space_padding(mut self, width: usize) -> Self {
        self.space_padding = width;
        self
    }

    /// Use `scheme` instead of the process-wide default colors
    #[must_use]
    pub fn with_color_scheme(mut self, scheme: &ColorScheme) -> Self {
        self.color_scheme = Some(scheme.compile());
        self
    }

    #[must_use]
    pub fn with_terminal_check(mut self, check: TerminalCheck) -> Self {
        self.terminal_check = check;
        self
    }

    /// Measure compact timestamps from `base` instead of the process base
    #[must_use]
    pub fn with_base_timestamp(mut self, base: DateTime<Utc>) -> Self {
        self.base_timestamp = Some(base);
        self
    }

    fn state(&self) -> FormatterState {
        *self.state.get_or_init(|| FormatterState {
            is_terminal: (self.terminal_check)(),
            level_width: LogLevel::max_label_len(),
        })
    }

    /// Result of the terminal probe, run on first use
    pub fn is_terminal(&self) -> bool {
        self.state().is_terminal
    }

    /// Whether escape codes are emitted in interactive output
    pub fn is_colored(&self) -> bool {
        let mut colored = self.force_colors || (self.is_terminal() && !cfg!(windows));
        if self.environment_override_colors {
            if let Some(forced) = terminal::env_color_override() {
                colored = forced;
            }
        }
        colored && !self.disable_colors
    }

    /// Whether `text` is wrapped in the quote character
    pub fn needs_quoting(&self, text: &str) -> bool {
        if self.force_quote {
            return true;
        }
        if self.quote_empty_fields && text.is_empty() {
            return true;
        }
        if self.disable_quote {
            return false;
        }
        !text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
    }

    fn quote(&self) -> &str {
        if self.quote_character.is_empty() {
            DEFAULT_QUOTE
        } else {
            &self.quote_character
        }
    }

    fn write_text(&self, out: &mut String, text: &str) {
        if self.needs_quoting(text) {
            let quote = self.quote();
            out.push_str(quote);
            out.push_str(text);
            out.push_str(quote);
        } else {
            out.push_str(text);
        }
    }

    fn write_value(&self, out: &mut String, value: &FieldValue) -> fmt::Result {
        match value {
            FieldValue::Str(s) => {
                self.write_text(out, s);
                Ok(())
            }
            textual if textual.is_textual() => {
                let mut text = String::new();
                write!(text, "{}", textual)?;
                self.write_text(out, &text);
                Ok(())
            }
            other => write!(out, "{}", other),
        }
    }

    fn sort_fields(&self, fields: &mut [(Cow<'_, str>, &FieldValue)]) {
        match &self.field_ordering {
            FieldOrdering::Lexical => fields.sort_by(|a, b| a.0.cmp(&b.0)),
            FieldOrdering::Unsorted => {}
            FieldOrdering::Custom(compare) => fields.sort_by(|a, b| compare(&a.0, &b.0)),
        }
    }

    fn level_label(&self, level: LogLevel, max_width: usize) -> String {
        let mut label = if self.disable_uppercase {
            level.as_str().to_string()
        } else {
            level.as_str().to_uppercase()
        };
        let width = match self.level_truncation {
            Some(limit) => {
                if label.chars().count() > limit {
                    label = label.chars().take(limit).collect();
                }
                limit
            }
            None => max_width,
        };
        format!("{:>width$}", label, width = width)
    }

    fn write_structured(&self, out: &mut String, entry: &LogEntry) -> fmt::Result {
        fn push_key(out: &mut String, key: &str) {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(key);
            out.push('=');
        }

        if !self.disable_timestamp {
            push_key(out, self.field_map.resolve(FieldKey::Time));
            self.write_text(out, &self.timestamp_format.format(&entry.timestamp));
        }
        push_key(out, self.field_map.resolve(FieldKey::Level));
        self.write_text(out, entry.level.as_str());
        if !entry.message.is_empty() {
            push_key(out, self.field_map.resolve(FieldKey::Msg));
            self.write_text(out, &entry.message);
        }

        if let Some(ref caller) = entry.caller {
            let (function, file) = caller_parts(caller, self.caller_prettyfier.as_ref());
            if !function.is_empty() {
                push_key(out, self.field_map.resolve(FieldKey::Func));
                self.write_text(out, &function);
            }
            if !file.is_empty() {
                push_key(out, self.field_map.resolve(FieldKey::File));
                self.write_text(out, &file);
            }
        }

        let mut fields = resolve_field_clashes(&entry.fields, &self.field_map, entry.has_caller());
        self.sort_fields(&mut fields);
        for (key, value) in &fields {
            push_key(out, key);
            self.write_value(out, value)?;
        }
        Ok(())
    }

    fn write_interactive(
        &self,
        out: &mut String,
        entry: &LogEntry,
        scheme: &CompiledColorScheme,
        level_width: usize,
    ) -> fmt::Result {
        let level_style = scheme.level(entry.level);
        let prefix_key = self.field_map.resolve(FieldKey::Prefix);

        let mut message = entry.message.as_str();
        let mut prefix = String::new();
        if let Some(value) = entry.fields.get(prefix_key) {
            write!(prefix, " {}:", value)?;
        } else {
            let (tag, rest) = extract_prefix(message);
            if !tag.is_empty() {
                write!(prefix, " {}:", tag)?;
                message = rest;
            }
        }

        if !self.disable_timestamp {
            let timestamp = if self.full_timestamp {
                format!("[{}]", self.timestamp_format.format(&entry.timestamp))
            } else {
                let base = self.base_timestamp.unwrap_or_else(base_timestamp);
                compact_timestamp(entry.timestamp, base)
            };
            out.push_str(&scheme.timestamp.paint(&timestamp));
            out.push(' ');
        }

        out.push_str(&level_style.paint(&self.level_label(entry.level, level_width)));
        if !prefix.is_empty() {
            out.push_str(&scheme.prefix.paint(&prefix));
        }
        write!(out, " {:<width$}", message, width = self.space_padding)?;

        if let Some(ref caller) = entry.caller {
            let (function, file) = caller_parts(caller, self.caller_prettyfier.as_ref());
            for (key, text) in [(FieldKey::Func, function), (FieldKey::File, file)] {
                if text.is_empty() {
                    continue;
                }
                out.push(' ');
                out.push_str(&level_style.paint(self.field_map.resolve(key)));
                out.push('=');
                self.write_text(out, &text);
            }
        }

        let mut fields = resolve_field_clashes(&entry.fields, &self.field_map, entry.has_caller());
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in fields.iter().filter(|(key, _)| *key != prefix_key) {
            out.push(' ');
            out.push_str(&level_style.paint(key));
            out.push('=');
            self.write_value(out, value)?;
        }
        Ok(())
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TextFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFormatter")
            .field("force_colors", &self.force_colors)
            .field("disable_colors", &self.disable_colors)
            .field("disable_timestamp", &self.disable_timestamp)
            .field("full_timestamp", &self.full_timestamp)
            .field("timestamp_format", &self.timestamp_format)
            .field("field_ordering", &self.field_ordering)
            .field("force_formatting", &self.force_formatting)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let state = self.state();
        let mut out = String::with_capacity(128);

        let rendered = if self.force_formatting || state.is_terminal {
            let scheme = if self.is_colored() {
                match self.color_scheme {
                    Some(ref scheme) => scheme,
                    None => CompiledColorScheme::standard(),
                }
            } else {
                CompiledColorScheme::no_colors()
            };
            self.write_interactive(&mut out, entry, scheme, state.level_width)
        } else {
            self.write_structured(&mut out, entry)
        };
        rendered.map_err(|_| LoggerError::formatter("text", "a field value failed to render"))?;

        out.push('\n');
        Ok(out.into_bytes())
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// Serializable subset of [`TextFormatter`] options.
///
/// Closures (comparators, caller prettyfiers, terminal probes) are set in
/// code after [`TextFormatter::from_config`].
///
/// ```
/// use rust_field_logger::formatters::{TextFormatter, TextFormatterConfig};
///
/// let config = TextFormatterConfig::from_json(
///     r#"{"disable_timestamp": true, "quote_character": "'", "level_truncation": 4}"#,
/// ).unwrap();
/// let formatter = TextFormatter::from_config(&config).unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextFormatterConfig {
    pub force_colors: bool,
    pub disable_colors: bool,
    pub force_quote: bool,
    pub disable_quote: bool,
    pub environment_override_colors: bool,
    pub disable_timestamp: bool,
    pub full_timestamp: bool,
    pub timestamp_format: TimestampFormat,
    pub disable_sorting: bool,
    pub level_truncation: Option<usize>,
    pub quote_empty_fields: bool,
    pub field_map: FieldMap,
    pub force_formatting: bool,
    pub disable_uppercase: bool,
    pub quote_character: String,
    pub space_padding: usize,
    pub color_scheme: Option<ColorScheme>,
}

impl Default for TextFormatterConfig {
    fn default() -> Self {
        Self {
            force_colors: false,
            disable_colors: false,
            force_quote: false,
            disable_quote: false,
            environment_override_colors: false,
            disable_timestamp: false,
            full_timestamp: false,
            timestamp_format: TimestampFormat::default(),
            disable_sorting: false,
            level_truncation: None,
            quote_empty_fields: false,
            field_map: FieldMap::new(),
            force_formatting: false,
            disable_uppercase: false,
            quote_character: DEFAULT_QUOTE.to_string(),
            space_padding: 0,
            color_scheme: None,
        }
    }
}

impl TextFormatterConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

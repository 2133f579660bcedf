//! Property-based tests for rust_field_logger using proptest

use proptest::prelude::*;
use rust_field_logger::core::terminal;
use rust_field_logger::prelude::*;
use rust_field_logger::{EntryPool, LevelCheck};

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Warn),
        Just(LogLevel::Error),
        Just(LogLevel::Panic),
        Just(LogLevel::Fatal),
    ]
}

fn structured() -> TextFormatter {
    TextFormatter::new()
        .with_terminal_check(terminal::fixed(false))
        .with_disable_timestamp(true)
}

fn render(formatter: &impl Formatter, entry: &LogEntry) -> String {
    String::from_utf8(formatter.format(entry).expect("format")).expect("utf-8")
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.as_str().parse().expect("known level");
        prop_assert_eq!(level, parsed);
    }

    /// A gate that admits a level admits every more severe level
    #[test]
    fn test_gate_is_monotonic(threshold in any_level(), a in any_level(), b in any_level()) {
        let gate = LevelCheck::new(threshold);
        if gate.check(a) && b >= a {
            prop_assert!(gate.check(b));
        }
        prop_assert_eq!(gate.check(a), a >= threshold);
    }

    /// The logger gate agrees with the standalone check
    #[test]
    fn test_logger_gate_matches_check(threshold in any_level(), level in any_level()) {
        let logger = Logger::builder()
            .level(threshold)
            .output(Output::writer(std::io::sink()))
            .build();
        prop_assert_eq!(logger.is_enabled(level), LevelCheck::new(threshold).check(level));
    }
}

// ============================================================================
// Text Formatter Tests
// ============================================================================

proptest! {
    /// Safe strings stay bare, anything else is quoted
    #[test]
    fn test_quoting_rule(value in "[ -~]{1,24}") {
        let formatter = structured();
        let safe = value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.');
        prop_assert_eq!(formatter.needs_quoting(&value), !safe);
    }

    /// Structured output lists fields in lexical key order
    #[test]
    fn test_fields_are_lexically_ordered(keys in prop::collection::btree_set("[a-e]{1,6}", 1..8)) {
        let mut entry = LogEntry::new(LogLevel::Info, "m");
        for key in keys.iter().rev() {
            entry = entry.with_field(key.clone(), 1);
        }

        let line = render(&structured(), &entry);
        let rendered: Vec<&str> = line
            .trim_end()
            .split(' ')
            .skip(2)
            .map(|pair| pair.split('=').next().unwrap_or_default())
            .collect();
        let expected: Vec<&str> = keys.iter().map(String::as_str).collect();
        prop_assert_eq!(rendered, expected);
    }

    /// Every rendering is exactly one line, whatever the message holds
    #[test]
    fn test_single_line_output(message in "\\PC*", level in any_level()) {
        let entry = LogEntry::new(level, message);
        let line = render(&structured(), &entry);
        prop_assert!(line.ends_with('\n'));
        prop_assert_eq!(line.matches('\n').count(), 1);
    }

    /// Rendering the same entry twice gives the same bytes
    #[test]
    fn test_rendering_is_idempotent(message in "[a-z ]{0,16}", value in any::<i64>()) {
        let entry = LogEntry::new(LogLevel::Warn, message).with_field("n", value);
        let text = structured();
        prop_assert_eq!(render(&text, &entry), render(&text, &entry));

        let json = JsonFormatter::new();
        prop_assert_eq!(render(&json, &entry), render(&json, &entry));
    }
}

// ============================================================================
// Entry Pool Tests
// ============================================================================

proptest! {
    /// Reused entries never carry data from a previous use
    #[test]
    fn test_pooled_entries_come_back_clean(
        messages in prop::collection::vec("[a-z]{1,8}", 1..10),
    ) {
        let pool = EntryPool::new(2);
        for message in &messages {
            let mut entry = pool.acquire();
            prop_assert!(entry.message.is_empty());
            prop_assert!(entry.fields.is_empty());
            prop_assert!(entry.caller.is_none());

            entry.message.push_str(message);
            entry.fields.insert("k", message.clone());
        }
        prop_assert!(pool.idle_count() <= 2);
    }
}

//! Log level definitions and the level gate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log record, strictly ordered from `Debug` to `Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum LogLevel {
    Debug = 0,
    #[default]
    Info = 1,
    Warn = 2,
    Error = 3,
    Panic = 4,
    Fatal = 5,
}

/// Number of defined levels
pub const LEVEL_COUNT: usize = 6;

/// Every defined level, in increasing severity.
pub const ALL_LEVELS: [LogLevel; LEVEL_COUNT] = [
    LogLevel::Debug,
    LogLevel::Info,
    LogLevel::Warn,
    LogLevel::Error,
    LogLevel::Panic,
    LogLevel::Fatal,
];

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Position of this level in [`ALL_LEVELS`]
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Inverse of `level as u8`; out-of-range values yield `None`.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LogLevel::Debug),
            1 => Some(LogLevel::Info),
            2 => Some(LogLevel::Warn),
            3 => Some(LogLevel::Error),
            4 => Some(LogLevel::Panic),
            5 => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Length in characters of the longest level label
    pub fn max_label_len() -> usize {
        ALL_LEVELS
            .iter()
            .map(|level| level.as_str().chars().count())
            .max()
            .unwrap_or(0)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// Returns true if `candidate` passes a gate set at `threshold`.
#[inline]
pub fn check(candidate: LogLevel, threshold: LogLevel) -> bool {
    candidate >= threshold
}

/// A fixed threshold that call sites consult before building any fields.
///
/// ```
/// use rust_field_logger::{LevelCheck, LogLevel};
///
/// let gate = LevelCheck::new(LogLevel::Warn);
/// assert!(!gate.check(LogLevel::Info));
/// assert!(gate.check(LogLevel::Error));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelCheck {
    threshold: LogLevel,
}

impl LevelCheck {
    pub const fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> LogLevel {
        self.threshold
    }

    #[inline]
    pub fn check(&self, level: LogLevel) -> bool {
        check(level, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_ordered() {
        for pair in ALL_LEVELS.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!((pair[0] as u8) < (pair[1] as u8));
        }
    }

    #[test]
    fn test_gate_is_monotonic() {
        for threshold in ALL_LEVELS {
            let gate = LevelCheck::new(threshold);
            for level in ALL_LEVELS {
                assert_eq!(gate.check(level), level >= threshold);
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("Panic".parse::<LogLevel>(), Ok(LogLevel::Panic));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_from_u8_roundtrip() {
        for level in ALL_LEVELS {
            assert_eq!(LogLevel::from_u8(level as u8), Some(level));
        }
        assert_eq!(LogLevel::from_u8(6), None);
    }

    #[test]
    fn test_max_label_len() {
        assert_eq!(LogLevel::max_label_len(), 5);
    }
}

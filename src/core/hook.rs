//! Hook trait and the per-level hook registry

use super::{
    error::Result,
    log_entry::LogEntry,
    log_level::{LogLevel, ALL_LEVELS, LEVEL_COUNT},
};
use std::fmt;
use std::sync::Arc;

/// A sink that receives every entry logged at one of its levels.
///
/// `fire` must not mutate shared state visible to other hooks; hooks that
/// need extra fields format a pooled copy (see [`crate::EntryPool`]).
pub trait Hook: Send + Sync {
    fn levels(&self) -> Vec<LogLevel>;

    fn fire(&self, entry: &LogEntry) -> Result<()>;

    fn name(&self) -> &str {
        "hook"
    }
}

/// Registered hooks, indexed by level, in registration order.
#[derive(Clone, Default)]
pub struct LevelHooks {
    by_level: [Vec<Arc<dyn Hook>>; LEVEL_COUNT],
}

impl LevelHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `hook` for each level it reports
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        let mut levels = hook.levels();
        levels.sort();
        levels.dedup();
        for level in levels {
            self.by_level[level.index()].push(Arc::clone(&hook));
        }
    }

    /// Snapshot of the hooks registered for `level`
    pub fn hooks_for(&self, level: LogLevel) -> Vec<Arc<dyn Hook>> {
        self.by_level[level.index()].clone()
    }

    pub fn has_hooks_for(&self, level: LogLevel) -> bool {
        !self.by_level[level.index()].is_empty()
    }

    /// Number of distinct hooks registered
    pub fn len(&self) -> usize {
        let mut seen: Vec<*const ()> = Vec::new();
        for hook in self.by_level.iter().flatten() {
            let ptr = Arc::as_ptr(hook) as *const ();
            if !seen.contains(&ptr) {
                seen.push(ptr);
            }
        }
        seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_level.iter().all(Vec::is_empty)
    }
}

impl fmt::Debug for LevelHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for level in ALL_LEVELS {
            let names: Vec<&str> = self.by_level[level.index()]
                .iter()
                .map(|h| h.name())
                .collect();
            map.entry(&level, &names);
        }
        map.finish()
    }
}

type HookFn = dyn Fn(&LogEntry) -> Result<()> + Send + Sync;

/// Hook backed by a closure
///
/// ```
/// use rust_field_logger::{FnHook, Hook, LogEntry, LogLevel};
///
/// let hook = FnHook::new("audit", vec![LogLevel::Error], |entry: &LogEntry| {
///     assert_eq!(entry.level, LogLevel::Error);
///     Ok(())
/// });
/// assert_eq!(hook.levels(), vec![LogLevel::Error]);
/// ```
pub struct FnHook {
    name: String,
    levels: Vec<LogLevel>,
    fire: Box<HookFn>,
}

impl FnHook {
    pub fn new<F>(name: impl Into<String>, levels: Vec<LogLevel>, fire: F) -> Self
    where
        F: Fn(&LogEntry) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            levels,
            fire: Box::new(fire),
        }
    }
}

impl Hook for FnHook {
    fn levels(&self) -> Vec<LogLevel> {
        self.levels.clone()
    }

    fn fire(&self, entry: &LogEntry) -> Result<()> {
        (self.fire)(entry)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

//! Reuse pool for derived log entries
//!
//! Hooks that need to add fields before formatting work on a private copy of
//! the record. Copies come from an [`EntryPool`] as a [`PooledEntry`] guard;
//! dropping the guard clears the entry and hands it back, so the release
//! point is always the end of the guard's scope.
//!
//! A reference into a pooled entry cannot outlive its guard:
//!
//! ```compile_fail
//! use rust_field_logger::EntryPool;
//!
//! let pool = EntryPool::new(4);
//! let message: &String = {
//!     let entry = pool.acquire();
//!     &entry.message
//! };
//! println!("{}", message);
//! ```

use super::field::Fields;
use super::log_entry::LogEntry;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::ops::{Deref, DerefMut};
use std::sync::LazyLock;

static GLOBAL_POOL: LazyLock<EntryPool> =
    LazyLock::new(|| EntryPool::new(EntryPool::DEFAULT_CAPACITY));

/// Bounded free-list of [`LogEntry`] values, safe for concurrent use.
#[derive(Debug)]
pub struct EntryPool {
    idle_tx: Sender<LogEntry>,
    idle_rx: Receiver<LogEntry>,
}

impl EntryPool {
    /// Number of idle entries kept by [`EntryPool::global`]
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a pool that retains at most `capacity` idle entries
    pub fn new(capacity: usize) -> Self {
        let (idle_tx, idle_rx) = bounded(capacity.max(1));
        Self { idle_tx, idle_rx }
    }

    /// Process-wide pool shared by the bundled hooks
    pub fn global() -> &'static EntryPool {
        &GLOBAL_POOL
    }

    /// Take a cleared entry from the pool, allocating one if none is idle
    pub fn acquire(&self) -> PooledEntry<'_> {
        let mut entry = self.idle_rx.try_recv().unwrap_or_else(|_| LogEntry::blank());
        entry.reset();
        PooledEntry { pool: self, entry }
    }

    /// Build a private copy of `source` with `defaults` filled in.
    ///
    /// Caller info becomes `function` and `file` fields, then `defaults` are
    /// added, then the source fields are copied over them.
    pub fn copy_entry(&self, source: &LogEntry, defaults: &Fields) -> PooledEntry<'_> {
        let mut copy = self.acquire();
        copy.level = source.level;
        copy.message.push_str(&source.message);
        copy.timestamp = source.timestamp;

        if let Some(ref caller) = source.caller {
            copy.fields.insert("function", caller.function.clone());
            copy.fields.insert("file", caller.location());
        }
        copy.fields.merge(defaults);
        copy.fields.merge(&source.fields);
        copy
    }

    /// Number of entries currently waiting for reuse
    pub fn idle_count(&self) -> usize {
        self.idle_rx.len()
    }

    fn release(&self, mut entry: LogEntry) {
        entry.reset();
        // A full pool simply lets the entry drop.
        let _ = self.idle_tx.try_send(entry);
    }
}

impl Default for EntryPool {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Scoped handle to a pooled entry; returns it to the pool on drop.
#[derive(Debug)]
pub struct PooledEntry<'a> {
    pool: &'a EntryPool,
    entry: LogEntry,
}

impl Deref for PooledEntry<'_> {
    type Target = LogEntry;

    fn deref(&self) -> &LogEntry {
        &self.entry
    }
}

impl DerefMut for PooledEntry<'_> {
    fn deref_mut(&mut self) -> &mut LogEntry {
        &mut self.entry
    }
}

impl Drop for PooledEntry<'_> {
    fn drop(&mut self) {
        // `blank()` does not allocate.
        let entry = std::mem::replace(&mut self.entry, LogEntry::blank());
        self.pool.release(entry);
    }
}

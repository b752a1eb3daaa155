//! Linear undo log of full memory snapshots.
//!
//! Every undoable action records the complete pre-change memory image.
//! Undo pops the latest image back into memory, discarding the current
//! state; there is no redo. Depth is unbounded (a few hundred bytes per
//! entry at the default grid size).

use crate::memory::{Memory, Snapshot};

/// Append-only stack of pre-change memory snapshots.
///
/// Callers must push an entry only for actions that actually committed;
/// that keeps every undo press observable instead of replaying no-ops.
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    entries: Vec<Snapshot>,
}

impl HistoryLog {
    /// Creates an empty log.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Records a snapshot taken immediately before a committed change.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.entries.push(snapshot);
    }

    /// Restores the most recent snapshot into `memory`.
    ///
    /// Returns `false` (and changes nothing) when the log is empty.
    pub fn undo(&mut self, memory: &mut Memory) -> bool {
        self.entries.pop().is_some_and(|snapshot| {
            memory.load(&snapshot);
            true
        })
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry (level load, reset).
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::HistoryLog;
    use crate::memory::{Memory, DBG};

    #[test]
    fn undo_restores_snapshots_in_reverse_order() {
        let mut memory = Memory::with_cells(4);
        let mut log = HistoryLog::new();

        memory.set(DBG, 1);
        log.record(memory.dump());
        memory.set(DBG, 2);
        log.record(memory.dump());
        memory.set(DBG, 3);

        assert!(log.undo(&mut memory));
        assert_eq!(memory.get(DBG), 2);
        assert!(log.undo(&mut memory));
        assert_eq!(memory.get(DBG), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn undo_on_empty_log_is_a_no_op() {
        let mut memory = Memory::with_cells(4);
        memory.set(DBG, 9);
        let before = memory.dump();

        let mut log = HistoryLog::new();
        assert!(!log.undo(&mut memory));
        assert_eq!(&*memory.dump(), &*before);
    }

    #[test]
    fn clear_drops_all_entries() {
        let mut memory = Memory::with_cells(4);
        let mut log = HistoryLog::new();
        log.record(memory.dump());
        log.record(memory.dump());
        assert_eq!(log.len(), 2);

        log.clear();
        assert!(log.is_empty());
        assert!(!log.undo(&mut memory));
    }
}

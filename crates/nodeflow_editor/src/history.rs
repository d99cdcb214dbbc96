// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history built on copy-on-write graph snapshots.
//!
//! Snapshots share their node and connection collections with the live
//! graph until one side is modified, so recording a state is cheap.
//!
//! Every content state carries a revision number. The history keeps the
//! last recorded state as `present`; a live revision that differs from it
//! means there are unsaved changes, which undo reverts first.

use nodeflow_graph::Graph;
use std::collections::VecDeque;

/// Default maximum undo history depth
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Graph contents at one revision
#[derive(Debug, Clone)]
pub struct GraphSnapshot<D> {
    /// Nodes and connections
    pub graph: Graph<D>,
    /// Content revision the graph was at
    pub revision: u64,
}

impl<D> GraphSnapshot<D> {
    /// Create a snapshot
    pub fn new(graph: Graph<D>, revision: u64) -> Self {
        Self { graph, revision }
    }
}

/// History statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryStats {
    /// Snapshots in the past stack
    pub undo_count: usize,
    /// Snapshots in the future stack
    pub redo_count: usize,
    /// Maximum history depth
    pub max_depth: usize,
}

/// Undo/redo history manager for one module
#[derive(Debug, Clone)]
pub struct History<D> {
    /// Older states, oldest first
    past: VecDeque<GraphSnapshot<D>>,
    /// Last recorded state
    present: GraphSnapshot<D>,
    /// Undone states, next redo first
    future: VecDeque<GraphSnapshot<D>>,
    /// Maximum history depth
    max_depth: usize,
}

impl<D: Clone> History<D> {
    /// Create a history whose present is `initial`
    pub fn new(initial: GraphSnapshot<D>) -> Self {
        Self::with_max_depth(initial, DEFAULT_HISTORY_LIMIT)
    }

    /// Create with custom maximum depth
    pub fn with_max_depth(initial: GraphSnapshot<D>, max_depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: initial,
            future: VecDeque::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Last recorded state
    pub fn present(&self) -> &GraphSnapshot<D> {
        &self.present
    }

    /// Whether `live_revision` has changes not yet recorded
    pub fn is_dirty(&self, live_revision: u64) -> bool {
        live_revision != self.present.revision
    }

    /// Record the live state as the new present.
    ///
    /// Returns false (and changes nothing) when the live state is already
    /// the present.
    pub fn record(&mut self, live: GraphSnapshot<D>) -> bool {
        if !self.is_dirty(live.revision) {
            return false;
        }

        let previous = std::mem::replace(&mut self.present, live);
        self.past.push_back(previous);
        self.future.clear();
        self.enforce_limit();
        true
    }

    /// Step back, returning the state to restore.
    ///
    /// Unsaved live changes are reverted to the present first and kept
    /// as the next redo.
    pub fn undo(&mut self, live: GraphSnapshot<D>) -> Option<GraphSnapshot<D>> {
        if self.is_dirty(live.revision) {
            self.future.push_front(live);
            self.enforce_limit();
            return Some(self.present.clone());
        }

        let previous = self.past.pop_back()?;
        let undone = std::mem::replace(&mut self.present, previous);
        self.future.push_front(undone);
        Some(self.present.clone())
    }

    /// Step forward, returning the state to restore.
    ///
    /// Refused while the live state has unsaved changes, which would
    /// otherwise be discarded.
    pub fn redo(&mut self, live_revision: u64) -> Option<GraphSnapshot<D>> {
        if self.is_dirty(live_revision) {
            return None;
        }

        let next = self.future.pop_front()?;
        let previous = std::mem::replace(&mut self.present, next);
        self.past.push_back(previous);
        self.enforce_limit();
        Some(self.present.clone())
    }

    /// Check if undo is available
    pub fn can_undo(&self, live_revision: u64) -> bool {
        !self.past.is_empty() || self.is_dirty(live_revision)
    }

    /// Check if redo is available
    pub fn can_redo(&self, live_revision: u64) -> bool {
        !self.future.is_empty() && !self.is_dirty(live_revision)
    }

    /// Get history statistics
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.past.len(),
            redo_count: self.future.len(),
            max_depth: self.max_depth,
        }
    }

    fn enforce_limit(&mut self) {
        while self.past.len() > self.max_depth {
            self.past.pop_front();
        }
        while self.future.len() > self.max_depth {
            self.future.pop_back();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_graph::Node;
    use serde_json::Value;

    fn snapshot(names: &[&str], revision: u64) -> GraphSnapshot<Value> {
        let mut graph = Graph::new();
        for name in names {
            graph.add_node(Node::new(*name, "test").with_id(*name)).unwrap();
        }
        GraphSnapshot::new(graph, revision)
    }

    fn names(snapshot: &GraphSnapshot<Value>) -> Vec<String> {
        snapshot.graph.nodes().map(|n| n.name.clone()).collect()
    }

    #[test]
    fn test_record_is_noop_when_clean() {
        let mut history = History::new(snapshot(&[], 0));
        assert!(!history.record(snapshot(&[], 0)));
        assert!(!history.can_undo(0));
        assert!(history.record(snapshot(&["a"], 1)));
        assert!(history.can_undo(1));
        assert_eq!(history.stats().undo_count, 1);
    }

    #[test]
    fn test_undo_reverts_unsaved_changes_first() {
        let mut history = History::new(snapshot(&["a"], 1));
        let restored = history.undo(snapshot(&["a", "b"], 2)).unwrap();
        assert_eq!(names(&restored), vec!["a"]);
        assert!(history.undo(snapshot(&["a"], 1)).is_none());

        let redone = history.redo(1).unwrap();
        assert_eq!(names(&redone), vec!["a", "b"]);
        assert!(history.can_undo(2));
    }

    #[test]
    fn test_undo_redo_walks_recorded_states() {
        let mut history = History::new(snapshot(&[], 0));
        history.record(snapshot(&["a"], 1));
        history.record(snapshot(&["a", "b"], 2));

        assert_eq!(names(&history.undo(snapshot(&["a", "b"], 2)).unwrap()), vec!["a"]);
        assert!(history.can_redo(1));
        assert_eq!(names(&history.redo(1).unwrap()), vec!["a", "b"]);
        assert!(!history.can_redo(2));
    }

    #[test]
    fn test_redo_refused_while_dirty_and_record_clears_future() {
        let mut history = History::new(snapshot(&[], 0));
        history.record(snapshot(&["a"], 1));
        history.undo(snapshot(&["a"], 1));
        assert!(history.can_redo(0));
        assert!(!history.can_redo(5));
        assert!(history.redo(5).is_none());

        history.record(snapshot(&["c"], 5));
        assert!(!history.can_redo(5));
    }

    #[test]
    fn test_depth_is_capped() {
        let mut history = History::with_max_depth(snapshot(&[], 0), 3);
        for revision in 1..=10 {
            history.record(snapshot(&[], revision));
        }
        assert_eq!(history.stats().undo_count, 3);

        let mut steps = 0;
        let mut live = history.present().clone();
        while let Some(restored) = history.undo(live) {
            live = restored;
            steps += 1;
        }
        assert_eq!(steps, 3);
        assert_eq!(history.present().revision, 7);
    }
}

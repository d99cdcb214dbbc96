// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection sets for nodes and connections.

use indexmap::IndexSet;
use std::hash::Hash;
use std::sync::Arc;

/// Ordered set of selected ids.
///
/// The set is copy-on-write: [`Selection::handle`] returns the current
/// contents and stays unchanged when the selection is later modified.
#[derive(Debug, Clone)]
pub struct Selection<T> {
    ids: Arc<IndexSet<T>>,
}

impl<T: Clone + Eq + Hash> Selection<T> {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self {
            ids: Arc::new(IndexSet::new()),
        }
    }

    /// Check if an id is selected
    pub fn contains(&self, id: &T) -> bool {
        self.ids.contains(id)
    }

    /// Add an id to the selection (idempotent); returns true if newly added
    pub fn add(&mut self, id: T) -> bool {
        if self.contains(&id) {
            return false;
        }
        Arc::make_mut(&mut self.ids).insert(id)
    }

    /// Remove an id from the selection; returns true if it was selected
    pub fn remove(&mut self, id: &T) -> bool {
        if !self.contains(id) {
            return false;
        }
        Arc::make_mut(&mut self.ids).shift_remove(id)
    }

    /// Keep only ids matching the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        if self.ids.iter().all(&mut keep) {
            return;
        }
        Arc::make_mut(&mut self.ids).retain(keep);
    }

    /// Check if the selection is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Get the number of selected ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Iterate over selected ids in selection order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.ids.iter()
    }

    /// Shared handle to the current contents
    pub fn handle(&self) -> Arc<IndexSet<T>> {
        Arc::clone(&self.ids)
    }
}

impl<T: Clone + Eq + Hash> Default for Selection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove_is_idempotent() {
        let mut selection = Selection::new();
        assert!(selection.add(1));
        assert!(!selection.add(1));
        assert!(selection.add(2));
        assert!(selection.remove(&1));
        assert!(!selection.remove(&1));
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_handle_is_copy_on_write() {
        let mut selection = Selection::new();
        for id in [1, 2, 3] {
            selection.add(id);
        }
        let before = selection.handle();

        selection.retain(|id| *id != 2);
        assert_eq!(before.len(), 3);
        assert_eq!(selection.iter().copied().collect::<Vec<_>>(), vec![1, 3]);

        let unchanged = selection.handle();
        selection.retain(|_| true);
        assert!(Arc::ptr_eq(&unchanged, &selection.handle()));

        selection.retain(|_| false);
        assert!(selection.is_empty());
        assert_eq!(unchanged.len(), 2);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named modules (sub-graphs) of a workspace.

use crate::canvas::Viewport;
use crate::history::{GraphSnapshot, History};
use indexmap::IndexMap;
use nodeflow_graph::Graph;
use std::sync::Arc;

/// Stored state of one module
#[derive(Debug, Clone)]
pub struct ModuleSlot<D> {
    /// Nodes and connections
    pub graph: Graph<D>,
    /// Pan and zoom
    pub viewport: Viewport,
    /// Undo/redo history of this module only
    pub history: History<D>,
    /// Content revision of `graph`
    pub revision: u64,
}

impl<D: Clone> ModuleSlot<D> {
    /// Empty module whose history starts at `revision`
    pub fn new(revision: u64, history_limit: usize) -> Self {
        let graph = Graph::new();
        let history = History::with_max_depth(GraphSnapshot::new(graph.clone(), revision), history_limit);
        Self {
            graph,
            viewport: Viewport::default(),
            history,
            revision,
        }
    }
}

/// Node and connection counts of one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSummary {
    /// Module name
    pub name: String,
    /// Number of nodes
    pub nodes: usize,
    /// Number of connections
    pub connections: usize,
}

/// Ordered, copy-on-write collection of module slots.
///
/// The slot of the current module is only refreshed when the store
/// switches away from it or exports.
#[derive(Debug, Clone)]
pub struct ModuleSet<D> {
    slots: Arc<IndexMap<String, ModuleSlot<D>>>,
    current: String,
}

impl<D: Clone> ModuleSet<D> {
    /// Create a set holding `current` and no other module
    pub fn new(current: impl Into<String>, slot: ModuleSlot<D>) -> Self {
        let current = current.into();
        let mut slots = IndexMap::new();
        slots.insert(current.clone(), slot);
        Self {
            slots: Arc::new(slots),
            current,
        }
    }

    /// Name of the current module
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Module names in creation order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }

    /// Whether a module exists
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Stored state of a module
    pub fn get(&self, name: &str) -> Option<&ModuleSlot<D>> {
        self.slots.get(name)
    }

    /// Mutable stored state of a module
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ModuleSlot<D>> {
        if !self.contains(name) {
            return None;
        }
        Arc::make_mut(&mut self.slots).get_mut(name)
    }

    /// Iterate over `(name, slot)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleSlot<D>)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }

    /// Add a module; returns false if the name is taken
    pub fn insert(&mut self, name: impl Into<String>, slot: ModuleSlot<D>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        Arc::make_mut(&mut self.slots).insert(name, slot);
        true
    }

    /// Overwrite the stored state of an existing module
    pub fn store(&mut self, name: &str, slot: ModuleSlot<D>) {
        if let Some(existing) = self.get_mut(name) {
            *existing = slot;
        }
    }

    /// Remove a module other than the current one
    pub fn remove(&mut self, name: &str) -> Option<ModuleSlot<D>> {
        if name == self.current || !self.contains(name) {
            return None;
        }
        Arc::make_mut(&mut self.slots).shift_remove(name)
    }

    /// Make an existing module current; returns false if it does not exist
    pub fn set_current(&mut self, name: &str) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.current = name.to_string();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodeflow_graph::Node;
    use serde_json::Value;

    #[test]
    fn test_current_module_cannot_be_removed() {
        let mut modules: ModuleSet<Value> = ModuleSet::new("Home", ModuleSlot::new(0, 10));
        assert!(modules.insert("Other", ModuleSlot::new(1, 10)));
        assert!(!modules.insert("Other", ModuleSlot::new(2, 10)));

        assert!(modules.remove("Home").is_none());
        assert!(modules.remove("Missing").is_none());
        assert!(modules.remove("Other").is_some());
        assert_eq!(modules.names().collect::<Vec<_>>(), vec!["Home"]);
    }

    #[test]
    fn test_store_replaces_slot_copy_on_write() {
        let mut modules: ModuleSet<Value> = ModuleSet::new("Home", ModuleSlot::new(0, 10));
        modules.insert("Other", ModuleSlot::new(1, 10));
        let before = modules.clone();

        let mut slot = ModuleSlot::new(5, 10);
        slot.graph.add_node(Node::new("A", "a")).unwrap();
        modules.store("Other", slot);

        assert_eq!(before.get("Other").unwrap().graph.node_count(), 0);
        assert_eq!(modules.get("Other").unwrap().graph.node_count(), 1);
        assert!(modules.set_current("Other"));
        assert!(!modules.set_current("Nowhere"));
        assert_eq!(modules.current(), "Other");
    }
}

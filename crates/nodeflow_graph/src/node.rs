// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph framework.

use crate::geometry::Position;
use crate::id::NodeId;
use crate::port::{Port, PortDirection, PortMap};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Category reported for nodes that do not declare one
pub const DEFAULT_CATEGORY: &str = "default";

/// Bounds required of a node payload.
///
/// The payload is opaque to the graph: it is only cloned and serialized.
pub trait NodeData: Clone + fmt::Debug + Default + Serialize + DeserializeOwned {}

impl<T> NodeData for T where T: Clone + fmt::Debug + Default + Serialize + DeserializeOwned {}

fn default_visible() -> bool {
    true
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "D: Serialize", deserialize = "D: DeserializeOwned + Default"))]
pub struct Node<D = serde_json::Value> {
    /// Unique instance ID (a fresh one when missing from the input)
    #[serde(default)]
    pub id: NodeId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-form type tag
    #[serde(rename = "type", default)]
    pub node_type: String,
    /// Position in module-local world coordinates
    #[serde(default)]
    pub position: Position,
    /// Opaque payload
    #[serde(default)]
    pub data: D,
    /// Extra style class for renderers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    /// Grouping tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Input ports by id
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub inputs: PortMap,
    /// Output ports by id
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub outputs: PortMap,
    /// Mirrors membership in the store's node selection
    #[serde(default)]
    pub selected: bool,
    /// Locked nodes cannot be dragged
    #[serde(default)]
    pub locked: bool,
    /// Whether the node is rendered
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Stacking order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

impl<D: Default> Node<D> {
    /// Create a new node with a fresh id and default payload
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            node_type: node_type.into(),
            position: Position::default(),
            data: D::default(),
            class: None,
            category: None,
            inputs: PortMap::new(),
            outputs: PortMap::new(),
            selected: false,
            locked: false,
            visible: true,
            z_index: None,
        }
    }
}

impl<D> Node<D> {
    /// Set an explicit id
    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the position
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    /// Set the payload
    pub fn with_data(mut self, data: D) -> Self {
        self.data = data;
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add an input port, keyed by its id
    pub fn with_input(mut self, port: Port) -> Self {
        self.inputs.insert(port.id.clone(), port);
        self
    }

    /// Add an output port, keyed by its id
    pub fn with_output(mut self, port: Port) -> Self {
        self.outputs.insert(port.id.clone(), port);
        self
    }

    /// Effective category (`"default"` when unset)
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }

    /// Get an input port by id
    pub fn input(&self, port_id: &str) -> Option<&Port> {
        self.inputs.get(port_id)
    }

    /// Get an output port by id
    pub fn output(&self, port_id: &str) -> Option<&Port> {
        self.outputs.get(port_id)
    }

    /// Get a port by id on the given side
    pub fn port(&self, port_id: &str, direction: PortDirection) -> Option<&Port> {
        match direction {
            PortDirection::Input => self.input(port_id),
            PortDirection::Output => self.output(port_id),
        }
    }

    /// Get all ports
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.values().chain(self.outputs.values())
    }
}

/// Partial update for a node; `None` fields are left untouched.
///
/// Selection is owned by the store and cannot be patched.
#[derive(Debug, Clone, Default)]
pub struct NodePatch<D = serde_json::Value> {
    /// New display name
    pub name: Option<String>,
    /// New type tag
    pub node_type: Option<String>,
    /// New position
    pub position: Option<Position>,
    /// New payload
    pub data: Option<D>,
    /// New style class
    pub class: Option<String>,
    /// New category
    pub category: Option<String>,
    /// Replacement input ports
    pub inputs: Option<PortMap>,
    /// Replacement output ports
    pub outputs: Option<PortMap>,
    /// New lock flag
    pub locked: Option<bool>,
    /// New visibility flag
    pub visible: Option<bool>,
    /// New stacking order
    pub z_index: Option<i32>,
}

impl<D> NodePatch<D> {
    /// Patch that only moves the node
    pub fn position(position: Position) -> Self {
        Self {
            name: None,
            node_type: None,
            position: Some(position),
            data: None,
            class: None,
            category: None,
            inputs: None,
            outputs: None,
            locked: None,
            visible: None,
            z_index: None,
        }
    }

    /// Merge the present fields into `node`
    pub fn apply(self, node: &mut Node<D>) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(node_type) = self.node_type {
            node.node_type = node_type;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(data) = self.data {
            node.data = data;
        }
        if let Some(class) = self.class {
            node.class = Some(class);
        }
        if let Some(category) = self.category {
            node.category = Some(category);
        }
        if let Some(inputs) = self.inputs {
            node.inputs = inputs;
        }
        if let Some(outputs) = self.outputs {
            node.outputs = outputs;
        }
        if let Some(locked) = self.locked {
            node.locked = locked;
        }
        if let Some(visible) = self.visible {
            node.visible = visible;
        }
        if let Some(z_index) = self.z_index {
            node.z_index = Some(z_index);
        }
    }
}

/// Palette entry describing how to instantiate a node type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "D: Serialize", deserialize = "D: DeserializeOwned + Default"))]
pub struct NodeTemplate<D = serde_json::Value> {
    /// Display name given to new nodes
    pub name: String,
    /// Type tag, also the registry key
    #[serde(rename = "type")]
    pub node_type: String,
    /// Category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Icon hint for palettes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payload given to new nodes
    #[serde(default)]
    pub default_data: D,
    /// Input ports given to new nodes
    #[serde(default)]
    pub default_inputs: PortMap,
    /// Output ports given to new nodes
    #[serde(default)]
    pub default_outputs: PortMap,
}

impl<D: Default> NodeTemplate<D> {
    /// Create a template with no ports
    pub fn new(name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: node_type.into(),
            category: None,
            icon: None,
            description: None,
            default_data: D::default(),
            default_inputs: PortMap::new(),
            default_outputs: PortMap::new(),
        }
    }
}

impl<D> NodeTemplate<D> {
    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Add a default input port
    pub fn with_input(mut self, port: Port) -> Self {
        self.default_inputs.insert(port.id.clone(), port);
        self
    }

    /// Add a default output port
    pub fn with_output(mut self, port: Port) -> Self {
        self.default_outputs.insert(port.id.clone(), port);
        self
    }

    /// Effective category (`"default"` when unset)
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

impl<D: Clone> NodeTemplate<D> {
    /// Instantiate a node with a fresh id at `position`
    pub fn instantiate(&self, position: Position) -> Node<D> {
        Node {
            id: NodeId::new(),
            name: self.name.clone(),
            node_type: self.node_type.clone(),
            position,
            data: self.default_data.clone(),
            class: None,
            category: self.category.clone(),
            inputs: self.default_inputs.clone(),
            outputs: self.default_outputs.clone(),
            selected: false,
            locked: false,
            visible: true,
            z_index: None,
        }
    }
}

/// Registry of available node templates
#[derive(Debug, Clone)]
pub struct NodeRegistry<D = serde_json::Value> {
    /// Registered templates by type tag
    templates: IndexMap<String, NodeTemplate<D>>,
}

impl<D> NodeRegistry<D> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            templates: IndexMap::new(),
        }
    }

    /// Register a template, replacing any previous one with the same type
    pub fn register(&mut self, template: NodeTemplate<D>) {
        self.templates.insert(template.node_type.clone(), template);
    }

    /// Get a template by type tag
    pub fn get(&self, node_type: &str) -> Option<&NodeTemplate<D>> {
        self.templates.get(node_type)
    }

    /// Get all registered templates
    pub fn templates(&self) -> impl Iterator<Item = &NodeTemplate<D>> {
        self.templates.values()
    }

    /// Get templates by category
    pub fn templates_in_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a NodeTemplate<D>> + 'a {
        self.templates.values().filter(move |t| t.category() == category)
    }

    /// Number of registered templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl<D: Clone> NodeRegistry<D> {
    /// Create a node from a type tag
    pub fn create_node(&self, node_type: &str, position: Position) -> Option<Node<D>> {
        self.get(node_type).map(|t| t.instantiate(position))
    }
}

impl<D> Default for NodeRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sorted list of the distinct effective categories
pub fn node_categories<'a, D: 'a>(nodes: impl IntoIterator<Item = &'a Node<D>>) -> Vec<String> {
    let mut categories: Vec<String> = nodes.into_iter().map(|n| n.category().to_string()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Nodes whose effective category matches
pub fn filter_nodes_by_category<'a, D: 'a>(
    nodes: impl IntoIterator<Item = &'a Node<D>>,
    category: &str,
) -> Vec<&'a Node<D>> {
    nodes.into_iter().filter(|n| n.category() == category).collect()
}

/// Nodes grouped by effective category
pub fn group_nodes_by_category<'a, D: 'a>(
    nodes: impl IntoIterator<Item = &'a Node<D>>,
) -> BTreeMap<String, Vec<&'a Node<D>>> {
    let mut grouped: BTreeMap<String, Vec<&'a Node<D>>> = BTreeMap::new();
    for node in nodes {
        grouped.entry(node.category().to_string()).or_default().push(node);
    }
    grouped
}

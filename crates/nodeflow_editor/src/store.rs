// SPDX-License-Identifier: MIT OR Apache-2.0
//! The graph store.
//!
//! [`GraphStore`] owns the authoritative editor state: the live graph of the
//! current module, selection, the in-flight connection drag, canvas
//! settings, per-module undo history and the stored state of every other
//! module. All mutations go through it.
//!
//! Operations never panic or return errors for bad input. Missing ids are
//! ignored (logged at debug level), constraint violations such as duplicate
//! ids or self-connections are logged as warnings and leave the state
//! untouched. Only import/export, file and config surfaces return `Result`.

use crate::canvas::{CanvasState, EditorMode, GridPatch, Theme, Viewport, ViewportPatch};
use crate::config::EditorConfig;
use crate::events::{EventQueue, StoreEvent};
use crate::history::{GraphSnapshot, History, HistoryStats};
use crate::modules::{ModuleSet, ModuleSlot, ModuleSummary};
use crate::selection::Selection;
use indexmap::IndexSet;
use nodeflow_graph::geometry::{self, DEFAULT_CURVATURE};
use nodeflow_graph::graph::{ConnectionMap, NodeMap};
use nodeflow_graph::{
    Connection, ConnectionId, ConnectionPatch, ConnectionType, Graph, LayoutDirection, Node, NodeData,
    NodeDimensions, NodeId, NodePatch, NodeRegistry, PortDirection, Position, Rect,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Module created when the configuration lists none
pub const DEFAULT_MODULE: &str = "Home";

/// Store handle shared with presentation code
pub type SharedGraphStore<D = serde_json::Value> = Arc<RwLock<GraphStore<D>>>;

/// An output port being dragged towards an input
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectingState {
    /// Node the drag started from
    pub source: NodeId,
    /// Output port the drag started from
    pub source_output: String,
    /// Last pointer position in world coordinates
    pub pointer: Option<Position>,
}

/// Authoritative editor state
#[derive(Debug)]
pub struct GraphStore<D = serde_json::Value> {
    /// Live graph of the current module
    pub(crate) graph: Graph<D>,
    /// Content revision of `graph`
    pub(crate) revision: u64,
    next_revision: u64,
    /// History of the current module
    pub(crate) history: History<D>,
    pub(crate) modules: ModuleSet<D>,
    selected_nodes: Selection<NodeId>,
    selected_connections: Selection<ConnectionId>,
    connecting: Option<ConnectingState>,
    pub(crate) canvas: CanvasState,
    theme: Theme,
    history_limit: usize,
    paste_offset: Position,
    events: EventQueue,
}

impl<D: NodeData> GraphStore<D> {
    /// Create a store with the default configuration
    pub fn new() -> Self {
        Self::with_config(&EditorConfig::default())
    }

    /// Create a store from a configuration.
    ///
    /// Empty or repeated module names are skipped; an unknown initial
    /// module falls back to the first listed one. Unusable zoom limits
    /// fall back to the defaults.
    pub fn with_config(config: &EditorConfig) -> Self {
        let history_limit = config.history_limit.max(1);

        let mut names: Vec<&str> = Vec::new();
        for name in &config.modules {
            if !name.trim().is_empty() && !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        if names.is_empty() {
            names.push(DEFAULT_MODULE);
        }
        let current = if names.contains(&config.initial_module.as_str()) {
            config.initial_module.as_str()
        } else {
            names[0]
        };

        let mut modules = ModuleSet::new(names[0], ModuleSlot::new(0, history_limit));
        let mut next_revision = 1;
        for name in &names[1..] {
            modules.insert(*name, ModuleSlot::new(next_revision, history_limit));
            next_revision += 1;
        }
        modules.set_current(current);

        let slot = modules
            .get(current)
            .cloned()
            .unwrap_or_else(|| ModuleSlot::new(0, history_limit));

        let canvas = CanvasState {
            viewport: slot.viewport,
            grid: config.canvas.grid.clone(),
            mode: config.canvas.mode,
            direction: config.canvas.direction,
            zoom_limits: config.canvas.zoom.sanitized(),
        };

        Self {
            graph: slot.graph,
            revision: slot.revision,
            next_revision,
            history: slot.history,
            modules,
            selected_nodes: Selection::new(),
            selected_connections: Selection::new(),
            connecting: None,
            canvas,
            theme: config.theme,
            history_limit,
            paste_offset: config.paste_offset,
            events: EventQueue::new(),
        }
    }

    /// Wrap the store for sharing
    pub fn into_shared(self) -> SharedGraphStore<D> {
        Arc::new(RwLock::new(self))
    }

    pub(crate) fn allocate_revision(&mut self) -> u64 {
        let revision = self.next_revision;
        self.next_revision += 1;
        revision
    }

    /// Mark the live graph as changed
    pub(crate) fn touch(&mut self) {
        self.revision = self.allocate_revision();
    }

    pub(crate) fn emit(&mut self, event: StoreEvent) {
        self.events.push(event);
    }

    fn snapshot(&self) -> GraphSnapshot<D> {
        GraphSnapshot::new(self.graph.clone(), self.revision)
    }

    /// Take all pending change notifications
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        self.events.drain()
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Add a node; rejected (returns `None`) if its id is taken
    pub fn add_node(&mut self, mut node: Node<D>) -> Option<NodeId> {
        node.selected = false;
        match self.graph.add_node(node) {
            Ok(id) => {
                self.touch();
                debug!(node = %id, "Added node");
                self.emit(StoreEvent::NodeCreated(id.clone()));
                Some(id)
            }
            Err(err) => {
                warn!("Rejected node: {err}");
                None
            }
        }
    }

    /// Instantiate a registered template at `position`
    pub fn add_node_from_template(
        &mut self,
        registry: &NodeRegistry<D>,
        node_type: &str,
        position: Position,
    ) -> Option<NodeId> {
        let Some(node) = registry.create_node(node_type, position) else {
            warn!("Unknown node type \"{node_type}\"");
            return None;
        };
        self.add_node(node)
    }

    /// Remove a node together with every connection touching it
    pub fn remove_node(&mut self, id: &NodeId) {
        let Some((_, removed)) = self.graph.remove_node(id) else {
            debug!(node = %id, "remove_node: no such node");
            return;
        };
        self.touch();

        for connection in removed {
            if self.selected_connections.remove(&connection.id) {
                self.emit(StoreEvent::ConnectionDeselected(connection.id.clone()));
            }
            self.emit(StoreEvent::ConnectionRemoved(connection.id));
        }
        if self.selected_nodes.remove(id) {
            self.emit(StoreEvent::NodeDeselected(id.clone()));
        }
        if self.connecting.as_ref().is_some_and(|c| &c.source == id) {
            self.connecting = None;
        }
        debug!(node = %id, "Removed node");
        self.emit(StoreEvent::NodeRemoved(id.clone()));
    }

    /// Merge the present fields of `patch` into a node
    pub fn update_node(&mut self, id: &NodeId, patch: NodePatch<D>) {
        let Some(node) = self.graph.node_mut(id) else {
            debug!(node = %id, "update_node: no such node");
            return;
        };
        patch.apply(node);
        self.touch();
        self.emit(StoreEvent::NodeUpdated(id.clone()));
    }

    /// Move a node without taking a history snapshot
    pub fn move_node(&mut self, id: &NodeId, position: Position) {
        let Some(node) = self.graph.node_mut(id) else {
            debug!(node = %id, "move_node: no such node");
            return;
        };
        if node.position == position {
            return;
        }
        node.position = position;
        self.touch();
        self.emit(StoreEvent::NodeMoved {
            id: id.clone(),
            position,
        });
    }

    /// Duplicate a node under a fresh id, shifted by `offset`
    pub fn clone_node(&mut self, id: &NodeId, offset: Position) -> Option<NodeId> {
        let Some(source) = self.graph.node(id) else {
            debug!(node = %id, "clone_node: no such node");
            return None;
        };
        let mut node = source.clone();
        node.id = NodeId::new();
        node.position = node.position + offset;
        self.add_node(node)
    }

    /// Duplicate several nodes; missing ids are skipped
    pub fn clone_nodes(&mut self, ids: &[NodeId], offset: Position) -> Vec<NodeId> {
        ids.iter().filter_map(|id| self.clone_node(id, offset)).collect()
    }

    /// Serialize the given nodes (ids included) as a JSON array
    pub fn copy_nodes(&self, ids: &[NodeId]) -> String {
        let nodes: Vec<&Node<D>> = ids.iter().filter_map(|id| self.graph.node(id)).collect();
        match serde_json::to_string(&nodes) {
            Ok(json) => json,
            Err(err) => {
                warn!("Failed to copy nodes: {err}");
                "[]".to_string()
            }
        }
    }

    /// Add the nodes of a [`copy_nodes`](Self::copy_nodes) payload under
    /// fresh ids, shifted by `offset`. A malformed payload adds nothing.
    pub fn paste_nodes(&mut self, json: &str, offset: Position) -> Vec<NodeId> {
        let nodes: Vec<Node<D>> = match serde_json::from_str(json) {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!("Failed to paste nodes: {err}");
                return Vec::new();
            }
        };

        nodes
            .into_iter()
            .filter_map(|mut node| {
                node.id = NodeId::new();
                node.position = node.position + offset;
                self.add_node(node)
            })
            .collect()
    }

    /// Set the category of several nodes
    pub fn set_nodes_category(&mut self, ids: &[NodeId], category: &str) {
        let mut updated = Vec::new();
        for id in ids {
            if let Some(node) = self.graph.node_mut(id) {
                node.category = Some(category.to_string());
                updated.push(id.clone());
            }
        }
        if updated.is_empty() {
            return;
        }
        self.touch();
        for id in updated {
            self.emit(StoreEvent::NodeUpdated(id));
        }
    }

    /// Snapshot history, then remove every selected node and connection
    pub fn delete_selected(&mut self) {
        if !self.has_selection() {
            return;
        }
        self.save_to_history();

        let connections: Vec<ConnectionId> = self.selected_connections.iter().cloned().collect();
        for id in &connections {
            self.remove_connection(id);
        }
        let nodes: Vec<NodeId> = self.selected_nodes.iter().cloned().collect();
        for id in &nodes {
            self.remove_node(id);
        }
    }

    /// Get a node by id
    pub fn node(&self, id: &NodeId) -> Option<&Node<D>> {
        self.graph.node(id)
    }

    /// Nodes of the current module in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node<D>> {
        self.graph.nodes()
    }

    /// Node ids of the current module in insertion order
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph.node_ids().cloned().collect()
    }

    /// Number of nodes in the current module
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Connections touching a node
    pub fn node_connections(&self, id: &NodeId) -> Vec<&Connection> {
        self.graph.connections_for_node(id).collect()
    }

    /// Shared handle to the node collection, for change detection
    pub fn nodes_handle(&self) -> Arc<NodeMap<D>> {
        self.graph.nodes_handle()
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Begin dragging a connection out of `output`
    pub fn start_connection(&mut self, source: &NodeId, output: &str, pointer: Option<Position>) {
        if !self.graph.contains_node(source) {
            debug!(node = %source, "start_connection: no such node");
            return;
        }
        self.connecting = Some(ConnectingState {
            source: source.clone(),
            source_output: output.to_string(),
            pointer,
        });
        self.emit(StoreEvent::ConnectionStarted {
            node: source.clone(),
            output: output.to_string(),
        });
    }

    /// Track the pointer of an in-flight connection
    pub fn update_connection_mouse(&mut self, pointer: Position) {
        if let Some(connecting) = self.connecting.as_mut() {
            connecting.pointer = Some(pointer);
        }
    }

    /// Finish the in-flight connection on `input`.
    ///
    /// The connecting state is cleared whether or not a connection is made.
    pub fn complete_connection(&mut self, target: &NodeId, input: &str) -> Option<ConnectionId> {
        let Some(connecting) = self.connecting.take() else {
            debug!("complete_connection: no connection in progress");
            return None;
        };

        let connection = Connection::new(connecting.source, connecting.source_output, target.clone(), input)
            .with_type(ConnectionType::Bezier)
            .with_curvature(DEFAULT_CURVATURE);
        self.add_connection(connection)
    }

    /// Abandon the in-flight connection
    pub fn cancel_connection(&mut self) {
        self.connecting = None;
    }

    /// Add a connection between two nodes of the current module
    pub fn add_connection(&mut self, mut connection: Connection) -> Option<ConnectionId> {
        connection.selected = false;
        match self.graph.add_connection(connection) {
            Ok(id) => {
                self.touch();
                debug!(connection = %id, "Added connection");
                self.emit(StoreEvent::ConnectionCreated(id.clone()));
                Some(id)
            }
            Err(err) => {
                warn!("Rejected connection: {err}");
                None
            }
        }
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, id: &ConnectionId) {
        if self.graph.remove_connection(id).is_none() {
            debug!(connection = %id, "remove_connection: no such connection");
            return;
        }
        self.touch();
        if self.selected_connections.remove(id) {
            self.emit(StoreEvent::ConnectionDeselected(id.clone()));
        }
        self.emit(StoreEvent::ConnectionRemoved(id.clone()));
    }

    /// Merge the present fields of `patch` into a connection
    pub fn update_connection(&mut self, id: &ConnectionId, patch: ConnectionPatch) {
        let Some(connection) = self.graph.connection_mut(id) else {
            debug!(connection = %id, "update_connection: no such connection");
            return;
        };
        patch.apply(connection);
        self.touch();
        self.emit(StoreEvent::ConnectionUpdated(id.clone()));
    }

    /// Insert a reroute point at `index` (clamped); returns its id
    pub fn add_reroute_point(&mut self, id: &ConnectionId, index: usize, position: Position) -> Option<String> {
        let Some(connection) = self.graph.connection_mut(id) else {
            debug!(connection = %id, "add_reroute_point: no such connection");
            return None;
        };
        let point_id = connection.insert_reroute_point(index, position);
        self.touch();
        self.emit(StoreEvent::ConnectionUpdated(id.clone()));
        Some(point_id)
    }

    /// Move a reroute point of a connection
    pub fn move_reroute_point(&mut self, id: &ConnectionId, point_id: &str, position: Position) {
        let moved = self
            .graph
            .connection(id)
            .is_some_and(|c| c.reroute_points.iter().any(|p| p.id == point_id));
        if !moved {
            debug!(connection = %id, "move_reroute_point: no such point");
            return;
        }
        if let Some(connection) = self.graph.connection_mut(id) {
            connection.move_reroute_point(point_id, position);
        }
        self.touch();
        self.emit(StoreEvent::ConnectionUpdated(id.clone()));
    }

    /// Remove a reroute point of a connection
    pub fn remove_reroute_point(&mut self, id: &ConnectionId, point_id: &str) {
        let exists = self
            .graph
            .connection(id)
            .is_some_and(|c| c.reroute_points.iter().any(|p| p.id == point_id));
        if !exists {
            debug!(connection = %id, "remove_reroute_point: no such point");
            return;
        }
        if let Some(connection) = self.graph.connection_mut(id) {
            connection.remove_reroute_point(point_id);
        }
        self.touch();
        self.emit(StoreEvent::ConnectionUpdated(id.clone()));
    }

    /// Get a connection by id
    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.graph.connection(id)
    }

    /// Connections of the current module in insertion order
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.graph.connections()
    }

    /// Number of connections in the current module
    pub fn connection_count(&self) -> usize {
        self.graph.connection_count()
    }

    /// Shared handle to the connection collection, for change detection
    pub fn connections_handle(&self) -> Arc<ConnectionMap> {
        self.graph.connections_handle()
    }

    /// The in-flight connection, if any
    pub fn connecting(&self) -> Option<&ConnectingState> {
        self.connecting.as_ref()
    }

    /// SVG path of a connection.
    ///
    /// `dims` supplies measured node sizes; `None` means the default box.
    pub fn connection_path(
        &self,
        id: &ConnectionId,
        dims: impl Fn(&NodeId) -> Option<NodeDimensions>,
    ) -> Option<String> {
        let connection = self.graph.connection(id)?;
        let source = self.graph.node(&connection.source)?;
        let target = self.graph.node(&connection.target)?;
        let direction = self.canvas.direction;

        let start = geometry::port_position_absolute(
            source,
            &connection.source_output,
            PortDirection::Output,
            direction,
            dims(&source.id),
        );
        let end = geometry::port_position_absolute(
            target,
            &connection.target_input,
            PortDirection::Input,
            direction,
            dims(&target.id),
        );
        Some(geometry::calculate_bezier_path(
            start,
            end,
            connection.effective_curvature(),
            &connection.reroute_points,
            direction,
        ))
    }

    /// SVG path from the dragged output port to the pointer
    pub fn connecting_path(&self, dims: impl Fn(&NodeId) -> Option<NodeDimensions>) -> Option<String> {
        let connecting = self.connecting.as_ref()?;
        let pointer = connecting.pointer?;
        let source = self.graph.node(&connecting.source)?;
        let direction = self.canvas.direction;

        let start = geometry::port_position_absolute(
            source,
            &connecting.source_output,
            PortDirection::Output,
            direction,
            dims(&source.id),
        );
        Some(geometry::calculate_bezier_path(start, pointer, DEFAULT_CURVATURE, &[], direction))
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    fn set_node_flag(&mut self, id: &NodeId, selected: bool) {
        if self.graph.node(id).is_some_and(|n| n.selected != selected) {
            if let Some(node) = self.graph.node_mut(id) {
                node.selected = selected;
            }
        }
    }

    fn set_connection_flag(&mut self, id: &ConnectionId, selected: bool) {
        if self.graph.connection(id).is_some_and(|c| c.selected != selected) {
            if let Some(connection) = self.graph.connection_mut(id) {
                connection.selected = selected;
            }
        }
    }

    fn deselect_nodes_except(&mut self, keep: Option<&NodeId>) {
        let dropped: Vec<NodeId> = self
            .selected_nodes
            .iter()
            .filter(|id| Some(*id) != keep)
            .cloned()
            .collect();
        for id in dropped {
            self.selected_nodes.remove(&id);
            self.set_node_flag(&id, false);
            self.emit(StoreEvent::NodeDeselected(id));
        }
    }

    fn deselect_connections_except(&mut self, keep: Option<&ConnectionId>) {
        let dropped: Vec<ConnectionId> = self
            .selected_connections
            .iter()
            .filter(|id| Some(*id) != keep)
            .cloned()
            .collect();
        for id in dropped {
            self.selected_connections.remove(&id);
            self.set_connection_flag(&id, false);
            self.emit(StoreEvent::ConnectionDeselected(id));
        }
    }

    /// Select a node, replacing the node selection unless `add` is set.
    ///
    /// Always clears the connection selection.
    pub fn select_node(&mut self, id: &NodeId, add: bool) {
        if !self.graph.contains_node(id) {
            debug!(node = %id, "select_node: no such node");
            return;
        }
        self.deselect_connections_except(None);
        if !add {
            self.deselect_nodes_except(Some(id));
        }
        if self.selected_nodes.add(id.clone()) {
            self.set_node_flag(id, true);
            self.emit(StoreEvent::NodeSelected(id.clone()));
        }
    }

    /// Replace the node selection with the existing ids among `ids`
    pub fn select_nodes(&mut self, ids: &[NodeId]) {
        let wanted: IndexSet<NodeId> = ids
            .iter()
            .filter(|id| self.graph.contains_node(id))
            .cloned()
            .collect();

        self.deselect_connections_except(None);
        let dropped: Vec<NodeId> = self
            .selected_nodes
            .iter()
            .filter(|id| !wanted.contains(*id))
            .cloned()
            .collect();
        for id in dropped {
            self.deselect_node(&id);
        }
        for id in wanted {
            if self.selected_nodes.add(id.clone()) {
                self.set_node_flag(&id, true);
                self.emit(StoreEvent::NodeSelected(id));
            }
        }
    }

    /// Remove a node from the selection
    pub fn deselect_node(&mut self, id: &NodeId) {
        if self.selected_nodes.remove(id) {
            self.set_node_flag(id, false);
            self.emit(StoreEvent::NodeDeselected(id.clone()));
        }
    }

    /// Select a single connection, clearing every other selection
    pub fn select_connection(&mut self, id: &ConnectionId) {
        if !self.graph.contains_connection(id) {
            debug!(connection = %id, "select_connection: no such connection");
            return;
        }
        self.deselect_nodes_except(None);
        self.deselect_connections_except(Some(id));
        if self.selected_connections.add(id.clone()) {
            self.set_connection_flag(id, true);
            self.emit(StoreEvent::ConnectionSelected(id.clone()));
        }
    }

    /// Remove a connection from the selection
    pub fn deselect_connection(&mut self, id: &ConnectionId) {
        if self.selected_connections.remove(id) {
            self.set_connection_flag(id, false);
            self.emit(StoreEvent::ConnectionDeselected(id.clone()));
        }
    }

    /// Clear node and connection selection
    pub fn clear_selection(&mut self) {
        self.deselect_nodes_except(None);
        self.deselect_connections_except(None);
    }

    /// Selected node ids in selection order
    pub fn selected_nodes(&self) -> Arc<IndexSet<NodeId>> {
        self.selected_nodes.handle()
    }

    /// Selected connection ids in selection order
    pub fn selected_connections(&self) -> Arc<IndexSet<ConnectionId>> {
        self.selected_connections.handle()
    }

    /// Whether anything is selected
    pub fn has_selection(&self) -> bool {
        !self.selected_nodes.is_empty() || !self.selected_connections.is_empty()
    }

    /// Visible nodes whose box intersects `rect` (world coordinates)
    pub fn nodes_in_rect(&self, rect: Rect, dims: impl Fn(&NodeId) -> Option<NodeDimensions>) -> Vec<NodeId> {
        self.graph
            .nodes()
            .filter(|node| node.visible && geometry::node_rect(node, dims(&node.id)).intersects(&rect))
            .map(|node| node.id.clone())
            .collect()
    }

    /// Drop selected ids that no longer exist and re-align the entity flags
    fn reconcile_selection(&mut self) {
        let graph = &self.graph;
        self.selected_nodes.retain(|id| graph.contains_node(id));
        self.selected_connections.retain(|id| graph.contains_connection(id));

        let nodes = &self.selected_nodes;
        if self.graph.nodes().any(|n| n.selected != nodes.contains(&n.id)) {
            self.graph.for_each_node_mut(|n| n.selected = nodes.contains(&n.id));
        }
        let connections = &self.selected_connections;
        if self.graph.connections().any(|c| c.selected != connections.contains(&c.id)) {
            self.graph
                .for_each_connection_mut(|c| c.selected = connections.contains(&c.id));
        }

        if let Some(connecting) = &self.connecting {
            if !self.graph.contains_node(&connecting.source) {
                self.connecting = None;
            }
        }
    }

    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------

    /// Names of all modules in creation order
    pub fn modules(&self) -> Vec<String> {
        self.modules.names().map(str::to_string).collect()
    }

    /// Name of the current module
    pub fn current_module(&self) -> &str {
        self.modules.current()
    }

    /// Counts per module, using the live graph for the current one
    pub fn module_summaries(&self) -> Vec<ModuleSummary> {
        let current = self.modules.current();
        self.modules
            .iter()
            .map(|(name, slot)| {
                let graph = if name == current { &self.graph } else { &slot.graph };
                ModuleSummary {
                    name: name.to_string(),
                    nodes: graph.node_count(),
                    connections: graph.connection_count(),
                }
            })
            .collect()
    }

    /// Write the live state of the current module back into its slot
    pub(crate) fn persist_current_module(&mut self) {
        let slot = ModuleSlot {
            graph: self.graph.clone(),
            viewport: self.canvas.viewport,
            history: self.history.clone(),
            revision: self.revision,
        };
        let current = self.modules.current().to_string();
        self.modules.store(&current, slot);
    }

    /// Switch to another module.
    ///
    /// The outgoing module keeps its graph, viewport and history; selection
    /// and any in-flight connection are dropped. Unknown names are rejected.
    pub fn change_module(&mut self, name: &str) -> bool {
        if !self.modules.contains(name) {
            warn!("Cannot switch to unknown module \"{name}\"");
            return false;
        }
        self.clear_selection();
        self.connecting = None;
        if name == self.modules.current() {
            debug!("Module \"{name}\" is already current");
            return true;
        }

        self.persist_current_module();

        let Some(slot) = self.modules.get(name).cloned() else {
            return false;
        };
        self.modules.set_current(name);
        self.graph = slot.graph;
        self.revision = slot.revision;
        self.history = slot.history;
        self.reconcile_selection();
        self.set_viewport(slot.viewport.into());

        info!("Switched to module \"{name}\"");
        self.emit(StoreEvent::ModuleChanged(name.to_string()));
        true
    }

    /// Create an empty module
    pub fn add_module(&mut self, name: &str) -> bool {
        if name.trim().is_empty() {
            warn!("Module names must not be empty");
            return false;
        }
        if self.modules.contains(name) {
            warn!("Module \"{name}\" already exists");
            return false;
        }
        let revision = self.allocate_revision();
        self.modules.insert(name, ModuleSlot::new(revision, self.history_limit));
        info!("Created module \"{name}\"");
        self.emit(StoreEvent::ModuleCreated(name.to_string()));
        true
    }

    /// Delete a module other than the current one
    pub fn remove_module(&mut self, name: &str) -> bool {
        if name == self.modules.current() {
            warn!("Cannot remove the current module \"{name}\"");
            return false;
        }
        if self.modules.remove(name).is_none() {
            debug!("remove_module: no module \"{name}\"");
            return false;
        }
        info!("Removed module \"{name}\"");
        self.emit(StoreEvent::ModuleRemoved(name.to_string()));
        true
    }

    // ------------------------------------------------------------------
    // Canvas
    // ------------------------------------------------------------------

    /// Live canvas settings
    pub fn canvas(&self) -> &CanvasState {
        &self.canvas
    }

    /// Viewport of the current module
    pub fn viewport(&self) -> Viewport {
        self.canvas.viewport
    }

    /// Merge a viewport patch (zoom is clamped)
    pub fn set_viewport(&mut self, patch: ViewportPatch) {
        let before = self.canvas.viewport;
        self.canvas.apply_viewport(patch);
        let after = self.canvas.viewport;

        if before.x != after.x || before.y != after.y {
            self.emit(StoreEvent::CanvasPanned(after.offset()));
        }
        if before.zoom != after.zoom {
            self.emit(StoreEvent::ZoomChanged(after.zoom));
        }
    }

    /// Pan by a screen-space delta
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let viewport = self.canvas.viewport;
        self.pan_to(viewport.x + dx, viewport.y + dy);
    }

    /// Pan to an absolute screen offset
    pub fn pan_to(&mut self, x: f64, y: f64) {
        self.set_viewport(ViewportPatch {
            x: Some(x),
            y: Some(y),
            zoom: None,
        });
    }

    /// Set the zoom factor; returns the clamped value
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        self.set_viewport(ViewportPatch {
            zoom: Some(zoom),
            ..Default::default()
        });
        self.canvas.viewport.zoom
    }

    /// Zoom in by `step`, or the configured step
    pub fn zoom_in(&mut self, step: Option<f64>) -> f64 {
        let step = step.unwrap_or(self.canvas.zoom_limits.step);
        self.set_zoom(self.canvas.viewport.zoom + step)
    }

    /// Zoom out by `step`, or the configured step
    pub fn zoom_out(&mut self, step: Option<f64>) -> f64 {
        let step = step.unwrap_or(self.canvas.zoom_limits.step);
        self.set_zoom(self.canvas.viewport.zoom - step)
    }

    /// Back to 100%
    pub fn zoom_reset(&mut self) -> f64 {
        self.set_zoom(1.0)
    }

    /// Merge a grid patch
    pub fn set_grid(&mut self, patch: GridPatch) {
        patch.apply(&mut self.canvas.grid);
    }

    /// Show or hide the grid
    pub fn toggle_grid(&mut self) {
        self.canvas.grid.visible = !self.canvas.grid.visible;
    }

    /// Enable or disable snapping
    pub fn toggle_snap(&mut self) {
        self.canvas.grid.snap = !self.canvas.grid.snap;
    }

    /// Set the editor mode
    pub fn set_mode(&mut self, mode: EditorMode) {
        self.canvas.mode = mode;
    }

    /// Switch between edit and fixed mode
    pub fn toggle_lock(&mut self) {
        let mode = if self.canvas.mode == EditorMode::Edit {
            EditorMode::Fixed
        } else {
            EditorMode::Edit
        };
        self.set_mode(mode);
    }

    /// Whether the canvas is in fixed mode
    pub fn is_locked(&self) -> bool {
        self.canvas.is_locked()
    }

    /// Set the layout direction
    pub fn set_direction(&mut self, direction: LayoutDirection) {
        self.canvas.direction = direction;
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    /// Current theme
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Set the theme
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Switch between light and dark; returns the new theme
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Offset used for paste and clone by default
    pub fn paste_offset(&self) -> Position {
        self.paste_offset
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Record the live graph as the new history state.
    ///
    /// Does nothing if the graph has not changed since the last record.
    pub fn save_to_history(&mut self) {
        if self.history.record(self.snapshot()) {
            debug!(revision = self.revision, "Saved history state");
            self.emit(StoreEvent::HistoryChanged);
        }
    }

    fn restore(&mut self, snapshot: GraphSnapshot<D>) {
        self.graph = snapshot.graph;
        self.revision = snapshot.revision;
        self.reconcile_selection();
        self.emit(StoreEvent::HistoryChanged);
    }

    /// Step back; returns false if there is nothing to undo
    pub fn undo(&mut self) -> bool {
        match self.history.undo(self.snapshot()) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => {
                debug!("undo: nothing to undo");
                false
            }
        }
    }

    /// Step forward; returns false if there is nothing to redo
    pub fn redo(&mut self) -> bool {
        match self.history.redo(self.revision) {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => {
                debug!("redo: nothing to redo");
                false
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo(self.revision)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.history.can_redo(self.revision)
    }

    /// History statistics of the current module
    pub fn history_stats(&self) -> HistoryStats {
        self.history.stats()
    }

    /// Snapshot history, then remove every node and connection of the
    /// current module and reset its viewport
    pub fn clear_canvas(&mut self) {
        self.save_to_history();
        self.clear_current_graph();
        self.set_viewport(Viewport::default().into());
    }

    /// Empty the live graph, emitting removal events
    pub(crate) fn clear_current_graph(&mut self) {
        self.clear_selection();
        self.connecting = None;
        if self.graph.is_empty() {
            return;
        }

        let connections: Vec<ConnectionId> = self.graph.connections().map(|c| c.id.clone()).collect();
        let nodes = self.node_ids();
        self.graph.clear();
        self.touch();
        for id in connections {
            self.emit(StoreEvent::ConnectionRemoved(id));
        }
        for id in nodes {
            self.emit(StoreEvent::NodeRemoved(id));
        }
    }
}

impl<D: NodeData> Default for GraphStore<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DEFAULT_MAX_ZOOM;
    use crate::history::DEFAULT_HISTORY_LIMIT;
    use nodeflow_graph::{NodeTemplate, Port, PortKind};
    use serde_json::{json, Value};

    fn node(id: &str) -> Node<Value> {
        Node::new(id, "test").with_id(id)
    }

    fn store_with(ids: &[&str]) -> GraphStore {
        let mut store = GraphStore::new();
        for id in ids {
            store.add_node(node(id)).unwrap();
        }
        store
    }

    fn nid(id: &str) -> NodeId {
        NodeId::from(id)
    }

    #[test]
    fn test_add_node_rejects_duplicates() {
        let mut store = store_with(&["a"]);
        assert!(store.add_node(node("a").with_position(5.0, 5.0)).is_none());
        assert_eq!(store.node_count(), 1);
        assert_eq!(store.node(&nid("a")).unwrap().position, Position::default());
    }

    #[test]
    fn test_added_nodes_are_unselected() {
        let mut store = GraphStore::new();
        let mut selected = node("a");
        selected.selected = true;
        store.add_node(selected);
        assert!(!store.node(&nid("a")).unwrap().selected);
        assert!(store.selected_nodes().is_empty());
    }

    #[test]
    fn test_remove_node_cascades_and_is_idempotent() {
        let mut store = store_with(&["a", "b", "c"]);
        let ab = store.add_connection(Connection::new("a", "out", "b", "in")).unwrap();
        store.add_connection(Connection::new("b", "out", "c", "in")).unwrap();
        let ac = store.add_connection(Connection::new("a", "out", "c", "in")).unwrap();
        store.select_connection(&ab);

        store.remove_node(&nid("b"));
        assert_eq!(store.connection_count(), 1);
        assert!(store.connection(&ac).is_some());
        assert!(store.selected_connections().is_empty());

        let nodes = store.nodes_handle();
        let revision = store.revision;
        store.remove_node(&nid("b"));
        assert!(Arc::ptr_eq(&nodes, &store.nodes_handle()));
        assert_eq!(store.revision, revision);
    }

    #[test]
    fn test_connection_rules() {
        let mut store = store_with(&["a", "b"]);
        assert!(store.add_connection(Connection::new("a", "out", "a", "in")).is_none());
        assert!(store.add_connection(Connection::new("a", "out", "zz", "in")).is_none());
        assert!(store.add_connection(Connection::new("a", "out", "b", "in")).is_some());
        assert!(store.add_connection(Connection::new("a", "out", "b", "in")).is_none());
        assert_eq!(store.connection_count(), 1);
    }

    #[test]
    fn test_connecting_lifecycle() {
        let mut store = store_with(&["a", "b"]);
        store.update_connection_mouse(Position::new(1.0, 1.0));
        assert!(store.connecting().is_none());

        store.start_connection(&nid("a"), "out", None);
        store.update_connection_mouse(Position::new(300.0, 40.0));
        assert_eq!(store.connecting().unwrap().pointer, Some(Position::new(300.0, 40.0)));
        assert!(store.connecting_path(|_| None).is_some());

        let id = store.complete_connection(&nid("b"), "in").unwrap();
        assert!(store.connecting().is_none());
        let connection = store.connection(&id).unwrap();
        assert_eq!(connection.connection_type, Some(ConnectionType::Bezier));
        assert_eq!(connection.curvature, Some(0.5));

        store.start_connection(&nid("a"), "out", None);
        assert!(store.complete_connection(&nid("a"), "in").is_none());
        assert!(store.connecting().is_none());

        store.start_connection(&nid("a"), "out", None);
        assert!(store.complete_connection(&nid("b"), "in").is_none());
        assert_eq!(store.connection_count(), 1);

        store.start_connection(&nid("a"), "out", None);
        store.cancel_connection();
        assert!(store.complete_connection(&nid("b"), "other").is_none());
    }

    #[test]
    fn test_selection_is_exclusive_and_flags_follow() {
        let mut store = store_with(&["a", "b"]);
        let conn = store.add_connection(Connection::new("a", "out", "b", "in")).unwrap();

        store.select_node(&nid("a"), false);
        store.select_node(&nid("b"), true);
        assert_eq!(store.selected_nodes().len(), 2);
        assert!(store.node(&nid("b")).unwrap().selected);

        store.select_connection(&conn);
        assert!(store.selected_nodes().is_empty());
        assert!(!store.node(&nid("a")).unwrap().selected);
        assert!(store.connection(&conn).unwrap().selected);

        store.select_node(&nid("a"), true);
        assert!(store.selected_connections().is_empty());
        assert!(!store.connection(&conn).unwrap().selected);

        store.select_nodes(&[nid("b"), nid("missing")]);
        assert_eq!(store.selected_nodes().iter().cloned().collect::<Vec<_>>(), vec![nid("b")]);
        assert!(!store.node(&nid("a")).unwrap().selected);

        store.clear_selection();
        assert!(!store.has_selection());
        assert!(store.nodes().all(|n| !n.selected));
    }

    #[test]
    fn test_selection_does_not_bump_revision() {
        let mut store = store_with(&["a"]);
        store.save_to_history();
        let stats = store.history_stats();
        let revision = store.revision;

        store.select_node(&nid("a"), false);
        store.select_connection(&ConnectionId::from("missing"));
        store.save_to_history();
        assert_eq!(store.revision, revision);
        assert_eq!(store.history_stats(), stats);
        assert!(!store.can_redo());
    }

    #[test]
    fn test_update_and_move_node() {
        let mut store = store_with(&["a"]);
        store.update_node(
            &nid("a"),
            NodePatch {
                name: Some("Renamed".into()),
                ..Default::default()
            },
        );
        store.move_node(&nid("a"), Position::new(40.0, 60.0));
        let a = store.node(&nid("a")).unwrap();
        assert_eq!(a.name, "Renamed");
        assert_eq!(a.position, Position::new(40.0, 60.0));

        store.update_node(&nid("zz"), NodePatch::default());
        store.move_node(&nid("zz"), Position::default());
        assert_eq!(store.node_count(), 1);
    }

    #[test]
    fn test_clone_copy_paste() {
        let mut store = store_with(&["a"]);
        store.select_node(&nid("a"), false);
        let clone = store.clone_node(&nid("a"), Position::new(20.0, 20.0)).unwrap();
        assert_ne!(clone, nid("a"));
        assert_eq!(store.node(&clone).unwrap().position, Position::new(20.0, 20.0));
        assert!(!store.node(&clone).unwrap().selected);

        let json = store.copy_nodes(&[nid("a"), nid("missing")]);
        let pasted = store.paste_nodes(&json, store.paste_offset());
        assert_eq!(pasted.len(), 1);
        assert_ne!(pasted[0], nid("a"));
        assert_eq!(store.node(&pasted[0]).unwrap().position, Position::new(20.0, 20.0));

        assert!(store.paste_nodes("not json", Position::default()).is_empty());
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.clone_nodes(&[nid("a"), clone.clone()], Position::new(5.0, 5.0)).len(), 2);
    }

    #[test]
    fn test_history_round_trip_save_before_mutate() {
        let mut store = store_with(&["a"]);
        store.save_to_history();

        store.save_to_history();
        store.add_node(node("b"));
        assert!(store.can_undo());

        assert!(store.undo());
        assert_eq!(store.node_ids(), vec![nid("a")]);
        assert!(store.can_redo());

        assert!(store.redo());
        assert_eq!(store.node_ids(), vec![nid("a"), nid("b")]);
    }

    #[test]
    fn test_history_round_trip_save_after_mutate() {
        let mut store = GraphStore::<Value>::new();
        store.add_node(node("a"));
        store.save_to_history();
        store.add_node(node("b"));
        store.save_to_history();

        assert!(store.undo());
        assert_eq!(store.node_ids(), vec![nid("a")]);
        assert!(store.undo());
        assert_eq!(store.node_count(), 0);
        assert!(!store.undo());

        assert!(store.redo());
        assert!(store.redo());
        assert_eq!(store.node_ids(), vec![nid("a"), nid("b")]);
        assert!(!store.redo());
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut store = store_with(&["a"]);
        store.save_to_history();
        store.add_node(node("b"));
        store.select_node(&nid("b"), false);
        store.select_node(&nid("a"), true);

        store.undo();
        assert_eq!(store.selected_nodes().iter().cloned().collect::<Vec<_>>(), vec![nid("a")]);
        assert!(store.node(&nid("a")).unwrap().selected);
    }

    #[test]
    fn test_history_is_capped() {
        let mut config = EditorConfig::default();
        config.history_limit = 3;
        let mut store = GraphStore::<Value>::with_config(&config);
        for i in 0..10 {
            store.add_node(Node::new("n", "test").with_id(i as i64));
            store.save_to_history();
        }

        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, 3);
        assert_eq!(store.node_count(), 7);
    }

    #[test]
    fn test_history_cap_default() {
        let mut store = GraphStore::<Value>::new();
        for i in 0..60 {
            store.add_node(Node::new("n", "test").with_id(i as i64));
            store.save_to_history();
        }
        assert_eq!(store.history_stats().undo_count, DEFAULT_HISTORY_LIMIT);

        let mut undone = 0;
        while store.undo() {
            undone += 1;
        }
        assert_eq!(undone, DEFAULT_HISTORY_LIMIT);
        assert_eq!(store.node_count(), 10);
    }

    #[test]
    fn test_node_connections() {
        let mut store = store_with(&["a", "b", "c"]);
        let ab = store.add_connection(Connection::new("a", "out", "b", "in")).unwrap();
        let bc = store.add_connection(Connection::new("b", "out", "c", "in")).unwrap();

        let ids: Vec<ConnectionId> = store.node_connections(&nid("b")).into_iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![ab.clone(), bc]);
        let ids: Vec<ConnectionId> = store.node_connections(&nid("a")).into_iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec![ab]);
        assert!(store.node_connections(&nid("missing")).is_empty());
    }

    #[test]
    fn test_zoom_limits_from_config_are_sanitized() {
        let mut config = EditorConfig::default();
        config.canvas.zoom.min = 2.0;
        config.canvas.zoom.max = 1.0;
        let mut store = GraphStore::<Value>::with_config(&config);

        assert_eq!(store.set_zoom(1.5), 1.5);
        assert_eq!(store.set_zoom(10.0), DEFAULT_MAX_ZOOM);
        assert!(store.change_module("Other"));
        assert_eq!(store.viewport().zoom, 1.0);
    }

    #[test]
    fn test_modules_are_isolated() {
        let mut store = store_with(&["a"]);
        store.pan_to(50.0, 10.0);
        store.select_node(&nid("a"), false);

        assert!(store.change_module("Other"));
        assert_eq!(store.current_module(), "Other");
        assert_eq!(store.node_count(), 0);
        assert!(!store.has_selection());
        assert_eq!(store.viewport(), Viewport::default());
        assert!(!store.can_undo());

        store.add_node(node("x"));
        assert!(store.change_module("Home"));
        assert_eq!(store.node_ids(), vec![nid("a")]);
        assert_eq!(store.viewport().x, 50.0);
        assert!(store.nodes().all(|n| !n.selected));

        assert!(!store.change_module("Nowhere"));
        assert_eq!(store.current_module(), "Home");
        assert_eq!(store.modules(), vec!["Home", "Other"]);
    }

    #[test]
    fn test_change_to_current_module_resets_interaction() {
        let mut store = store_with(&["a", "b"]);
        store.select_node(&nid("a"), false);
        store.start_connection(&nid("a"), "out", None);

        assert!(store.change_module("Home"));
        assert!(!store.has_selection());
        assert!(store.connecting().is_none());
        assert!(store.nodes().all(|n| !n.selected));
        assert_eq!(store.node_count(), 2);
    }

    #[test]
    fn test_module_add_remove() {
        let mut store = GraphStore::<Value>::new();
        assert!(store.add_module("Third"));
        assert!(!store.add_module("Third"));
        assert!(!store.add_module(" "));
        assert!(!store.remove_module("Home"));
        assert!(!store.remove_module("Missing"));
        assert!(store.remove_module("Third"));
        assert_eq!(store.modules(), vec!["Home", "Other"]);
    }

    #[test]
    fn test_zoom_clamping_and_canvas_toggles() {
        let mut store = GraphStore::<Value>::new();
        assert_eq!(store.set_zoom(10.0), 2.0);
        assert_eq!(store.zoom_out(Some(5.0)), 0.5);
        assert!((store.zoom_in(None) - 0.6).abs() < 1e-9);
        assert_eq!(store.zoom_reset(), 1.0);

        store.pan_by(10.0, -5.0);
        store.pan_by(10.0, -5.0);
        assert_eq!(store.viewport().offset(), Position::new(20.0, -10.0));

        store.toggle_lock();
        assert!(store.is_locked());
        store.toggle_lock();
        assert_eq!(store.canvas().mode, EditorMode::Edit);
        store.set_mode(EditorMode::View);
        store.toggle_lock();
        assert_eq!(store.canvas().mode, EditorMode::Edit);

        store.toggle_grid();
        store.toggle_snap();
        assert!(!store.canvas().grid.visible);
        assert!(store.canvas().grid.snap);
        assert_eq!(store.toggle_theme(), Theme::Dark);
    }

    #[test]
    fn test_delete_selected_and_clear_canvas() {
        let mut store = store_with(&["a", "b", "c"]);
        store.add_connection(Connection::new("a", "out", "b", "in")).unwrap();
        store.select_nodes(&[nid("a"), nid("c")]);
        store.delete_selected();
        assert_eq!(store.node_ids(), vec![nid("b")]);
        assert_eq!(store.connection_count(), 0);
        assert!(store.undo());
        assert_eq!(store.node_count(), 3);

        store.pan_to(30.0, 30.0);
        store.clear_canvas();
        assert_eq!(store.node_count(), 0);
        assert_eq!(store.viewport(), Viewport::default());
        assert!(store.undo());
        assert_eq!(store.node_count(), 3);
    }

    #[test]
    fn test_templates_categories_and_box_select() {
        let mut registry: NodeRegistry = NodeRegistry::new();
        registry.register(
            NodeTemplate::new("Number", "number")
                .with_category("math")
                .with_output(Port::output("value", PortKind::Number)),
        );

        let mut store = GraphStore::new();
        let a = store
            .add_node_from_template(&registry, "number", Position::new(0.0, 0.0))
            .unwrap();
        let b = store
            .add_node_from_template(&registry, "number", Position::new(400.0, 0.0))
            .unwrap();
        assert!(store.add_node_from_template(&registry, "missing", Position::default()).is_none());
        assert_eq!(store.node(&a).unwrap().category(), "math");

        store.set_nodes_category(&[b.clone()], "io");
        assert_eq!(store.node(&b).unwrap().category(), "io");

        let rect = Rect::from_corners(Position::new(-10.0, -10.0), Position::new(100.0, 100.0));
        assert_eq!(store.nodes_in_rect(rect, |_| None), vec![a]);
    }

    #[test]
    fn test_connection_path_uses_ports() {
        let mut store = GraphStore::<Value>::new();
        store.add_node(
            node("a")
                .with_output(Port::output("out", PortKind::Any))
                .with_position(0.0, 0.0),
        );
        store.add_node(
            node("b")
                .with_input(Port::input("in", PortKind::Any))
                .with_position(300.0, 0.0),
        );
        let id = store.add_connection(Connection::new("a", "out", "b", "in")).unwrap();
        assert_eq!(
            store.connection_path(&id, |_| None).unwrap(),
            "M 150 40 C 225 40, 225 40, 300 40"
        );
        assert!(store.connection_path(&ConnectionId::from("nope"), |_| None).is_none());
    }

    #[test]
    fn test_reroute_points_shape_the_path() {
        let mut store = store_with(&["a", "b"]);
        let id = store.add_connection(Connection::new("a", "out", "b", "in")).unwrap();
        let straight = store.connection_path(&id, |_| None).unwrap();

        let point = store.add_reroute_point(&id, 0, Position::new(200.0, 200.0)).unwrap();
        let routed = store.connection_path(&id, |_| None).unwrap();
        assert_ne!(routed, straight);
        assert!(routed.contains("200 200"));

        store.move_reroute_point(&id, &point, Position::new(220.0, 180.0));
        assert_eq!(
            store.connection(&id).unwrap().reroute_points[0].position,
            Position::new(220.0, 180.0)
        );

        store.remove_reroute_point(&id, &point);
        assert_eq!(store.connection_path(&id, |_| None).unwrap(), straight);
        assert!(store.add_reroute_point(&ConnectionId::from("nope"), 0, Position::default()).is_none());
    }

    #[test]
    fn test_events_are_queued() {
        let mut store = GraphStore::<Value>::new();
        store.drain_events();
        store.add_node(node("a"));
        store.select_node(&nid("a"), false);
        store.set_zoom(1.5);
        let names: Vec<&str> = store.drain_events().iter().map(StoreEvent::name).collect();
        assert_eq!(names, vec!["node:created", "node:selected", "zoom:changed"]);
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn test_shared_handle() {
        let shared = GraphStore::<Value>::new().into_shared();
        shared.write().add_node(Node::new("A", "a").with_data(json!({"v": 1})));
        assert_eq!(shared.read().node_count(), 1);
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.
//!
//! Both collections sit behind an [`Arc`] and are copied on write, so a
//! handle taken before a mutation keeps pointing at the old contents.

use crate::connection::Connection;
use crate::id::{ConnectionId, NodeId};
use crate::node::Node;
use indexmap::IndexMap;
use std::sync::Arc;

/// Nodes keyed by id, in insertion order
pub type NodeMap<D> = IndexMap<NodeId, Node<D>>;
/// Connections keyed by id, in insertion order
pub type ConnectionMap = IndexMap<ConnectionId, Connection>;

/// The nodes and connections of one module
#[derive(Debug, Clone)]
pub struct Graph<D = serde_json::Value> {
    nodes: Arc<NodeMap<D>>,
    connections: Arc<ConnectionMap>,
}

impl<D> Graph<D> {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(IndexMap::new()),
            connections: Arc::new(IndexMap::new()),
        }
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node<D>> {
        self.nodes.get(node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node<D>> {
        self.nodes.values()
    }

    /// Get all node IDs
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether a node with this id exists
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Get a connection by ID
    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    /// Get all connections
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Get connections involving a node
    pub fn connections_for_node<'a, 'b>(&'a self, node_id: &'b NodeId) -> impl Iterator<Item = &'a Connection> + 'b
    where
        'a: 'b,
    {
        self.connections.values().filter(move |c| c.involves_node(node_id))
    }

    /// Find the connection linking exactly these ports
    pub fn find_connection(
        &self,
        source: &NodeId,
        source_output: &str,
        target: &NodeId,
        target_input: &str,
    ) -> Option<&Connection> {
        self.connections
            .values()
            .find(|c| c.links(source, source_output, target, target_input))
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Whether a connection with this id exists
    pub fn contains_connection(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    /// Whether the graph has no nodes and no connections
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }

    /// Shared handle to the node collection
    pub fn nodes_handle(&self) -> Arc<NodeMap<D>> {
        Arc::clone(&self.nodes)
    }

    /// Shared handle to the connection collection
    pub fn connections_handle(&self) -> Arc<ConnectionMap> {
        Arc::clone(&self.connections)
    }

    /// Whether both graphs share the same collections
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes) && Arc::ptr_eq(&self.connections, &other.connections)
    }

    /// Remove everything
    pub fn clear(&mut self) {
        self.nodes = Arc::new(IndexMap::new());
        self.connections = Arc::new(IndexMap::new());
    }
}

impl<D: Clone> Graph<D> {
    /// Add a node to the graph
    pub fn add_node(&mut self, node: Node<D>) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        Arc::make_mut(&mut self.nodes).insert(id.clone(), node);
        Ok(id)
    }

    /// Remove a node and every connection touching it.
    ///
    /// Returns the node and the removed connections in their original order.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<(Node<D>, Vec<Connection>)> {
        if !self.nodes.contains_key(node_id) {
            return None;
        }
        let removed: Vec<Connection> = self.connections_for_node(node_id).cloned().collect();
        if !removed.is_empty() {
            Arc::make_mut(&mut self.connections).retain(|_, c| !c.involves_node(node_id));
        }
        let node = Arc::make_mut(&mut self.nodes).shift_remove(node_id)?;
        Some((node, removed))
    }

    /// Get a mutable node by ID
    pub fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node<D>> {
        if !self.nodes.contains_key(node_id) {
            return None;
        }
        Arc::make_mut(&mut self.nodes).get_mut(node_id)
    }

    /// Mutate every node in place
    pub fn for_each_node_mut(&mut self, f: impl FnMut(&mut Node<D>)) {
        if self.nodes.is_empty() {
            return;
        }
        Arc::make_mut(&mut self.nodes).values_mut().for_each(f);
    }

    /// Add a connection between two existing nodes
    pub fn add_connection(&mut self, connection: Connection) -> Result<ConnectionId, GraphError> {
        if connection.source == connection.target {
            return Err(GraphError::SelfLoop(connection.source));
        }
        for endpoint in [&connection.source, &connection.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::NodeNotFound(endpoint.clone()));
            }
        }
        if self.connections.contains_key(&connection.id) {
            return Err(GraphError::DuplicateConnectionId(connection.id));
        }
        if let Some(existing) = self.connections.values().find(|c| c.same_endpoints(&connection)) {
            return Err(GraphError::DuplicateConnection(existing.id.clone()));
        }

        let id = connection.id.clone();
        Arc::make_mut(&mut self.connections).insert(id.clone(), connection);
        Ok(id)
    }

    /// Remove a connection
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        if !self.connections.contains_key(connection_id) {
            return None;
        }
        Arc::make_mut(&mut self.connections).shift_remove(connection_id)
    }

    /// Get a mutable connection by ID
    pub fn connection_mut(&mut self, connection_id: &ConnectionId) -> Option<&mut Connection> {
        if !self.connections.contains_key(connection_id) {
            return None;
        }
        Arc::make_mut(&mut self.connections).get_mut(connection_id)
    }

    /// Mutate every connection in place
    pub fn for_each_connection_mut(&mut self, f: impl FnMut(&mut Connection)) {
        if self.connections.is_empty() {
            return;
        }
        Arc::make_mut(&mut self.connections).values_mut().for_each(f);
    }
}

impl<D> Default for Graph<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Constraint violation reported by [`Graph`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// A node with this id already exists
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// The same ports are already linked by the given connection
    #[error("Ports already connected by {0}")]
    DuplicateConnection(ConnectionId),

    /// A connection with this id already exists
    #[error("Duplicate connection id: {0}")]
    DuplicateConnectionId(ConnectionId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed on node {0}")]
    SelfLoop(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn graph_with(ids: &[&str]) -> Graph<Value> {
        let mut graph = Graph::new();
        for id in ids {
            graph.add_node(Node::new(*id, "test").with_id(*id)).unwrap();
        }
        graph
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = graph_with(&["a"]);
        let err = graph.add_node(Node::new("again", "test").with_id("a")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode(NodeId::from("a")));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node(&NodeId::from("a")).unwrap().name, "a");
    }

    #[test]
    fn test_connection_constraints() {
        let mut graph = graph_with(&["a", "b"]);
        let a = NodeId::from("a");
        let b = NodeId::from("b");

        let id = graph.add_connection(Connection::new("a", "out", "b", "in")).unwrap();
        assert_eq!(
            graph.add_connection(Connection::new("a", "out", "b", "in")),
            Err(GraphError::DuplicateConnection(id.clone()))
        );
        assert_eq!(
            graph.add_connection(Connection::new("a", "out", "a", "in")),
            Err(GraphError::SelfLoop(a.clone()))
        );
        assert_eq!(
            graph.add_connection(Connection::new("a", "out", "zz", "in")),
            Err(GraphError::NodeNotFound(NodeId::from("zz")))
        );
        assert_eq!(
            graph.add_connection(Connection::new("b", "out", "a", "in").with_id(id.clone())),
            Err(GraphError::DuplicateConnectionId(id))
        );
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.find_connection(&a, "out", &b, "in").is_some());
        assert!(graph.find_connection(&b, "out", &a, "in").is_none());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut graph = graph_with(&["a", "b", "c"]);
        graph.add_connection(Connection::new("a", "out", "b", "in")).unwrap();
        graph.add_connection(Connection::new("b", "out", "c", "in")).unwrap();
        let keep = graph.add_connection(Connection::new("a", "out", "c", "in")).unwrap();

        let (node, removed) = graph.remove_node(&NodeId::from("b")).unwrap();
        assert_eq!(node.name, "b");
        assert_eq!(removed.len(), 2);
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.contains_connection(&keep));
        assert!(graph.remove_node(&NodeId::from("b")).is_none());
        assert_eq!(graph.node_ids().cloned().collect::<Vec<_>>(), vec![NodeId::from("a"), NodeId::from("c")]);
    }

    #[test]
    fn test_copy_on_write_handles() {
        let mut graph = graph_with(&["a", "b"]);
        let before = graph.nodes_handle();
        let snapshot = graph.clone();
        assert!(graph.ptr_eq(&snapshot));

        graph.node_mut(&NodeId::from("a")).unwrap().name = "changed".to_string();
        assert!(!Arc::ptr_eq(&before, &graph.nodes_handle()));
        assert_eq!(before[&NodeId::from("a")].name, "a");
        assert_eq!(snapshot.node(&NodeId::from("a")).unwrap().name, "a");

        let handle = graph.connections_handle();
        assert!(graph.node_mut(&NodeId::from("missing")).is_none());
        assert!(graph.remove_connection(&ConnectionId::from("missing")).is_none());
        assert!(Arc::ptr_eq(&handle, &graph.connections_handle()));
    }
}

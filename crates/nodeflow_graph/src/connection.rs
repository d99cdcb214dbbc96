// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::geometry::{Position, DEFAULT_CURVATURE};
use crate::id::{generate_short_id, ConnectionId, NodeId};
use serde::{Deserialize, Serialize};

/// Lower bound applied to a connection's curvature
pub const MIN_CURVATURE: f64 = 0.1;
/// Upper bound applied to a connection's curvature
pub const MAX_CURVATURE: f64 = 1.0;

/// Rendering style hint for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Cubic curve
    #[default]
    Bezier,
    /// Straight line
    Straight,
    /// Orthogonal steps
    Stepped,
}

/// Waypoint a connection is routed through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReroutePoint {
    /// Short unique id
    #[serde(default = "generate_short_id")]
    pub id: String,
    /// World position
    pub position: Position,
}

impl ReroutePoint {
    /// Create a waypoint with a fresh id
    pub fn new(position: Position) -> Self {
        Self {
            id: generate_short_id(),
            position,
        }
    }
}

/// A directed connection from an output port to an input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Unique connection ID (a fresh one when missing from the input)
    #[serde(default)]
    pub id: ConnectionId,
    /// Source node ID
    pub source: NodeId,
    /// Source output port name
    pub source_output: String,
    /// Target node ID
    pub target: NodeId,
    /// Target input port name
    pub target_input: String,
    /// Rendering style
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<ConnectionType>,
    /// Label drawn along the curve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Stroke color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Stroke width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Dashed stroke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashed: Option<bool>,
    /// Animated stroke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animated: Option<bool>,
    /// Waypoints in routing order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reroute_points: Vec<ReroutePoint>,
    /// Mirrors membership in the store's connection selection
    #[serde(default)]
    pub selected: bool,
    /// Curve tension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curvature: Option<f64>,
}

impl Connection {
    /// Create a new connection with a fresh id and no rendering hints
    pub fn new(
        source: impl Into<NodeId>,
        source_output: impl Into<String>,
        target: impl Into<NodeId>,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            source: source.into(),
            source_output: source_output.into(),
            target: target.into(),
            target_input: target_input.into(),
            connection_type: None,
            label: None,
            color: None,
            width: None,
            dashed: None,
            animated: None,
            reroute_points: Vec::new(),
            selected: false,
            curvature: None,
        }
    }

    /// Set an explicit id
    pub fn with_id(mut self, id: impl Into<ConnectionId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the rendering style
    pub fn with_type(mut self, connection_type: ConnectionType) -> Self {
        self.connection_type = Some(connection_type);
        self
    }

    /// Set the curvature
    pub fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = Some(curvature);
        self
    }

    /// Curvature used for path generation
    pub fn effective_curvature(&self) -> f64 {
        self.curvature
            .filter(|c| c.is_finite())
            .map_or(DEFAULT_CURVATURE, |c| c.clamp(MIN_CURVATURE, MAX_CURVATURE))
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }

    /// Check if this connection links the same ports as `other`
    pub fn same_endpoints(&self, other: &Connection) -> bool {
        self.links(&other.source, &other.source_output, &other.target, &other.target_input)
    }

    /// Check if this connection links exactly these ports
    pub fn links(&self, source: &NodeId, source_output: &str, target: &NodeId, target_input: &str) -> bool {
        &self.source == source
            && self.source_output == source_output
            && &self.target == target
            && self.target_input == target_input
    }

    /// Insert a waypoint at `index` (appended when out of range), returning its id
    pub fn insert_reroute_point(&mut self, index: usize, position: Position) -> String {
        let point = ReroutePoint::new(position);
        let id = point.id.clone();
        let index = index.min(self.reroute_points.len());
        self.reroute_points.insert(index, point);
        id
    }

    /// Move a waypoint; returns false if it does not exist
    pub fn move_reroute_point(&mut self, point_id: &str, position: Position) -> bool {
        match self.reroute_points.iter_mut().find(|p| p.id == point_id) {
            Some(point) => {
                point.position = position;
                true
            }
            None => false,
        }
    }

    /// Remove a waypoint; returns false if it does not exist
    pub fn remove_reroute_point(&mut self, point_id: &str) -> bool {
        let before = self.reroute_points.len();
        self.reroute_points.retain(|p| p.id != point_id);
        self.reroute_points.len() != before
    }
}

/// Partial update for a connection's rendering hints.
///
/// Endpoints are immutable; remove and re-add to rewire.
#[derive(Debug, Clone, Default)]
pub struct ConnectionPatch {
    /// New rendering style
    pub connection_type: Option<ConnectionType>,
    /// New label
    pub label: Option<String>,
    /// New stroke color
    pub color: Option<String>,
    /// New stroke width
    pub width: Option<f64>,
    /// Draw dashed
    pub dashed: Option<bool>,
    /// Animate the stroke
    pub animated: Option<bool>,
    /// Replacement waypoint list
    pub reroute_points: Option<Vec<ReroutePoint>>,
    /// New curvature
    pub curvature: Option<f64>,
}

impl ConnectionPatch {
    /// Merge the present fields into `connection`
    pub fn apply(self, connection: &mut Connection) {
        if let Some(connection_type) = self.connection_type {
            connection.connection_type = Some(connection_type);
        }
        if let Some(label) = self.label {
            connection.label = Some(label);
        }
        if let Some(color) = self.color {
            connection.color = Some(color);
        }
        if let Some(width) = self.width {
            connection.width = Some(width);
        }
        if let Some(dashed) = self.dashed {
            connection.dashed = Some(dashed);
        }
        if let Some(animated) = self.animated {
            connection.animated = Some(animated);
        }
        if let Some(points) = self.reroute_points {
            connection.reroute_points = points;
        }
        if let Some(curvature) = self.curvature {
            connection.curvature = Some(curvature);
        }
    }
}

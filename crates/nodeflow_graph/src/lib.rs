// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph model for the nodeflow editor.
//!
//! This crate holds the data the editor manipulates:
//! - Nodes with named input/output ports and an opaque payload
//! - Connections with optional rendering hints and reroute points
//! - A per-module graph container that enforces connection constraints
//! - Node templates for palettes
//!
//! ## Geometry
//!
//! The [`geometry`] module computes port anchors and SVG curve paths in world
//! coordinates. It knows nothing about rendering; callers pass measured node
//! dimensions when they have them.

pub mod id;
pub mod port;
pub mod node;
pub mod connection;
pub mod graph;
pub mod geometry;

pub use id::{ConnectionId, NodeId};
pub use node::{Node, NodeData, NodePatch, NodeRegistry, NodeTemplate};
pub use port::{Port, PortDirection, PortKind, PortMap};
pub use connection::{Connection, ConnectionPatch, ConnectionType, ReroutePoint};
pub use graph::{Graph, GraphError};
pub use geometry::{LayoutDirection, NodeDimensions, Position, Rect};

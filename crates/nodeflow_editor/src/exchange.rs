// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flow import and export.
//!
//! Export writes a versioned JSON envelope:
//!
//! ```json
//! { "version": "1.0.0",
//!   "drawflow": { "Home": { "data": { "<node id>": { ... } },
//!                           "connections": [ ... ],
//!                           "viewport": { "x": 0, "y": 0, "zoom": 1 } } } }
//! ```
//!
//! Import accepts the envelope and the older flat shape
//! `{ "nodes": [...], "connections": [...], "viewport": {...} }`. Imported
//! nodes always receive fresh ids; connections follow their endpoints.

use crate::canvas::{Viewport, ViewportPatch};
use crate::events::StoreEvent;
use crate::history::GraphSnapshot;
use crate::store::GraphStore;
use indexmap::IndexMap;
use nodeflow_graph::{Connection, ConnectionId, Graph, Node, NodeData, NodeId, Position};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Version written into exported envelopes
pub const FLOW_FORMAT_VERSION: &str = "1.0.0";

/// Newest major envelope version understood by import
const SUPPORTED_MAJOR_VERSION: u64 = 1;

/// Legacy import matches nodes closer than this on both axes
const LEGACY_MATCH_TOLERANCE: f64 = 1.0;

/// Flow import/export errors
#[derive(Debug, Error)]
pub enum FlowError {
    /// The document is not a flow this editor can read
    #[error("Invalid flow data format: {detail}")]
    InvalidFormat {
        /// What was wrong
        detail: String,
    },

    /// The envelope was written by a newer editor
    #[error("Unsupported flow version {0}")]
    UnsupportedVersion(String),

    /// Serializing the envelope failed
    #[error("Failed to serialize flow: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Reading or writing a flow file failed
    #[error("Failed to access flow file {path}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl FlowError {
    fn invalid(detail: impl fmt::Display) -> Self {
        Self::InvalidFormat {
            detail: detail.to_string(),
        }
    }
}

/// What an import added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Modules that received data, in document order
    pub modules: Vec<String>,
    /// Nodes added across all modules
    pub nodes: usize,
    /// Connections added across all modules
    pub connections: usize,
    /// Connections skipped because an endpoint could not be resolved or
    /// the connection was rejected
    pub dropped_connections: usize,
}

#[derive(Serialize)]
#[serde(bound = "D: Serialize")]
struct FlowEnvelope<'a, D> {
    version: &'static str,
    drawflow: IndexMap<&'a str, ModuleExport<'a, D>>,
}

#[derive(Serialize)]
#[serde(bound = "D: Serialize")]
struct ModuleExport<'a, D> {
    data: IndexMap<String, &'a Node<D>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    connections: Vec<&'a Connection>,
    viewport: Viewport,
}

impl<'a, D> ModuleExport<'a, D> {
    fn new(graph: &'a Graph<D>, viewport: Viewport) -> Self {
        Self {
            data: graph.nodes().map(|node| (node.id.to_string(), node)).collect(),
            connections: graph.connections().collect(),
            viewport,
        }
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned + Default"))]
struct ModuleEntry<D> {
    #[serde(default = "IndexMap::new")]
    data: IndexMap<String, Node<D>>,
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    viewport: Option<ViewportPatch>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "D: DeserializeOwned + Default"))]
struct LegacyDocument<D> {
    nodes: Vec<Node<D>>,
    #[serde(default)]
    connections: Vec<Connection>,
    #[serde(default)]
    viewport: Option<ViewportPatch>,
}

enum FlowDocument<D> {
    Modules(IndexMap<String, ModuleEntry<D>>),
    Legacy(LegacyDocument<D>),
}

impl<D: NodeData> FlowDocument<D> {
    /// Parse and validate the whole document before anything is applied
    fn parse(json: &str) -> Result<Self, FlowError> {
        let value: Value = serde_json::from_str(json).map_err(FlowError::invalid)?;
        let Value::Object(mut root) = value else {
            return Err(FlowError::invalid("expected a JSON object"));
        };
        check_version(root.get("version"))?;

        if let Some(drawflow) = root.remove("drawflow") {
            let modules = serde_json::from_value(drawflow).map_err(FlowError::invalid)?;
            return Ok(Self::Modules(modules));
        }
        if root.contains_key("nodes") {
            let legacy = serde_json::from_value(Value::Object(root)).map_err(FlowError::invalid)?;
            return Ok(Self::Legacy(legacy));
        }
        Err(FlowError::invalid("expected a \"drawflow\" or \"nodes\" field"))
    }
}

fn check_version(version: Option<&Value>) -> Result<(), FlowError> {
    let Some(version) = version else {
        return Ok(());
    };
    let major = match version {
        Value::String(text) => text.split('.').next().and_then(|major| major.trim().parse::<u64>().ok()),
        Value::Number(number) => number.as_f64().filter(|v| *v >= 0.0).map(|v| v.trunc() as u64),
        _ => None,
    };
    match major {
        Some(major) if major > SUPPORTED_MAJOR_VERSION => Err(FlowError::UnsupportedVersion(match version {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })),
        Some(_) => Ok(()),
        None => Err(FlowError::invalid(format!("unrecognized version {version}"))),
    }
}

/// Ids created while merging into one graph
#[derive(Debug, Default)]
struct Merged {
    nodes: Vec<NodeId>,
    connections: Vec<ConnectionId>,
    dropped: usize,
}

impl Merged {
    fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }
}

/// Add connections whose endpoints resolve through `id_map`
fn merge_connections<D: Clone>(
    graph: &mut Graph<D>,
    connections: Vec<Connection>,
    id_map: &HashMap<NodeId, NodeId>,
    merged: &mut Merged,
) {
    for mut connection in connections {
        let (Some(source), Some(target)) = (id_map.get(&connection.source), id_map.get(&connection.target))
        else {
            debug!(connection = %connection.id, "Dropped imported connection with unknown endpoint");
            merged.dropped += 1;
            continue;
        };
        connection.source = source.clone();
        connection.target = target.clone();
        connection.selected = false;
        if graph.contains_connection(&connection.id) {
            connection.id = ConnectionId::new();
        }

        match graph.add_connection(connection) {
            Ok(id) => merged.connections.push(id),
            Err(err) => {
                warn!("Skipped imported connection: {err}");
                merged.dropped += 1;
            }
        }
    }
}

/// Add an envelope module's nodes under fresh ids, then its connections
/// through the exact old-to-new id table
fn merge_module<D: Clone>(graph: &mut Graph<D>, entry: ModuleEntry<D>) -> Merged {
    let mut merged = Merged::default();
    let mut id_map = HashMap::new();

    for (key, mut node) in entry.data {
        let old_id = std::mem::replace(&mut node.id, NodeId::new());
        node.selected = false;
        match graph.add_node(node) {
            Ok(new_id) => {
                id_map.insert(old_id, new_id.clone());
                id_map.entry(NodeId::from(key)).or_insert_with(|| new_id.clone());
                merged.nodes.push(new_id);
            }
            Err(err) => warn!("Skipped imported node: {err}"),
        }
    }

    merge_connections(graph, entry.connections, &id_map, &mut merged);
    merged
}

fn same_placement<D>(node: &Node<D>, position: Position, node_type: &str, name: &str) -> bool {
    (node.position.x - position.x).abs() < LEGACY_MATCH_TOLERANCE
        && (node.position.y - position.y).abs() < LEGACY_MATCH_TOLERANCE
        && node.node_type == node_type
        && node.name == name
}

impl<D: NodeData> GraphStore<D> {
    /// Serialize every non-empty module as a pretty-printed envelope
    pub fn export_flow(&mut self) -> Result<String, FlowError> {
        let (json, modules) = {
            let current = self.modules.current();
            let mut drawflow = IndexMap::new();
            for (name, slot) in self.modules.iter() {
                let (graph, viewport) = if name == current {
                    (&self.graph, self.canvas.viewport)
                } else {
                    (&slot.graph, slot.viewport)
                };
                if graph.node_count() > 0 {
                    drawflow.insert(name, ModuleExport::new(graph, viewport));
                }
            }

            let envelope = FlowEnvelope {
                version: FLOW_FORMAT_VERSION,
                drawflow,
            };
            let json = serde_json::to_string_pretty(&envelope).map_err(FlowError::Serialize)?;
            (json, envelope.drawflow.len())
        };

        info!(modules, "Exported flow");
        self.emit(StoreEvent::DataExported { modules });
        Ok(json)
    }

    /// Import a flow document.
    ///
    /// The document is fully parsed before the store is touched, so a
    /// malformed document leaves everything as it was. Unsaved changes
    /// are recorded first; the import itself is one undo step.
    pub fn import_flow(&mut self, json: &str, clear_existing: bool) -> Result<ImportSummary, FlowError> {
        let document = FlowDocument::<D>::parse(json)?;

        self.save_to_history();
        if clear_existing {
            self.clear_current_graph();
        }

        let summary = match document {
            FlowDocument::Modules(modules) => self.import_modules(modules, clear_existing),
            FlowDocument::Legacy(legacy) => self.import_legacy(legacy),
        };

        self.save_to_history();
        info!(
            nodes = summary.nodes,
            connections = summary.connections,
            dropped = summary.dropped_connections,
            "Imported flow"
        );
        self.emit(StoreEvent::DataImported {
            nodes: summary.nodes,
            connections: summary.connections,
        });
        Ok(summary)
    }

    fn import_modules(&mut self, modules: IndexMap<String, ModuleEntry<D>>, clear_existing: bool) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for (name, mut entry) in modules {
            if !self.modules.contains(&name) && !self.add_module(&name) {
                continue;
            }
            let viewport = entry.viewport.take();

            let merged = if name == self.current_module() {
                let merged = merge_module(&mut self.graph, entry);
                self.note_merged(&merged);
                if let Some(patch) = viewport {
                    self.set_viewport(patch);
                }
                merged
            } else {
                let revision = self.allocate_revision();
                let limits = self.canvas.zoom_limits;
                let Some(slot) = self.modules.get_mut(&name) else {
                    continue;
                };

                let cleared = clear_existing && !slot.graph.is_empty();
                if cleared {
                    slot.graph.clear();
                }
                let merged = merge_module(&mut slot.graph, entry);
                if let Some(patch) = viewport {
                    patch.apply(&mut slot.viewport, &limits);
                }
                if cleared || !merged.is_empty() {
                    slot.revision = revision;
                    slot.history.record(GraphSnapshot::new(slot.graph.clone(), revision));
                }
                merged
            };

            summary.nodes += merged.nodes.len();
            summary.connections += merged.connections.len();
            summary.dropped_connections += merged.dropped;
            summary.modules.push(name);
        }

        summary
    }

    fn import_legacy(&mut self, legacy: LegacyDocument<D>) -> ImportSummary {
        let mut merged = Merged::default();

        let placements: Vec<(NodeId, Position, String, String)> = legacy
            .nodes
            .iter()
            .map(|node| (node.id.clone(), node.position, node.node_type.clone(), node.name.clone()))
            .collect();

        for mut node in legacy.nodes {
            node.id = NodeId::new();
            node.selected = false;
            match self.graph.add_node(node) {
                Ok(id) => merged.nodes.push(id),
                Err(err) => warn!("Skipped imported node: {err}"),
            }
        }

        // Payload ids are discarded, so endpoints are matched back by
        // placement, type and name against the whole module.
        let mut id_map = HashMap::new();
        for (old_id, position, node_type, name) in &placements {
            let matched = self
                .graph
                .nodes()
                .find(|node| same_placement(node, *position, node_type, name));
            if let Some(node) = matched {
                id_map.insert(old_id.clone(), node.id.clone());
            }
        }
        merge_connections(&mut self.graph, legacy.connections, &id_map, &mut merged);

        self.note_merged(&merged);
        if let Some(patch) = legacy.viewport {
            self.set_viewport(patch);
        }

        ImportSummary {
            modules: vec![self.current_module().to_string()],
            nodes: merged.nodes.len(),
            connections: merged.connections.len(),
            dropped_connections: merged.dropped,
        }
    }

    /// Bump the revision and queue creation events for merged entities
    fn note_merged(&mut self, merged: &Merged) {
        if merged.is_empty() {
            return;
        }
        self.touch();
        for id in &merged.nodes {
            self.emit(StoreEvent::NodeCreated(id.clone()));
        }
        for id in &merged.connections {
            self.emit(StoreEvent::ConnectionCreated(id.clone()));
        }
    }
}

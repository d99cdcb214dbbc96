// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named ports of one side of a node, in display order
pub type PortMap = IndexMap<String, Port>;

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    /// Input port
    Input,
    /// Output port
    Output,
}

impl PortDirection {
    /// The opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// Declared value kind of a port.
///
/// Purely descriptive: connections are never validated against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    /// String value
    String,
    /// Numeric value
    Number,
    /// Boolean value
    Boolean,
    /// Object value
    Object,
    /// Array value
    Array,
    /// Any value
    #[default]
    Any,
}

/// A port on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Port id (matches its key in the node's port map)
    pub id: String,
    /// Value kind
    #[serde(rename = "type", default)]
    pub kind: PortKind,
    /// Display label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether this port is required
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    /// Whether multiple connections are expected
    #[serde(default, skip_serializing_if = "is_false")]
    pub multiple: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Port {
    /// Create a new port
    pub fn new(id: impl Into<String>, kind: PortKind) -> Self {
        Self {
            id: id.into(),
            kind,
            label: None,
            required: false,
            multiple: false,
        }
    }

    /// Create a new input port
    pub fn input(id: impl Into<String>, kind: PortKind) -> Self {
        Self::new(id, kind)
    }

    /// Create a new output port
    pub fn output(id: impl Into<String>, kind: PortKind) -> Self {
        Self {
            multiple: true, // Outputs fan out by default
            ..Self::new(id, kind)
        }
    }

    /// Set the display label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Label if present, id otherwise
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

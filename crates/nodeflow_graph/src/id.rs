// SPDX-License-Identifier: MIT OR Apache-2.0
//! Identifier generation for nodes, connections and reroute points.
//!
//! Nodes get full UUID v4 strings. Connections and reroute points get a
//! shorter base-36 rendering of the same 122 random bits.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a UUID v4 string
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a short unique ID (for connections, reroute points)
pub fn generate_short_id() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut digits = Vec::with_capacity(25);
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    if digits.is_empty() {
        digits.push(b'0');
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Unique identifier for a node.
///
/// Imported data may use plain numbers; ids minted by the editor are
/// UUID strings. A fractional number such as `1.5` is kept in its text
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum NodeId {
    /// Integer id (legacy data)
    Int(i64),
    /// String id
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNodeId {
    Int(i64),
    Float(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawNodeId::deserialize(deserializer)? {
            RawNodeId::Int(id) => Self::Int(id),
            RawNodeId::Float(id) if id.fract() == 0.0 && id.abs() < i64::MAX as f64 => Self::Int(id as i64),
            RawNodeId::Float(id) => Self::Text(id.to_string()),
            RawNodeId::Text(id) => Self::Text(id),
        })
    }
}

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self::Text(generate_uuid())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self::Text(id)
    }
}

/// Unique identifier for a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub String);

impl ConnectionId {
    /// Create a new random connection ID
    pub fn new() -> Self {
        Self(generate_short_id())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_short_ids_are_unique_and_short() {
        let ids: HashSet<String> = (0..500).map(|_| generate_short_id()).collect();
        assert_eq!(ids.len(), 500);
        for id in &ids {
            assert!(id.len() <= 25);
            assert!(id.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        }
    }

    #[test]
    fn test_node_id_json_forms() {
        let int: NodeId = serde_json::from_str("7").unwrap();
        assert_eq!(int, NodeId::Int(7));
        let text: NodeId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(text, NodeId::from("abc"));
        assert_eq!(serde_json::to_string(&NodeId::Int(3)).unwrap(), "3");
        assert_eq!(NodeId::Int(3).to_string(), "3");
    }

    #[test]
    fn test_node_id_from_fractional_number() {
        let fractional: NodeId = serde_json::from_str("1.5").unwrap();
        assert_eq!(fractional, NodeId::from("1.5"));
        assert_eq!(fractional.to_string(), "1.5");

        let whole: NodeId = serde_json::from_str("4.0").unwrap();
        assert_eq!(whole, NodeId::Int(4));

        let ids: Vec<NodeId> = serde_json::from_str(r#"[1, 2.25, "x"]"#).unwrap();
        assert_eq!(ids, vec![NodeId::Int(1), NodeId::from("2.25"), NodeId::from("x")]);
    }

    #[test]
    fn test_fresh_node_ids_differ() {
        assert_ne!(NodeId::new(), NodeId::new());
        assert_eq!(NodeId::new().to_string().len(), 36);
    }
}

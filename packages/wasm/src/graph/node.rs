//! Node type and related structures.
//!
//! Nodes are the vertices of the diagram. Each node has:
//! - A stable, opaque string identifier (totally ordered)
//! - A display group used by the renderer for coloring
//! - An optional initial position, consulted only when first seeded
//!
//! Kinematic state (position, velocity, pin) lives in the simulation, not here.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable node identifier.
///
/// Opaque to the engine apart from its total order, which decides the
/// orientation of derived links.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a NodeId from any string-like key.
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identity.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the raw key.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Default display group for new nodes.
pub const DEFAULT_GROUP: u32 = 1;

/// A vertex in the graph model.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Stable identity.
    pub id: NodeId,
    /// Display group (coloring only).
    pub group: u32,
    /// Where to place the node the first time it is simulated.
    pub initial_position: Option<(f32, f32)>,
}

/// Parameters for a node about to be added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewNode {
    pub group: u32,
    pub position: Option<(f32, f32)>,
}

impl Default for NewNode {
    fn default() -> Self {
        Self {
            group: DEFAULT_GROUP,
            position: None,
        }
    }
}

impl NewNode {
    /// A node in `group` with no initial position.
    pub fn in_group(group: u32) -> Self {
        Self {
            group,
            position: None,
        }
    }

    /// Set the initial position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Some((x, y));
        self
    }
}

/// Serialized node record with its adjacency list, as held by the editor.
///
/// Adjacency lists in this form may be asymmetric; the model symmetrizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: NodeId,
    #[serde(default = "default_group")]
    pub group: u32,
    #[serde(default)]
    pub neighbors: Vec<NodeId>,
}

fn default_group() -> u32 {
    DEFAULT_GROUP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new("alpha");
        assert_eq!(id.as_str(), "alpha");
        assert_eq!(format!("{}", id), "alpha");
    }

    #[test]
    fn test_node_id_ordering() {
        let a = NodeId::from("a");
        let b = NodeId::from("b");
        assert!(a < b);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| NodeId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_new_node_builder() {
        let node = NewNode::in_group(3).at(10.0, 20.0);
        assert_eq!(node.group, 3);
        assert_eq!(node.position, Some((10.0, 20.0)));
        assert_eq!(NewNode::default().group, DEFAULT_GROUP);
    }
}

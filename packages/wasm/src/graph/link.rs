//! Link type and topology change notifications.
//!
//! Links are derived from adjacency and never stored authoritatively.
//! Each undirected edge yields one link with `source < target`.

use serde::Serialize;

use super::node::NodeId;

/// Default link weight (rendering thickness only).
pub const DEFAULT_WEIGHT: f32 = 1.0;

/// An undirected connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    /// The endpoint that sorts first.
    pub source: NodeId,
    /// The endpoint that sorts second.
    pub target: NodeId,
    /// Rendering weight, not used by the link force.
    pub weight: f32,
}

impl Link {
    /// Whether this link touches `id`.
    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }
}

/// A change to the shape of the graph that requires re-seeding the simulation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyChange {
    NodeAdded(NodeId),
    NodeRemoved(NodeId),
    EdgeAdded(NodeId, NodeId),
    EdgeRemoved(NodeId, NodeId),
    /// The whole model was replaced.
    Reset,
}

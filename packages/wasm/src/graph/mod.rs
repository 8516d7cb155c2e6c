//! Graph model: node identities and undirected adjacency.
//!
//! Topology is stored in petgraph's StableGraph with undirected edges, so
//! the adjacency symmetry invariant holds structurally. Links handed to the
//! simulation and renderer are derived on demand, never stored.

mod link;
mod model;
mod node;

pub use link::{DEFAULT_WEIGHT, Link, TopologyChange};
pub use model::GraphModel;
pub use node::{DEFAULT_GROUP, NewNode, Node, NodeId, NodeSpec};

//! GraphModel - Authoritative node set and adjacency.
//!
//! The model stores topology in petgraph's StableGraph with undirected edges,
//! so adjacency is symmetric by construction: an edge between A and B is the
//! same object seen from either endpoint. Every mutation reports a
//! [`TopologyChange`] so the owner can re-seed the simulation explicitly.

use std::collections::HashMap;

use log::{debug, warn};
use petgraph::Undirected;
use petgraph::stable_graph::{NodeIndex, StableGraph};

use super::link::{DEFAULT_WEIGHT, Link, TopologyChange};
use super::node::{NewNode, Node, NodeId, NodeSpec};
use crate::error::{LayoutError, LayoutResult};

/// The graph model.
///
/// This struct manages:
/// - Graph topology via petgraph (undirected, no self-loops, no parallel edges)
/// - ID mapping between stable NodeIds and internal indices
/// - Index order, which is the order nodes are handed to the simulation
pub struct GraphModel {
    /// Nodes carry their metadata, edges carry the rendering weight.
    graph: StableGraph<Node, f32, Undirected>,

    /// Map from stable NodeId to petgraph NodeIndex
    index_of: HashMap<NodeId, NodeIndex>,
}

impl GraphModel {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            index_of: HashMap::new(),
        }
    }

    /// Create a model with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            index_of: HashMap::with_capacity(node_capacity),
        }
    }

    /// Build a model from adjacency records.
    ///
    /// One-sided neighbor entries still produce a single undirected edge.
    /// Self-references and unknown neighbor ids are skipped.
    pub fn from_adjacency(specs: &[NodeSpec]) -> LayoutResult<Self> {
        let mut model = Self::with_capacity(specs.len(), specs.len() * 2);

        for spec in specs {
            model.insert_node(
                spec.id.clone(),
                NewNode {
                    group: spec.group,
                    position: None,
                },
            )?;
        }

        for spec in specs {
            for neighbor in &spec.neighbors {
                if *neighbor == spec.id {
                    warn!("ignoring self-reference on node {}", spec.id);
                    continue;
                }
                if !model.contains(neighbor) {
                    warn!("ignoring unknown neighbor {} of node {}", neighbor, spec.id);
                    continue;
                }
                model.set_edge(&spec.id, neighbor, true);
            }
        }

        Ok(model)
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with a freshly generated identity.
    ///
    /// The node starts with no neighbors; it is never linked automatically.
    pub fn add_node(&mut self, initial: NewNode) -> NodeId {
        let mut id = NodeId::generate();
        while self.index_of.contains_key(&id) {
            id = NodeId::generate();
        }
        self.attach(id.clone(), initial);
        id
    }

    /// Add a node whose identity is chosen by the caller.
    pub fn insert_node(&mut self, id: NodeId, initial: NewNode) -> LayoutResult<TopologyChange> {
        if self.index_of.contains_key(&id) {
            return Err(LayoutError::DuplicateNode(id.0));
        }
        self.attach(id.clone(), initial);
        Ok(TopologyChange::NodeAdded(id))
    }

    fn attach(&mut self, id: NodeId, initial: NewNode) {
        let index = self.graph.add_node(Node {
            id: id.clone(),
            group: initial.group,
            initial_position: initial.position,
        });
        self.index_of.insert(id, index);
    }

    /// Remove a node together with every edge touching it.
    pub fn remove_node(&mut self, id: &NodeId) -> Option<TopologyChange> {
        let index = self.index_of.remove(id)?;
        self.graph.remove_node(index);
        Some(TopologyChange::NodeRemoved(id.clone()))
    }

    /// Whether the node exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.index_of.contains_key(id)
    }

    /// Look up a node.
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.index_of
            .get(id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    /// Iterate nodes in index order (insertion order until a removal frees a slot).
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph
            .node_indices()
            .filter_map(|index| self.graph.node_weight(index))
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Set a node's display group.
    pub fn set_group(&mut self, id: &NodeId, group: u32) -> bool {
        match self
            .index_of
            .get(id)
            .and_then(|&index| self.graph.node_weight_mut(index))
        {
            Some(node) => {
                node.group = group;
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Flip the edge between `a` and `b`.
    ///
    /// Self-toggles and unknown ids are no-ops and return `None`.
    pub fn toggle_edge(&mut self, a: &NodeId, b: &NodeId) -> Option<TopologyChange> {
        let present = self.has_edge(a, b);
        self.set_edge(a, b, !present)
    }

    /// Make the edge between `a` and `b` present or absent.
    ///
    /// Returns `None` when nothing changed.
    pub fn set_edge(&mut self, a: &NodeId, b: &NodeId, present: bool) -> Option<TopologyChange> {
        if a == b {
            debug!("ignoring self edge on {}", a);
            return None;
        }
        let (Some(&ia), Some(&ib)) = (self.index_of.get(a), self.index_of.get(b)) else {
            debug!("ignoring edge between unknown nodes {} and {}", a, b);
            return None;
        };

        match (self.graph.find_edge(ia, ib), present) {
            (Some(edge), false) => {
                self.graph.remove_edge(edge);
                Some(TopologyChange::EdgeRemoved(a.clone(), b.clone()))
            }
            (None, true) => {
                self.graph.add_edge(ia, ib, DEFAULT_WEIGHT);
                Some(TopologyChange::EdgeAdded(a.clone(), b.clone()))
            }
            _ => None,
        }
    }

    /// Set the rendering weight of an existing edge.
    pub fn set_edge_weight(&mut self, a: &NodeId, b: &NodeId, weight: f32) -> bool {
        let (Some(&ia), Some(&ib)) = (self.index_of.get(a), self.index_of.get(b)) else {
            return false;
        };
        match self
            .graph
            .find_edge(ia, ib)
            .and_then(|edge| self.graph.edge_weight_mut(edge))
        {
            Some(w) => {
                *w = weight;
                true
            }
            None => false,
        }
    }

    /// Whether `a` and `b` are adjacent.
    pub fn has_edge(&self, a: &NodeId, b: &NodeId) -> bool {
        match (self.index_of.get(a), self.index_of.get(b)) {
            (Some(&ia), Some(&ib)) => self.graph.find_edge(ia, ib).is_some(),
            _ => false,
        }
    }

    /// Get neighbors of a node.
    pub fn neighbors(&self, id: &NodeId) -> Vec<NodeId> {
        self.index_of
            .get(id)
            .map(|&index| {
                self.graph
                    .neighbors(index)
                    .filter_map(|n| self.graph.node_weight(n).map(|node| node.id.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of neighbors of a node (0 for unknown ids).
    pub fn degree(&self, id: &NodeId) -> usize {
        self.index_of
            .get(id)
            .map(|&index| self.graph.neighbors(index).count())
            .unwrap_or(0)
    }

    /// Get the number of undirected edges.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Derive the undirected link list from adjacency.
    ///
    /// Each node emits a link to every neighbor that sorts after it, so each
    /// edge appears exactly once. Output is sorted by `(source, target)`.
    pub fn links(&self) -> Vec<Link> {
        let mut links = Vec::with_capacity(self.graph.edge_count());

        for index in self.graph.node_indices() {
            let Some(node) = self.graph.node_weight(index) else {
                continue;
            };
            for neighbor in self.graph.neighbors(index) {
                let Some(other) = self.graph.node_weight(neighbor) else {
                    continue;
                };
                if node.id < other.id {
                    let weight = self
                        .graph
                        .find_edge(index, neighbor)
                        .and_then(|edge| self.graph.edge_weight(edge))
                        .copied()
                        .unwrap_or(DEFAULT_WEIGHT);
                    links.push(Link {
                        source: node.id.clone(),
                        target: other.id.clone(),
                        weight,
                    });
                }
            }
        }

        links.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        links
    }

    /// Export adjacency records, one per node in index order.
    pub fn to_adjacency(&self) -> Vec<NodeSpec> {
        self.nodes()
            .map(|node| {
                let mut neighbors = self.neighbors(&node.id);
                neighbors.sort();
                NodeSpec {
                    id: node.id.clone(),
                    group: node.group,
                    neighbors,
                }
            })
            .collect()
    }

    /// Clear all nodes and edges.
    pub fn clear(&mut self) -> TopologyChange {
        self.graph.clear();
        self.index_of.clear();
        TopologyChange::Reset
    }
}

impl Default for GraphModel {
    fn default() -> Self {
        Self::new()
    }
}

//! Read-only view of the layout handed to the renderer after each tick.

use serde::Serialize;

use super::simulation::{Simulation, SimulationState};
use crate::graph::{DEFAULT_GROUP, GraphModel, Link, NodeId};

/// One node as the renderer sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub group: u32,
    pub fixed: bool,
}

/// Nodes, links and cooling state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub links: Vec<Link>,
    pub alpha: f32,
    pub running: bool,
}

impl LayoutSnapshot {
    /// Capture the current positions of `simulation` with metadata from `graph`.
    pub fn capture(graph: &GraphModel, simulation: &Simulation) -> Self {
        let nodes = simulation
            .bodies()
            .iter()
            .map(|body| NodeSnapshot {
                id: body.id.clone(),
                x: body.x,
                y: body.y,
                group: graph.node(&body.id).map_or(DEFAULT_GROUP, |n| n.group),
                fixed: body.is_fixed(),
            })
            .collect();

        Self {
            nodes,
            links: graph.links(),
            alpha: simulation.alpha(),
            running: simulation.state() == SimulationState::Running,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&NodeSnapshot> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}

//! LayoutSession - the glue between the editor, the input source, the
//! simulation and the renderer.
//!
//! Every topology edit goes through the session, which applies it to the
//! graph model and then explicitly re-seeds the simulation with the returned
//! [`TopologyChange`]. Edits and drag events take `&mut self`, so they can
//! only happen between ticks.

use log::{debug, info};

use crate::error::LayoutResult;
use crate::graph::{GraphModel, NewNode, NodeId, NodeSpec, TopologyChange};
use crate::layout::{
    DragController, LayoutConfig, LayoutSnapshot, Simulation, SimulationState,
};

/// An interactive force-directed layout.
pub struct LayoutSession {
    graph: GraphModel,
    simulation: Simulation,
    drag: DragController,
}

impl LayoutSession {
    /// An empty session.
    pub fn new(config: LayoutConfig) -> LayoutResult<Self> {
        Self::with_graph(GraphModel::new(), config)
    }

    /// A session over adjacency records (symmetrized on load).
    pub fn from_adjacency(specs: &[NodeSpec], config: LayoutConfig) -> LayoutResult<Self> {
        Self::with_graph(GraphModel::from_adjacency(specs)?, config)
    }

    /// A session over an existing graph model.
    pub fn with_graph(graph: GraphModel, config: LayoutConfig) -> LayoutResult<Self> {
        config.validate()?;
        let simulation = Simulation::from_graph(&graph, config.simulation, config.forces)?;
        info!(
            "layout session created: {} nodes, {} links",
            graph.node_count(),
            graph.link_count()
        );
        Ok(Self {
            graph,
            simulation,
            drag: DragController::new(config.drag_alpha_target),
        })
    }

    // =========================================================================
    // Editor Surface
    // =========================================================================

    /// Add an unlinked node; the layout re-settles around it.
    pub fn add_node(&mut self, initial: NewNode) -> NodeId {
        let id = self.graph.add_node(initial);
        self.topology_changed(TopologyChange::NodeAdded(id.clone()));
        id
    }

    /// Remove a node and its links. Returns false for unknown ids.
    pub fn remove_node(&mut self, id: &NodeId) -> bool {
        match self.graph.remove_node(id) {
            Some(change) => {
                self.topology_changed(change);
                true
            }
            None => false,
        }
    }

    /// Flip the edge between `a` and `b`. Returns false when nothing changed.
    pub fn toggle_edge(&mut self, a: &NodeId, b: &NodeId) -> bool {
        match self.graph.toggle_edge(a, b) {
            Some(change) => {
                self.topology_changed(change);
                true
            }
            None => false,
        }
    }

    /// Replace the whole graph with adjacency records.
    pub fn load_adjacency(&mut self, specs: &[NodeSpec]) -> LayoutResult<()> {
        self.graph = GraphModel::from_adjacency(specs)?;
        self.topology_changed(TopologyChange::Reset);
        Ok(())
    }

    /// Change a node's display group. Does not affect the layout.
    pub fn set_group(&mut self, id: &NodeId, group: u32) -> bool {
        self.graph.set_group(id, group)
    }

    /// Re-seed the simulation after the graph changed shape.
    fn topology_changed(&mut self, change: TopologyChange) {
        debug!("topology changed: {:?}", change);
        self.simulation.reseed(&self.graph);
        self.drag.retain_existing(&mut self.simulation);
    }

    // =========================================================================
    // Input Source
    // =========================================================================

    pub fn drag_start(&mut self, id: &NodeId, x: f32, y: f32) -> bool {
        self.drag.drag_start(&mut self.simulation, id, x, y)
    }

    pub fn drag_move(&mut self, id: &NodeId, x: f32, y: f32) -> bool {
        self.drag.drag_move(&mut self.simulation, id, x, y)
    }

    pub fn drag_end(&mut self, id: &NodeId) -> bool {
        self.drag.drag_end(&mut self.simulation, id)
    }

    /// The node under the pointer, if any lies within `radius`.
    pub fn node_at(&self, x: f32, y: f32, radius: f32) -> Option<NodeId> {
        self.simulation.find(x, y, radius).cloned()
    }

    // =========================================================================
    // Clock
    // =========================================================================

    /// Advance one frame. Returns whether another frame should be requested.
    pub fn tick(&mut self) -> bool {
        self.simulation.tick() == SimulationState::Running
    }

    /// Reheat the layout.
    pub fn restart(&mut self) {
        self.simulation.restart();
    }

    /// Stop ticking for good; later ticks do nothing.
    pub fn dispose(&mut self) {
        self.simulation.stop();
    }

    pub fn is_disposed(&self) -> bool {
        self.simulation.state() == SimulationState::Stopped
    }

    // =========================================================================
    // Render Sink
    // =========================================================================

    pub fn snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot::capture(&self.graph, &self.simulation)
    }

    /// Positions as `[x0, y0, x1, y1, ...]` in body order.
    pub fn positions(&self) -> Vec<f32> {
        self.simulation
            .bodies()
            .iter()
            .flat_map(|body| [body.x, body.y])
            .collect()
    }

    pub fn graph(&self) -> &GraphModel {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }
}

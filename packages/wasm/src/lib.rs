//! Force Layout - WASM Module
//!
//! Interactive force-directed layout for small undirected graphs. The graph
//! is edited from JavaScript, the simulation is ticked once per animation
//! frame, and positions are read back after every tick for rendering.
//!
//! # Architecture
//!
//! - `graph`: the editable undirected graph (petgraph StableGraph)
//! - `layout`: bodies, forces, the integrator and drag pinning
//! - `spatial`: R-tree spatial indexing for hit testing and collision
//! - `session`: ties the graph, simulation and drag controller together
//! - `error`: the crate error type

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;
pub mod session;
pub mod spatial;

use error::LayoutError;
use graph::{NewNode, NodeId, NodeSpec};
use layout::LayoutConfig;
use session::LayoutSession;

/// Initialize the WASM module: panic hook and console logging.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        web_sys::console::warn_1(&"force-layout: logger already initialized".into());
    }
}

/// Main entry point for the layout engine.
///
/// Wraps a [`LayoutSession`] and exposes it to JavaScript. The host drives
/// it from `requestAnimationFrame`: call `tick()`, draw `positions()` or
/// `snapshot()`, and request another frame while `tick()` returns true.
#[wasm_bindgen]
pub struct ForceLayoutWasm {
    session: LayoutSession,
}

#[wasm_bindgen]
impl ForceLayoutWasm {
    /// Create an empty layout.
    ///
    /// `config` is an optional `LayoutConfig` object; `undefined` or `null`
    /// selects the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ForceLayoutWasm, JsError> {
        let config = if config.is_undefined() || config.is_null() {
            LayoutConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(LayoutError::from)?
        };
        Ok(Self {
            session: LayoutSession::new(config)?,
        })
    }

    /// Replace the graph with an array of `{ id, group, neighbors }` records.
    #[wasm_bindgen(js_name = loadAdjacency)]
    pub fn load_adjacency(&mut self, records: JsValue) -> Result<(), JsError> {
        let specs: Vec<NodeSpec> =
            serde_wasm_bindgen::from_value(records).map_err(LayoutError::from)?;
        self.session.load_adjacency(&specs)?;
        Ok(())
    }

    /// Export the graph as adjacency records.
    #[wasm_bindgen(js_name = toAdjacency)]
    pub fn to_adjacency(&self) -> Result<JsValue, JsError> {
        let specs = self.session.graph().to_adjacency();
        Ok(serde_wasm_bindgen::to_value(&specs).map_err(LayoutError::from)?)
    }

    // =========================================================================
    // Graph Editing
    // =========================================================================

    /// Add an unlinked node. Returns its generated id.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, group: u32) -> String {
        self.session.add_node(NewNode::in_group(group)).0
    }

    /// Add an unlinked node starting at `(x, y)`. Returns its generated id.
    #[wasm_bindgen(js_name = addNodeAt)]
    pub fn add_node_at(&mut self, group: u32, x: f32, y: f32) -> String {
        self.session.add_node(NewNode::in_group(group).at(x, y)).0
    }

    /// Remove a node and its links.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, id: &str) -> bool {
        self.session.remove_node(&NodeId::from(id))
    }

    /// Link two unlinked nodes, or unlink two linked ones.
    ///
    /// Returns false if either id is unknown or both are the same.
    #[wasm_bindgen(js_name = toggleEdge)]
    pub fn toggle_edge(&mut self, a: &str, b: &str) -> bool {
        self.session.toggle_edge(&NodeId::from(a), &NodeId::from(b))
    }

    #[wasm_bindgen(js_name = setGroup)]
    pub fn set_group(&mut self, id: &str, group: u32) -> bool {
        self.session.set_group(&NodeId::from(id), group)
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.session.graph().node_count() as u32
    }

    #[wasm_bindgen(js_name = linkCount)]
    pub fn link_count(&self) -> u32 {
        self.session.graph().link_count() as u32
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance one frame. Returns true while the layout is still moving.
    pub fn tick(&mut self) -> bool {
        self.session.tick()
    }

    /// Reheat the layout.
    pub fn restart(&mut self) {
        self.session.restart();
    }

    pub fn alpha(&self) -> f32 {
        self.session.simulation().alpha()
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.session.simulation().is_running()
    }

    /// Stop the layout for good. Further ticks are no-ops.
    pub fn dispose(&mut self) {
        self.session.dispose();
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Nodes, links and cooling state as a plain JS object.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.session.snapshot()).map_err(LayoutError::from)?)
    }

    /// Positions as [x0, y0, x1, y1, ...] in the order of `nodeIds()`.
    pub fn positions(&self) -> Float32Array {
        Float32Array::from(&self.session.positions()[..])
    }

    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<String> {
        self.session
            .simulation()
            .bodies()
            .iter()
            .map(|body| body.id.to_string())
            .collect()
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    #[wasm_bindgen(js_name = dragStart)]
    pub fn drag_start(&mut self, id: &str, x: f32, y: f32) -> bool {
        self.session.drag_start(&NodeId::from(id), x, y)
    }

    #[wasm_bindgen(js_name = dragMove)]
    pub fn drag_move(&mut self, id: &str, x: f32, y: f32) -> bool {
        self.session.drag_move(&NodeId::from(id), x, y)
    }

    #[wasm_bindgen(js_name = dragEnd)]
    pub fn drag_end(&mut self, id: &str) -> bool {
        self.session.drag_end(&NodeId::from(id))
    }

    /// The node under the pointer, if one lies within `radius`.
    #[wasm_bindgen(js_name = nodeAt)]
    pub fn node_at(&self, x: f32, y: f32, radius: f32) -> Option<String> {
        self.session.node_at(x, y, radius).map(|id| id.0)
    }
}

#[cfg(test)]
mod integration_tests {
    use std::collections::HashMap;

    use super::*;
    use graph::Link;

    fn cycle_specs() -> Vec<NodeSpec> {
        ["A", "B", "C", "D", "E"]
            .iter()
            .zip(["B", "C", "D", "E", "A"])
            .map(|(&id, next)| NodeSpec {
                id: NodeId::from(id),
                group: 1,
                neighbors: vec![NodeId::from(next)],
            })
            .collect()
    }

    fn distance(session: &LayoutSession, a: &str, b: &str) -> f32 {
        let a = session.simulation().body(&NodeId::from(a)).unwrap();
        let b = session.simulation().body(&NodeId::from(b)).unwrap();
        ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
    }

    /// Five nodes in a ring settle with every node clear of its neighbors.
    #[test]
    fn test_five_cycle_settles() {
        let mut session = LayoutSession::from_adjacency(&cycle_specs(), LayoutConfig::default())
            .unwrap();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.nodes.len(), 5);
        assert_eq!(snapshot.links.len(), 5);

        let mut ticks = 0;
        while session.tick() {
            ticks += 1;
            assert!(ticks <= 400, "still running after {} ticks", ticks);
        }

        let ids = ["A", "B", "C", "D", "E"];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                let d = distance(&session, a, b);
                assert!(d.is_finite());
                assert!(d >= 95.0, "{}-{} only {} apart", a, b, d);
            }
        }
    }

    /// Adding a chord yields a sixth link and raises both endpoints to degree 3.
    #[test]
    fn test_chord_toggle() {
        let mut session = LayoutSession::from_adjacency(&cycle_specs(), LayoutConfig::default())
            .unwrap();
        while session.tick() {}

        let (a, c) = (NodeId::from("A"), NodeId::from("C"));
        assert!(session.toggle_edge(&a, &c));

        let links = session.snapshot().links;
        assert_eq!(links.len(), 6);
        assert!(links.contains(&Link {
            source: a.clone(),
            target: c.clone(),
            weight: graph::DEFAULT_WEIGHT,
        }));
        assert_eq!(session.graph().degree(&a), 3);
        assert_eq!(session.graph().degree(&c), 3);
        assert!(session.simulation().is_running());

        // Toggling again restores the ring
        assert!(session.toggle_edge(&c, &a));
        assert_eq!(session.snapshot().links.len(), 5);
    }

    /// A dragged node sits exactly under the pointer and moves again on release.
    #[test]
    fn test_drag_and_release() {
        let mut session = LayoutSession::from_adjacency(&cycle_specs(), LayoutConfig::default())
            .unwrap();
        while session.tick() {}
        let a = NodeId::from("A");

        assert!(session.drag_start(&a, 400.0, 300.0));
        assert!(session.simulation().is_running());
        for _ in 0..20 {
            session.drag_move(&a, 400.0, 300.0);
            assert!(session.tick());
            let node = session.snapshot().node(&a).cloned().unwrap();
            assert_eq!((node.x, node.y), (400.0, 300.0));
            assert!(node.fixed);
        }

        assert!(session.drag_end(&a));
        session.tick();
        let node = session.snapshot().node(&a).cloned().unwrap();
        assert!(!node.fixed);
        assert_ne!((node.x, node.y), (400.0, 300.0));

        // Without the drag holding alpha up, the layout cools off again
        let mut ticks = 0;
        while session.tick() {
            ticks += 1;
            assert!(ticks <= 1000);
        }
    }

    /// Adding a node keeps everyone else where they were.
    #[test]
    fn test_add_node_preserves_positions() {
        let mut session = LayoutSession::from_adjacency(&cycle_specs(), LayoutConfig::default())
            .unwrap();
        for _ in 0..100 {
            session.tick();
        }
        let before: HashMap<NodeId, (f32, f32)> = session
            .snapshot()
            .nodes
            .into_iter()
            .map(|n| (n.id, (n.x, n.y)))
            .collect();

        let added = session.add_node(NewNode::in_group(3));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.nodes.len(), 6);
        assert_eq!(snapshot.links.len(), 5);
        for (id, pos) in &before {
            let node = snapshot.node(id).unwrap();
            assert_eq!((node.x, node.y), *pos);
        }
        let node = snapshot.node(&added).unwrap();
        assert!(node.x.is_finite() && node.y.is_finite());
        assert_eq!(node.group, 3);
    }

    /// Removing a node drops its links and its body.
    #[test]
    fn test_remove_node() {
        let mut session = LayoutSession::from_adjacency(&cycle_specs(), LayoutConfig::default())
            .unwrap();
        assert!(session.remove_node(&NodeId::from("C")));
        assert!(!session.remove_node(&NodeId::from("C")));

        let snapshot = session.snapshot();
        assert_eq!(snapshot.nodes.len(), 4);
        assert_eq!(snapshot.links.len(), 3);
        assert!(snapshot.links.iter().all(|l| !l.touches(&NodeId::from("C"))));
    }

    /// Hit testing finds the node under the pointer.
    #[test]
    fn test_node_at() {
        let mut session = LayoutSession::from_adjacency(&cycle_specs(), LayoutConfig::default())
            .unwrap();
        while session.tick() {}

        let body = session.simulation().body(&NodeId::from("D")).unwrap();
        let (x, y) = (body.x + 2.0, body.y - 2.0);
        assert_eq!(session.node_at(x, y, 10.0), Some(NodeId::from("D")));
        assert_eq!(session.node_at(1.0e6, 1.0e6, 10.0), None);
    }

    /// Asymmetric adjacency input loads as a symmetric graph.
    #[test]
    fn test_asymmetric_input_is_symmetrized() {
        let specs = vec![
            NodeSpec { id: NodeId::from("a"), group: 1, neighbors: vec![NodeId::from("b")] },
            NodeSpec { id: NodeId::from("b"), group: 2, neighbors: vec![] },
        ];
        let session = LayoutSession::from_adjacency(&specs, LayoutConfig::default()).unwrap();

        let exported = session.graph().to_adjacency();
        assert_eq!(exported[0].neighbors, vec![NodeId::from("b")]);
        assert_eq!(exported[1].neighbors, vec![NodeId::from("a")]);
    }
}

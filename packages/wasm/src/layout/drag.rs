//! Drag/pin controller.
//!
//! Translates pointer events into pinning of simulation bodies:
//!
//! - `drag_start`: pin the body at the pointer, raise `alpha_target` and wake
//!   the simulation so the layout re-settles around the dragged node.
//! - `drag_move`: move the pin.
//! - `drag_end`: clear the pin at once; the body rejoins the simulation on
//!   the next tick. When no drags remain, `alpha_target` drops back to 0.
//!
//! Events for unknown or non-dragged ids are ignored.

use std::collections::HashSet;

use log::debug;

use super::simulation::Simulation;
use crate::graph::NodeId;

/// Tracks which nodes are being dragged.
#[derive(Debug)]
pub struct DragController {
    hot_alpha_target: f32,
    active: HashSet<NodeId>,
}

impl DragController {
    /// A controller that holds `alpha_target` at `hot_alpha_target` while dragging.
    pub fn new(hot_alpha_target: f32) -> Self {
        Self {
            hot_alpha_target,
            active: HashSet::new(),
        }
    }

    pub fn drag_start(&mut self, simulation: &mut Simulation, id: &NodeId, x: f32, y: f32) -> bool {
        let Some(body) = simulation.body_mut(id) else {
            debug!("drag start on unknown node {}", id);
            return false;
        };
        body.pin(x, y);
        self.active.insert(id.clone());

        simulation.set_alpha_target(self.hot_alpha_target);
        simulation.wake();
        true
    }

    pub fn drag_move(&mut self, simulation: &mut Simulation, id: &NodeId, x: f32, y: f32) -> bool {
        if !self.active.contains(id) {
            debug!("drag move on node {} which is not being dragged", id);
            return false;
        }
        match simulation.body_mut(id) {
            Some(body) => {
                body.pin(x, y);
                true
            }
            None => {
                debug!("drag move on vanished node {}", id);
                self.forget(simulation, id);
                false
            }
        }
    }

    pub fn drag_end(&mut self, simulation: &mut Simulation, id: &NodeId) -> bool {
        if !self.active.contains(id) {
            debug!("drag end on node {} which is not being dragged", id);
            return false;
        }
        if let Some(body) = simulation.body_mut(id) {
            body.release();
        }
        self.forget(simulation, id);
        true
    }

    /// Drop drags whose bodies no longer exist, e.g. after a node removal.
    pub fn retain_existing(&mut self, simulation: &mut Simulation) {
        let gone: Vec<NodeId> = self
            .active
            .iter()
            .filter(|id| simulation.body(id).is_none())
            .cloned()
            .collect();
        for id in gone {
            self.forget(simulation, &id);
        }
    }

    fn forget(&mut self, simulation: &mut Simulation, id: &NodeId) {
        self.active.remove(id);
        if self.active.is_empty() {
            simulation.set_alpha_target(0.0);
        }
    }

    pub fn is_dragging(&self, id: &NodeId) -> bool {
        self.active.contains(id)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphModel, NewNode};
    use crate::layout::body::PinState;
    use crate::layout::config::SimulationConfig;
    use crate::layout::forces::ForceRegistry;
    use crate::layout::simulation::SimulationState;

    fn setup() -> (GraphModel, Simulation) {
        let mut model = GraphModel::new();
        for id in ["A", "B", "C"] {
            model.insert_node(NodeId::from(id), NewNode::default()).unwrap();
        }
        model.toggle_edge(&NodeId::from("A"), &NodeId::from("B"));
        model.toggle_edge(&NodeId::from("B"), &NodeId::from("C"));
        let sim = Simulation::from_graph(&model, SimulationConfig::default(), ForceRegistry::default())
            .unwrap();
        (model, sim)
    }

    #[test]
    fn test_drag_start_wakes_idle_simulation() {
        let (_, mut sim) = setup();
        sim.run_to_convergence(1000);
        assert_eq!(sim.state(), SimulationState::Idle);

        let mut drag = DragController::default();
        assert!(drag.drag_start(&mut sim, &NodeId::from("A"), 10.0, 20.0));

        assert_eq!(sim.state(), SimulationState::Running);
        assert_eq!(sim.alpha_target(), 0.3);
        assert!(drag.is_dragging(&NodeId::from("A")));
        let body = sim.body(&NodeId::from("A")).unwrap();
        assert_eq!((body.fx, body.fy), (Some(10.0), Some(20.0)));
        assert_eq!(body.pin, PinState::Dragging);
    }

    #[test]
    fn test_drag_follows_pointer() {
        let (_, mut sim) = setup();
        let mut drag = DragController::default();
        let a = NodeId::from("A");

        drag.drag_start(&mut sim, &a, 0.0, 0.0);
        for step in 1..=10 {
            let (x, y) = (step as f32 * 40.0, step as f32 * 30.0);
            assert!(drag.drag_move(&mut sim, &a, x, y));
            sim.tick();
            let body = sim.body(&a).unwrap();
            assert_eq!((body.x, body.y), (x, y));
        }
    }

    #[test]
    fn test_drag_release_scenario() {
        let (_, mut sim) = setup();
        let mut drag = DragController::default();
        let a = NodeId::from("A");

        drag.drag_start(&mut sim, &a, 400.0, 300.0);
        drag.drag_move(&mut sim, &a, 400.0, 300.0);
        sim.tick();
        assert_eq!(
            (sim.body(&a).unwrap().x, sim.body(&a).unwrap().y),
            (400.0, 300.0)
        );

        assert!(drag.drag_end(&mut sim, &a));
        let body = sim.body(&a).unwrap();
        assert_eq!((body.fx, body.fy), (None, None));
        assert_eq!(body.pin, PinState::Released);
        assert_eq!(sim.alpha_target(), 0.0);

        sim.tick();
        let body = sim.body(&a).unwrap();
        assert_eq!(body.pin, PinState::Free);
        assert_ne!((body.x, body.y), (400.0, 300.0));
    }

    #[test]
    fn test_target_held_until_last_drag_ends() {
        let (_, mut sim) = setup();
        let mut drag = DragController::default();
        let (a, b) = (NodeId::from("A"), NodeId::from("B"));

        drag.drag_start(&mut sim, &a, 0.0, 0.0);
        drag.drag_start(&mut sim, &b, 50.0, 0.0);
        assert_eq!(drag.active_count(), 2);

        drag.drag_end(&mut sim, &a);
        assert_eq!(sim.alpha_target(), 0.3);
        drag.drag_end(&mut sim, &b);
        assert_eq!(sim.alpha_target(), 0.0);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let (_, mut sim) = setup();
        let mut drag = DragController::default();
        let ghost = NodeId::from("ghost");

        assert!(!drag.drag_start(&mut sim, &ghost, 0.0, 0.0));
        assert!(!drag.drag_move(&mut sim, &ghost, 0.0, 0.0));
        assert!(!drag.drag_end(&mut sim, &ghost));
        // Moving a node that was never picked up does nothing either
        assert!(!drag.drag_move(&mut sim, &NodeId::from("A"), 5.0, 5.0));
        assert!(sim.body(&NodeId::from("A")).unwrap().fx.is_none());
        assert_eq!(drag.active_count(), 0);
        assert_eq!(sim.alpha_target(), 0.0);
    }

    #[test]
    fn test_retain_existing_after_removal() {
        let (mut model, mut sim) = setup();
        let mut drag = DragController::default();
        let a = NodeId::from("A");
        drag.drag_start(&mut sim, &a, 0.0, 0.0);

        model.remove_node(&a);
        sim.reseed(&model);
        drag.retain_existing(&mut sim);

        assert_eq!(drag.active_count(), 0);
        assert_eq!(sim.alpha_target(), 0.0);
    }
}

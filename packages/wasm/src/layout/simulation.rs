//! Integrator and tick loop.
//!
//! The simulation owns one [`Body`] per graph node and the slot-indexed link
//! list. Each tick applies the registered forces, integrates velocities into
//! positions and cools `alpha` toward `alpha_target`. Once alpha drops below
//! `alpha_min` the simulation goes idle and stops asking for frames.
//!
//! # State machine
//!
//! - `Idle`: cooled down; ticks are no-ops until `restart` or `wake`.
//! - `Running`: the caller should schedule another tick.
//! - `Stopped`: disposed; nothing revives it.

use std::collections::HashMap;

use log::{debug, info};
use serde::Serialize;

use super::body::{Body, Jiggle, PinState, SimLink, seed_position};
use super::config::SimulationConfig;
use super::forces::ForceRegistry;
use crate::error::LayoutResult;
use crate::graph::{GraphModel, NodeId};
use crate::spatial::SpatialIndex;

/// Lifecycle state of the tick loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SimulationState {
    Idle,
    Running,
    Stopped,
}

/// Advance bodies by one step at the given alpha.
///
/// Forces run in registry order, then every body is integrated: free bodies
/// lose `velocity_decay` of their velocity and move by the remainder; fixed
/// bodies are clamped to `(fx, fy)` with zero velocity. Bodies released since
/// the previous step become free.
pub fn step(
    bodies: &mut [Body],
    links: &[SimLink],
    alpha: f32,
    forces: &ForceRegistry,
    config: &SimulationConfig,
    jiggle: &mut Jiggle,
) {
    forces.apply(bodies, links, alpha, jiggle);

    let friction = 1.0 - config.velocity_decay;
    for body in bodies.iter_mut() {
        match body.fx {
            Some(fx) => {
                body.x = fx;
                body.vx = 0.0;
            }
            None => {
                body.vx *= friction;
                body.x += body.vx;
            }
        }
        match body.fy {
            Some(fy) => {
                body.y = fy;
                body.vy = 0.0;
            }
            None => {
                body.vy *= friction;
                body.y += body.vy;
            }
        }
        if body.pin == PinState::Released {
            body.pin = PinState::Free;
        }
    }
}

/// The force-directed layout simulation.
pub struct Simulation {
    bodies: Vec<Body>,
    links: Vec<SimLink>,
    slot_of: HashMap<NodeId, usize>,
    config: SimulationConfig,
    forces: ForceRegistry,
    alpha: f32,
    state: SimulationState,
    jiggle: Jiggle,
    ticks: u64,
}

impl Simulation {
    /// Create an empty simulation. It starts idle.
    pub fn new(config: SimulationConfig, forces: ForceRegistry) -> LayoutResult<Self> {
        config.validate()?;
        forces.validate()?;
        Ok(Self {
            bodies: Vec::new(),
            links: Vec::new(),
            slot_of: HashMap::new(),
            jiggle: Jiggle::new(config.seed),
            alpha: config.restart_alpha,
            config,
            forces,
            state: SimulationState::Idle,
            ticks: 0,
        })
    }

    /// Create a simulation seeded from a graph and start it.
    pub fn from_graph(
        graph: &GraphModel,
        config: SimulationConfig,
        forces: ForceRegistry,
    ) -> LayoutResult<Self> {
        let mut simulation = Self::new(config, forces)?;
        simulation.reseed(graph);
        Ok(simulation)
    }

    // =========================================================================
    // Topology
    // =========================================================================

    /// Rebuild bodies and links after the graph changed shape.
    ///
    /// Nodes that persist keep their position, radius and pin; their
    /// velocity is discarded. New nodes start at their initial position if
    /// they have one, otherwise on a spiral around the center. The
    /// simulation then restarts.
    pub fn reseed(&mut self, graph: &GraphModel) {
        let mut previous: HashMap<NodeId, Body> = self
            .bodies
            .drain(..)
            .map(|body| (body.id.clone(), body))
            .collect();
        let radius = self.forces.body_radius();
        let (cx, cy) = self.forces.origin();

        self.slot_of.clear();
        for (slot, node) in graph.nodes().enumerate() {
            let body = match previous.remove(&node.id) {
                Some(mut body) => {
                    body.vx = 0.0;
                    body.vy = 0.0;
                    body
                }
                None => {
                    let (x, y) = node
                        .initial_position
                        .unwrap_or_else(|| seed_position(slot, cx, cy));
                    Body::new(node.id.clone(), x, y, radius)
                }
            };
            self.slot_of.insert(node.id.clone(), slot);
            self.bodies.push(body);
        }

        self.links = graph
            .links()
            .iter()
            .filter_map(|link| {
                Some(SimLink {
                    source: *self.slot_of.get(&link.source)?,
                    target: *self.slot_of.get(&link.target)?,
                })
            })
            .collect();

        debug!(
            "reseeded simulation: {} bodies, {} links, {} dropped",
            self.bodies.len(),
            self.links.len(),
            previous.len()
        );
        self.restart();
    }

    // =========================================================================
    // Tick Loop
    // =========================================================================

    /// Reheat: set alpha to the restart value (or the target, if higher) and
    /// resume ticking.
    pub fn restart(&mut self) {
        if self.state == SimulationState::Stopped {
            return;
        }
        self.alpha = self.config.restart_alpha.max(self.config.alpha_target);
        self.state = SimulationState::Running;
    }

    /// Resume ticking without touching alpha.
    ///
    /// Used by interaction: with a raised target, alpha climbs back up on its
    /// own instead of jumping to the restart value.
    pub fn wake(&mut self) {
        if self.state == SimulationState::Idle {
            self.state = SimulationState::Running;
        }
    }

    /// Dispose: no further ticks, restarts are refused.
    pub fn stop(&mut self) {
        if self.state != SimulationState::Stopped {
            info!("simulation stopped after {} ticks", self.ticks);
        }
        self.state = SimulationState::Stopped;
    }

    /// Advance one tick if running. Returns the state after the tick.
    pub fn tick(&mut self) -> SimulationState {
        if self.state != SimulationState::Running {
            return self.state;
        }

        step(
            &mut self.bodies,
            &self.links,
            self.alpha,
            &self.forces,
            &self.config,
            &mut self.jiggle,
        );
        self.ticks += 1;

        self.alpha += (self.config.alpha_target - self.alpha) * self.config.alpha_decay;
        if self.alpha < self.config.alpha_min {
            debug!("simulation converged after {} ticks", self.ticks);
            self.state = SimulationState::Idle;
        }
        self.state
    }

    /// Tick until idle or `max_ticks` have run. Returns the ticks taken.
    pub fn run_to_convergence(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.state == SimulationState::Running {
            self.tick();
            taken += 1;
        }
        taken
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Set alpha directly, clamped to [0, 1].
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn alpha_target(&self) -> f32 {
        self.config.alpha_target
    }

    /// Set the resting alpha, clamped to [0, 1].
    pub fn set_alpha_target(&mut self, target: f32) {
        self.config.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SimulationState::Running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn forces(&self) -> &ForceRegistry {
        &self.forces
    }

    /// Mutable access to the force registry; takes effect on the next tick.
    pub fn forces_mut(&mut self) -> &mut ForceRegistry {
        &mut self.forces
    }

    // =========================================================================
    // Body Access
    // =========================================================================

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn body(&self, id: &NodeId) -> Option<&Body> {
        self.slot_of.get(id).map(|&slot| &self.bodies[slot])
    }

    pub fn body_mut(&mut self, id: &NodeId) -> Option<&mut Body> {
        self.slot_of.get(id).map(|&slot| &mut self.bodies[slot])
    }

    /// Set a body's collision radius. Returns false for unknown ids.
    pub fn set_radius(&mut self, id: &NodeId, radius: f32) -> bool {
        match self.body_mut(id) {
            Some(body) if radius.is_finite() && radius > 0.0 => {
                body.radius = radius;
                true
            }
            _ => false,
        }
    }

    /// The body nearest `(x, y)` within `radius`, for pointer hit testing.
    pub fn find(&self, x: f32, y: f32, radius: f32) -> Option<&NodeId> {
        let index = SpatialIndex::from_positions(self.bodies.iter().map(|b| (b.x, b.y)));
        index
            .nearest_within(x, y, radius)
            .map(|slot| &self.bodies[slot].id)
    }
}

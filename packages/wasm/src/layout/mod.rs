//! Force-directed layout engine.
//!
//! - `body`: per-node kinematic state and deterministic jiggle
//! - `forces`: the force registry (link, charge, collide, center, axis)
//! - `simulation`: the integrator, tick loop and alpha cooling schedule
//! - `drag`: pointer-driven pinning
//! - `config`: serializable configuration with validation
//! - `snapshot`: read-only per-tick view for the renderer

pub mod body;
pub mod config;
pub mod drag;
pub mod forces;
pub mod simulation;
pub mod snapshot;

pub use body::{Body, PinState, SimLink};
pub use config::{LayoutConfig, SimulationConfig};
pub use drag::DragController;
pub use forces::ForceRegistry;
pub use simulation::{Simulation, SimulationState, step};
pub use snapshot::{LayoutSnapshot, NodeSnapshot};

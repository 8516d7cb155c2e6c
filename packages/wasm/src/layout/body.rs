//! Per-node kinematic state.
//!
//! A `Body` is the simulation's view of a graph node: position, velocity,
//! optional fixed position and collision radius. Bodies live in a flat slice
//! indexed by slot; links refer to bodies by slot.

use std::f32::consts::PI;

use serde::Serialize;

use crate::graph::NodeId;

/// Spacing of the initial phyllotaxis arrangement.
const INITIAL_RADIUS: f32 = 10.0;

/// Smallest jiggle magnitude.
const MIN_JIGGLE: f32 = 1e-7;

/// Squared distances below this are treated as coincident.
pub const MIN_SEPARATION2: f32 = 1e-24;

/// Pinning state of a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PinState {
    /// Subject to the simulation.
    #[default]
    Free,
    /// Fixed to a position that follows the pointer.
    Dragging,
    /// Just released; becomes `Free` after the next tick.
    Released,
}

/// Kinematic state for one simulated node.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: NodeId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Fixed x, present only while pinned.
    pub fx: Option<f32>,
    /// Fixed y, present only while pinned.
    pub fy: Option<f32>,
    /// Collision radius.
    pub radius: f32,
    pub pin: PinState,
}

impl Body {
    /// A body at rest at `(x, y)`.
    pub fn new(id: NodeId, x: f32, y: f32, radius: f32) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            radius,
            pin: PinState::Free,
        }
    }

    /// Whether either coordinate is fixed.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    /// Fix the body at `(x, y)` for dragging.
    pub fn pin(&mut self, x: f32, y: f32) {
        self.fx = Some(x);
        self.fy = Some(y);
        self.pin = PinState::Dragging;
    }

    /// Clear the fixed position; the body rejoins the simulation next tick.
    pub fn release(&mut self) {
        self.fx = None;
        self.fy = None;
        self.pin = PinState::Released;
    }
}

/// A link between two bodies, by slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
}

/// Initial position for the body in `slot`, on a phyllotaxis spiral around
/// `(cx, cy)`. Neighboring slots never coincide.
pub fn seed_position(slot: usize, cx: f32, cy: f32) -> (f32, f32) {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + slot as f32).sqrt();
    let angle = slot as f32 * golden_angle;
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Deterministic source of tiny offsets for breaking exact coincidences.
///
/// A linear congruential generator, so layouts are reproducible run to run.
#[derive(Debug, Clone)]
pub struct Jiggle {
    state: u32,
}

impl Jiggle {
    const A: u32 = 1_664_525;
    const C: u32 = 1_013_904_223;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next uniform value in [0, 1).
    fn next_unit(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(Self::A).wrapping_add(Self::C);
        (self.state >> 8) as f32 / (1u32 << 24) as f32
    }

    /// A random offset with magnitude in [1e-7, 5e-7].
    pub fn sample(&mut self) -> f32 {
        let value = (self.next_unit() - 0.5) * 1e-6;
        if value.abs() < MIN_JIGGLE {
            MIN_JIGGLE.copysign(value)
        } else {
            value
        }
    }

    /// Make the offset `(x, y)` safe to normalize.
    ///
    /// Offsets whose squared length is below [`MIN_SEPARATION2`] (including
    /// ones that underflow to zero) are replaced by a random offset on both
    /// axes; otherwise a zero axis alone is jiggled. Returns the offset and
    /// its squared length, which is never below `MIN_SEPARATION2`.
    pub fn offset(&mut self, mut x: f32, mut y: f32) -> (f32, f32, f32) {
        if x * x + y * y < MIN_SEPARATION2 {
            x = self.sample();
            y = self.sample();
        } else {
            if x == 0.0 {
                x = self.sample();
            }
            if y == 0.0 {
                y = self.sample();
            }
        }
        (x, y, x * x + y * y)
    }
}

impl Default for Jiggle {
    fn default() -> Self {
        Self::new(1)
    }
}

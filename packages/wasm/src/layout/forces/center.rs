//! Centering forces.
//!
//! `CenterForce` translates the whole layout so its centroid moves toward a
//! fixed point; relative positions are untouched. `AxisForce` pulls each body
//! independently toward a target coordinate on one axis.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::layout::body::Body;

/// Centroid-shifting force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CenterForce {
    pub x: f32,
    pub y: f32,
    /// Fraction of the centroid offset removed per tick (default: 1).
    pub strength: f32,
}

impl Default for CenterForce {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            strength: 1.0,
        }
    }
}

impl CenterForce {
    /// Center on `(x, y)` with the default strength.
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> LayoutResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(LayoutError::invalid("center", "target must be finite"));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(LayoutError::invalid(
                "center.strength",
                format!("must be in [0, 1], got {}", self.strength),
            ));
        }
        Ok(())
    }

    /// Shift all bodies toward the target.
    pub fn apply(&self, bodies: &mut [Body]) {
        if bodies.is_empty() {
            return;
        }
        let n = bodies.len() as f32;
        let (sx, sy) = bodies
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), b| (sx + b.x, sy + b.y));
        let dx = (sx / n - self.x) * self.strength;
        let dy = (sy / n - self.y) * self.strength;

        for body in bodies.iter_mut() {
            body.x -= dx;
            body.y -= dy;
        }
    }
}

/// Which coordinate an [`AxisForce`] acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

/// Per-body pull toward a coordinate on one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisForce {
    pub axis: Axis,
    pub target: f32,
    /// Default: 0.1.
    #[serde(default = "default_axis_strength")]
    pub strength: f32,
}

fn default_axis_strength() -> f32 {
    0.1
}

impl AxisForce {
    pub fn x(target: f32) -> Self {
        Self {
            axis: Axis::X,
            target,
            strength: default_axis_strength(),
        }
    }

    pub fn y(target: f32) -> Self {
        Self {
            axis: Axis::Y,
            target,
            strength: default_axis_strength(),
        }
    }

    pub fn validate(&self) -> LayoutResult<()> {
        if !self.target.is_finite() {
            return Err(LayoutError::invalid("axis.target", "must be finite"));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(LayoutError::invalid(
                "axis.strength",
                format!("must be in [0, 1], got {}", self.strength),
            ));
        }
        Ok(())
    }

    pub fn apply(&self, bodies: &mut [Body], alpha: f32) {
        let k = self.strength * alpha;
        for body in bodies.iter_mut() {
            match self.axis {
                Axis::X => body.vx += (self.target - body.x) * k,
                Axis::Y => body.vy += (self.target - body.y) * k,
            }
        }
    }
}

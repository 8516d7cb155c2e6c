//! Spring force between linked bodies.
//!
//! Each link pulls its endpoints toward a rest distance. The correction uses
//! predicted positions (`p + v`) and is split between the endpoints by degree
//! so that hubs move less than leaves.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::layout::body::{Body, Jiggle, SimLink};

/// Configuration for the link (spring) force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkForce {
    /// Rest length of every link (default: 100).
    pub distance: f32,
    /// Fixed spring strength. `None` uses `1 / min(degree(u), degree(v))`.
    pub strength: Option<f32>,
    /// Relaxation passes per tick (default: 1).
    pub iterations: u32,
}

impl Default for LinkForce {
    fn default() -> Self {
        Self {
            distance: 100.0,
            strength: None,
            iterations: 1,
        }
    }
}

impl LinkForce {
    pub fn validate(&self) -> LayoutResult<()> {
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(LayoutError::invalid(
                "link.distance",
                format!("must be finite and non-negative, got {}", self.distance),
            ));
        }
        if let Some(strength) = self.strength {
            if !strength.is_finite() || strength < 0.0 {
                return Err(LayoutError::invalid(
                    "link.strength",
                    format!("must be finite and non-negative, got {}", strength),
                ));
            }
        }
        Ok(())
    }

    /// Adjust velocities of linked bodies.
    pub fn apply(&self, bodies: &mut [Body], links: &[SimLink], alpha: f32, jiggle: &mut Jiggle) {
        if links.is_empty() {
            return;
        }

        let mut degree = vec![0u32; bodies.len()];
        for link in links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        for _ in 0..self.iterations {
            for link in links {
                let (s, t) = (link.source, link.target);
                let (ds, dt) = (degree[s] as f32, degree[t] as f32);

                let (x, y, l) = jiggle.offset(
                    bodies[t].x + bodies[t].vx - bodies[s].x - bodies[s].vx,
                    bodies[t].y + bodies[t].vy - bodies[s].y - bodies[s].vy,
                );

                let strength = self.strength.unwrap_or_else(|| 1.0 / ds.min(dt));
                let l = l.sqrt();
                let k = (l - self.distance) / l * alpha * strength;
                let (x, y) = (x * k, y * k);

                let bias = ds / (ds + dt);
                bodies[t].vx -= x * bias;
                bodies[t].vy -= y * bias;
                bodies[s].vx += x * (1.0 - bias);
                bodies[s].vy += y * (1.0 - bias);
            }
        }
    }
}

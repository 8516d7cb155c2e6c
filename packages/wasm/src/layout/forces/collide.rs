//! Collision resolver.
//!
//! Positional correction: any two bodies closer than the sum of their radii
//! are pushed apart along the line through their centers. The correction is
//! split by squared radius (equal radii split evenly). Fixed bodies never
//! move; their partner takes the whole correction.
//!
//! Candidate pairs come from an R-tree over body centers, so a pass costs
//! O(n log n) instead of O(n²). Within a pass each unordered pair is handled
//! once, by its lower slot, which keeps the result independent of query
//! order. Pushing one pair apart can press a body into a third, so passes
//! repeat over a freshly built index until nothing overlaps or `iterations`
//! passes have run.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::layout::body::{Body, Jiggle};
use crate::spatial::SpatialIndex;

/// Relative slack on the squared contact distance, so rounding after a
/// correction does not count as a fresh overlap.
const OVERLAP_TOLERANCE: f32 = 1e-5;

/// Configuration for the collision resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollideForce {
    /// Radius assigned to newly seeded bodies (default: 50).
    pub radius: f32,
    /// Fraction of each overlap removed per pass (default: 1).
    pub strength: f32,
    /// Maximum passes per application (default: 64). Passes stop early once
    /// no pair overlaps.
    pub iterations: u32,
}

impl Default for CollideForce {
    fn default() -> Self {
        Self {
            radius: 50.0,
            strength: 1.0,
            iterations: 64,
        }
    }
}

impl CollideForce {
    pub fn validate(&self) -> LayoutResult<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(LayoutError::invalid(
                "collide.radius",
                format!("must be finite and positive, got {}", self.radius),
            ));
        }
        if !(0.0..=1.0).contains(&self.strength) {
            return Err(LayoutError::invalid(
                "collide.strength",
                format!("must be in [0, 1], got {}", self.strength),
            ));
        }
        if self.iterations == 0 {
            return Err(LayoutError::invalid("collide.iterations", "must be at least 1"));
        }
        Ok(())
    }

    /// Separate overlapping bodies in place.
    pub fn apply(&self, bodies: &mut [Body], jiggle: &mut Jiggle) {
        if bodies.len() < 2 {
            return;
        }
        let max_radius = bodies.iter().map(|b| b.radius).fold(0.0f32, f32::max);

        for pass in 0..self.iterations {
            let index = SpatialIndex::from_positions(bodies.iter().map(|b| (b.x, b.y)));
            let mut moved = false;

            for i in 0..bodies.len() {
                let (xi, yi, ri) = (bodies[i].x, bodies[i].y, bodies[i].radius);
                let mut candidates = index.in_radius(xi, yi, ri + max_radius);
                candidates.retain(|&j| j > i);
                candidates.sort_unstable();

                for j in candidates {
                    moved |= self.separate(bodies, i, j, jiggle);
                }
            }

            if !moved {
                return;
            }
            if pass + 1 == self.iterations {
                debug!("collision passes exhausted with overlaps remaining");
            }
        }
    }

    /// Push bodies `i` and `j` apart if they overlap. Returns whether either moved.
    fn separate(&self, bodies: &mut [Body], i: usize, j: usize, jiggle: &mut Jiggle) -> bool {
        let (ri, rj) = (bodies[i].radius, bodies[j].radius);
        let r = ri + rj;
        let x = bodies[i].x - bodies[j].x;
        let y = bodies[i].y - bodies[j].y;
        if x * x + y * y >= r * r * (1.0 - OVERLAP_TOLERANCE) {
            return false;
        }

        let (share_i, share_j) = match (bodies[i].is_fixed(), bodies[j].is_fixed()) {
            (true, true) => return false,
            (true, false) => (0.0, 1.0),
            (false, true) => (1.0, 0.0),
            (false, false) => {
                let w = rj * rj / (ri * ri + rj * rj);
                (w, 1.0 - w)
            }
        };

        let (x, y, l) = jiggle.offset(x, y);
        let l = l.sqrt();
        let k = (r - l) / l * self.strength;
        let (dx, dy) = (x * k, y * k);

        bodies[i].x += dx * share_i;
        bodies[i].y += dy * share_i;
        bodies[j].x -= dx * share_j;
        bodies[j].y -= dy * share_j;
        true
    }
}

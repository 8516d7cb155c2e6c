//! Many-body charge force.
//!
//! Every pair of bodies interacts with a contribution of
//! `d * strength * alpha / |d|²`; a negative strength repels. Small graphs are
//! solved exactly. Above `exact_threshold` bodies the Barnes-Hut quadtree
//! treats distant cells as a single aggregate charge at their mean position.
//!
//! Distances are floored at `distance_min` and coincident bodies (including
//! offsets too small to square in f32) are jiggled apart, so the force is
//! always finite.

use serde::{Deserialize, Serialize};

use super::quadtree::QuadTree;
use crate::error::{LayoutError, LayoutResult};
use crate::layout::body::{Body, Jiggle, MIN_SEPARATION2};

/// Configuration for the charge (repulsion) force.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeForce {
    /// Charge strength; negative repels (default: -300).
    pub strength: f32,
    /// Distances below this are floored (default: 1).
    pub distance_min: f32,
    /// Pairs farther apart than this are ignored; `None` is unbounded.
    pub distance_max: Option<f32>,
    /// Barnes-Hut accuracy; 0 forces exact evaluation (default: 0.9).
    pub theta: f32,
    /// Body count up to which the exact all-pairs sum is used (default: 64).
    pub exact_threshold: usize,
}

impl Default for ChargeForce {
    fn default() -> Self {
        Self {
            strength: -300.0,
            distance_min: 1.0,
            distance_max: None,
            theta: 0.9,
            exact_threshold: 64,
        }
    }
}

/// Per-tick constants shared by the exact and approximate paths.
struct Interaction {
    scale: f32,
    distance_min2: f32,
    distance_max2: f32,
}

impl Interaction {
    /// Velocity change on a body from `count` charges at offset `(x, y)`.
    fn pull(&self, x: f32, y: f32, count: f32, jiggle: &mut Jiggle) -> Option<(f32, f32)> {
        if x * x + y * y >= self.distance_max2 {
            return None;
        }
        let (x, y, mut l) = jiggle.offset(x, y);
        if l < self.distance_min2 {
            l = (self.distance_min2 * l).sqrt().max(MIN_SEPARATION2);
        }
        let w = self.scale * count / l;
        Some((x * w, y * w))
    }
}

impl ChargeForce {
    pub fn validate(&self) -> LayoutResult<()> {
        if !self.strength.is_finite() {
            return Err(LayoutError::invalid(
                "charge.strength",
                format!("must be finite, got {}", self.strength),
            ));
        }
        if !self.distance_min.is_finite() || self.distance_min <= 0.0 {
            return Err(LayoutError::invalid(
                "charge.distance_min",
                format!("must be finite and positive, got {}", self.distance_min),
            ));
        }
        if let Some(max) = self.distance_max {
            if max.is_nan() || max <= self.distance_min {
                return Err(LayoutError::invalid(
                    "charge.distance_max",
                    format!("must exceed distance_min, got {}", max),
                ));
            }
        }
        if !self.theta.is_finite() || self.theta < 0.0 {
            return Err(LayoutError::invalid(
                "charge.theta",
                format!("must be finite and non-negative, got {}", self.theta),
            ));
        }
        Ok(())
    }

    /// Adjust velocities of all bodies.
    pub fn apply(&self, bodies: &mut [Body], alpha: f32, jiggle: &mut Jiggle) {
        if bodies.len() < 2 {
            return;
        }
        let interaction = Interaction {
            scale: self.strength * alpha,
            distance_min2: self.distance_min * self.distance_min,
            distance_max2: self.distance_max.map_or(f32::INFINITY, |d| d * d),
        };

        if self.theta == 0.0 || bodies.len() <= self.exact_threshold {
            apply_exact(bodies, &interaction, jiggle);
        } else {
            self.apply_barnes_hut(bodies, &interaction, jiggle);
        }
    }

    fn apply_barnes_hut(&self, bodies: &mut [Body], interaction: &Interaction, jiggle: &mut Jiggle) {
        let Some(tree) = QuadTree::build(bodies) else {
            return;
        };
        let theta2 = self.theta * self.theta;
        let mut stack = Vec::with_capacity(64);

        for i in 0..bodies.len() {
            let (bx, by) = (bodies[i].x, bodies[i].y);
            let (mut dvx, mut dvy) = (0.0f32, 0.0f32);
            stack.clear();
            stack.push(0usize);

            while let Some(index) = stack.pop() {
                let cell = &tree.cells[index];

                if cell.is_leaf() {
                    for &j in &cell.slots {
                        if j == i {
                            continue;
                        }
                        let other = &bodies[j];
                        if let Some((vx, vy)) =
                            interaction.pull(other.x - bx, other.y - by, 1.0, jiggle)
                        {
                            dvx += vx;
                            dvy += vy;
                        }
                    }
                    continue;
                }

                let (x, y) = (cell.cx - bx, cell.cy - by);
                let l = x * x + y * y;
                if cell.width * cell.width / theta2 < l {
                    if let Some((vx, vy)) = interaction.pull(x, y, cell.count as f32, jiggle) {
                        dvx += vx;
                        dvy += vy;
                    }
                    continue;
                }

                stack.extend(cell.children.iter().flatten().copied());
            }

            bodies[i].vx += dvx;
            bodies[i].vy += dvy;
        }
    }
}

fn apply_exact(bodies: &mut [Body], interaction: &Interaction, jiggle: &mut Jiggle) {
    let n = bodies.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let x = bodies[j].x - bodies[i].x;
            let y = bodies[j].y - bodies[i].y;
            if let Some((vx, vy)) = interaction.pull(x, y, 1.0, jiggle) {
                bodies[i].vx += vx;
                bodies[i].vy += vy;
                bodies[j].vx -= vx;
                bodies[j].vy -= vy;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeId;

    fn bodies(points: &[(f32, f32)]) -> Vec<Body> {
        points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Body::new(NodeId::new(format!("n{}", i)), x, y, 1.0))
            .collect()
    }

    fn grid(side: usize, spacing: f32) -> Vec<Body> {
        let points: Vec<_> = (0..side * side)
            .map(|i| ((i % side) as f32 * spacing, (i / side) as f32 * spacing))
            .collect();
        bodies(&points)
    }

    #[test]
    fn test_pair_repels() {
        let mut b = bodies(&[(0.0, 0.0), (10.0, 0.0)]);
        ChargeForce::default().apply(&mut b, 1.0, &mut Jiggle::default());

        assert!(b[0].vx < 0.0);
        assert!(b[1].vx > 0.0);
        // -300 * 10 / 100
        assert!((b[1].vx - 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_positive_strength_attracts() {
        let mut b = bodies(&[(0.0, 0.0), (10.0, 0.0)]);
        let force = ChargeForce {
            strength: 30.0,
            ..ChargeForce::default()
        };
        force.apply(&mut b, 1.0, &mut Jiggle::default());

        assert!(b[0].vx > 0.0);
        assert!(b[1].vx < 0.0);
    }

    #[test]
    fn test_coincident_bodies_stay_finite() {
        let mut b = bodies(&[(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)]);
        ChargeForce::default().apply(&mut b, 1.0, &mut Jiggle::default());

        for body in &b {
            assert!(body.vx.is_finite() && body.vy.is_finite());
        }
        assert!(b.iter().any(|body| body.vx != 0.0 || body.vy != 0.0));
    }

    #[test]
    fn test_near_coincident_bodies_stay_finite() {
        let mut b = bodies(&[(0.0, 0.0), (1e-23, 1e-23)]);
        ChargeForce::default().apply(&mut b, 1.0, &mut Jiggle::default());

        for body in &b {
            assert!(body.vx.is_finite() && body.vy.is_finite(), "{:?}", body);
        }
        assert!(b[0].vx != 0.0 || b[0].vy != 0.0);

        // A tiny distance floor must not reintroduce a zero denominator
        let mut b = bodies(&[(0.0, 0.0), (1e-23, 1e-23)]);
        ChargeForce {
            distance_min: 1e-20,
            ..ChargeForce::default()
        }
        .apply(&mut b, 1.0, &mut Jiggle::default());
        for body in &b {
            assert!(body.vx.is_finite() && body.vy.is_finite(), "{:?}", body);
        }
    }

    #[test]
    fn test_distance_max_cuts_off() {
        let mut b = bodies(&[(0.0, 0.0), (500.0, 0.0)]);
        let force = ChargeForce {
            distance_max: Some(100.0),
            ..ChargeForce::default()
        };
        force.apply(&mut b, 1.0, &mut Jiggle::default());

        assert_eq!(b[0].vx, 0.0);
        assert_eq!(b[1].vx, 0.0);
    }

    #[test]
    fn test_barnes_hut_with_tiny_theta_matches_exact() {
        let mut exact = grid(10, 10.0);
        let mut approx = grid(10, 10.0);

        ChargeForce {
            theta: 0.0,
            ..ChargeForce::default()
        }
        .apply(&mut exact, 1.0, &mut Jiggle::default());
        ChargeForce {
            theta: 0.01,
            exact_threshold: 0,
            ..ChargeForce::default()
        }
        .apply(&mut approx, 1.0, &mut Jiggle::default());

        for (e, a) in exact.iter().zip(&approx) {
            let scale = e.vx.abs().max(e.vy.abs()).max(1.0);
            assert!((e.vx - a.vx).abs() / scale < 1e-3, "{:?} vs {:?}", e, a);
            assert!((e.vy - a.vy).abs() / scale < 1e-3, "{:?} vs {:?}", e, a);
        }
    }

    #[test]
    fn test_barnes_hut_pushes_corners_outward() {
        let mut b = grid(12, 10.0);
        ChargeForce {
            exact_threshold: 0,
            ..ChargeForce::default()
        }
        .apply(&mut b, 1.0, &mut Jiggle::default());

        for body in &b {
            assert!(body.vx.is_finite() && body.vy.is_finite());
        }
        // Corner (0, 0) is pushed toward negative x and y
        assert!(b[0].vx < 0.0 && b[0].vy < 0.0);
        // Corner (110, 110) is pushed toward positive x and y
        let last = b.len() - 1;
        assert!(b[last].vx > 0.0 && b[last].vy > 0.0);
    }

    #[test]
    fn test_validate() {
        assert!(ChargeForce::default().validate().is_ok());
        let bad = ChargeForce {
            distance_min: 0.0,
            ..ChargeForce::default()
        };
        assert!(bad.validate().is_err());
        let bad = ChargeForce {
            distance_max: Some(0.5),
            ..ChargeForce::default()
        };
        assert!(bad.validate().is_err());
        let bad = ChargeForce {
            strength: f32::INFINITY,
            ..ChargeForce::default()
        };
        assert!(bad.validate().is_err());
    }
}

//! Force registry and contributors.
//!
//! Each contributor is independently configurable and can be disabled by
//! setting its slot to `None`. Contributors always run in the order
//! **link, charge, collide, center, x, y**. Link and charge adjust
//! velocities; collide and center correct positions directly; the axis
//! forces adjust velocities.

mod center;
mod charge;
mod collide;
mod link;
mod quadtree;

use serde::{Deserialize, Serialize};

pub use center::{Axis, AxisForce, CenterForce};
pub use charge::ChargeForce;
pub use collide::CollideForce;
pub use link::LinkForce;

use super::body::{Body, Jiggle, SimLink};
use crate::error::{LayoutError, LayoutResult};

/// Radius given to bodies when no collision force is registered.
pub const DEFAULT_RADIUS: f32 = 50.0;

/// The named force contributors of a simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceRegistry {
    pub link: Option<LinkForce>,
    pub charge: Option<ChargeForce>,
    pub collide: Option<CollideForce>,
    pub center: Option<CenterForce>,
    pub x: Option<AxisForce>,
    pub y: Option<AxisForce>,
}

impl Default for ForceRegistry {
    fn default() -> Self {
        Self {
            link: Some(LinkForce::default()),
            charge: Some(ChargeForce::default()),
            collide: Some(CollideForce::default()),
            center: Some(CenterForce::default()),
            x: None,
            y: None,
        }
    }
}

impl ForceRegistry {
    /// Names in application order.
    pub const ORDER: [&'static str; 6] = ["link", "charge", "collide", "center", "x", "y"];

    /// A registry with no contributors.
    pub fn empty() -> Self {
        Self {
            link: None,
            charge: None,
            collide: None,
            center: None,
            x: None,
            y: None,
        }
    }

    /// Names of the enabled contributors, in application order.
    pub fn names(&self) -> Vec<&'static str> {
        let enabled = [
            self.link.is_some(),
            self.charge.is_some(),
            self.collide.is_some(),
            self.center.is_some(),
            self.x.is_some(),
            self.y.is_some(),
        ];
        Self::ORDER
            .iter()
            .zip(enabled)
            .filter_map(|(&name, on)| on.then_some(name))
            .collect()
    }

    /// Disable a contributor by name. Returns false for unknown or absent names.
    pub fn remove(&mut self, name: &str) -> bool {
        match name {
            "link" => self.link.take().is_some(),
            "charge" => self.charge.take().is_some(),
            "collide" => self.collide.take().is_some(),
            "center" => self.center.take().is_some(),
            "x" => self.x.take().is_some(),
            "y" => self.y.take().is_some(),
            _ => false,
        }
    }

    pub fn validate(&self) -> LayoutResult<()> {
        if let Some(link) = &self.link {
            link.validate()?;
        }
        if let Some(charge) = &self.charge {
            charge.validate()?;
        }
        if let Some(collide) = &self.collide {
            collide.validate()?;
        }
        if let Some(center) = &self.center {
            center.validate()?;
        }
        for (slot, axis, force) in [("x", Axis::X, &self.x), ("y", Axis::Y, &self.y)] {
            if let Some(force) = force {
                if force.axis != axis {
                    return Err(LayoutError::invalid(slot, "axis does not match its slot"));
                }
                force.validate()?;
            }
        }
        Ok(())
    }

    /// Radius for newly seeded bodies.
    pub fn body_radius(&self) -> f32 {
        self.collide.as_ref().map_or(DEFAULT_RADIUS, |c| c.radius)
    }

    /// Point around which new bodies are seeded.
    pub fn origin(&self) -> (f32, f32) {
        self.center.as_ref().map_or((0.0, 0.0), |c| (c.x, c.y))
    }

    /// Run every enabled contributor once.
    pub fn apply(&self, bodies: &mut [Body], links: &[SimLink], alpha: f32, jiggle: &mut Jiggle) {
        if let Some(link) = &self.link {
            link.apply(bodies, links, alpha, jiggle);
        }
        if let Some(charge) = &self.charge {
            charge.apply(bodies, alpha, jiggle);
        }
        if let Some(collide) = &self.collide {
            collide.apply(bodies, jiggle);
        }
        if let Some(center) = &self.center {
            center.apply(bodies);
        }
        if let Some(x) = &self.x {
            x.apply(bodies, alpha);
        }
        if let Some(y) = &self.y {
            y.apply(bodies, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names_in_order() {
        assert_eq!(
            ForceRegistry::default().names(),
            vec!["link", "charge", "collide", "center"]
        );
    }

    #[test]
    fn test_axis_forces_listed_last() {
        let registry = ForceRegistry {
            x: Some(AxisForce::x(0.0)),
            y: Some(AxisForce::y(0.0)),
            ..ForceRegistry::empty()
        };
        assert_eq!(registry.names(), vec!["x", "y"]);
    }

    #[test]
    fn test_remove() {
        let mut registry = ForceRegistry::default();
        assert!(registry.remove("charge"));
        assert!(!registry.remove("charge"));
        assert!(!registry.remove("gravity"));
        assert_eq!(registry.names(), vec!["link", "collide", "center"]);
    }

    #[test]
    fn test_validate_rejects_swapped_axis() {
        let registry = ForceRegistry {
            x: Some(AxisForce::y(0.0)),
            ..ForceRegistry::default()
        };
        assert!(registry.validate().is_err());
        assert!(ForceRegistry::default().validate().is_ok());
    }

    #[test]
    fn test_body_radius_and_origin() {
        let registry = ForceRegistry {
            collide: Some(CollideForce {
                radius: 12.0,
                ..CollideForce::default()
            }),
            center: Some(CenterForce::at(400.0, 300.0)),
            ..ForceRegistry::default()
        };
        assert_eq!(registry.body_radius(), 12.0);
        assert_eq!(registry.origin(), (400.0, 300.0));
        assert_eq!(ForceRegistry::empty().body_radius(), DEFAULT_RADIUS);
    }
}

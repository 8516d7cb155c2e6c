//! Simulation and session configuration.
//!
//! All types deserialize from partial objects: missing fields take their
//! defaults, so a JS caller can override only what it cares about.

use serde::{Deserialize, Serialize};

use super::forces::ForceRegistry;
use crate::error::{LayoutError, LayoutResult};

/// Ticks it takes alpha to cool from 1 to `alpha_min` with the default decay.
pub const DEFAULT_COOLING_TICKS: f32 = 300.0;

/// Cooling and friction parameters of the integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Alpha below which the simulation idles (default: 0.001).
    pub alpha_min: f32,
    /// Fraction of the gap to `alpha_target` closed per tick
    /// (default: `1 - alpha_min^(1/300)`, about 0.0228).
    pub alpha_decay: f32,
    /// Resting alpha; raised while dragging (default: 0).
    pub alpha_target: f32,
    /// Alpha set by `restart` (default: 1).
    pub restart_alpha: f32,
    /// Fraction of velocity lost per tick (default: 0.4, i.e. velocities are
    /// multiplied by 0.6).
    pub velocity_decay: f32,
    /// Seed of the jiggle generator.
    pub seed: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / DEFAULT_COOLING_TICKS),
            alpha_target: 0.0,
            restart_alpha: 1.0,
            velocity_decay: 0.4,
            seed: 1,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> LayoutResult<()> {
        fn open_unit(field: &'static str, value: f32) -> LayoutResult<()> {
            if value > 0.0 && value < 1.0 {
                Ok(())
            } else {
                Err(LayoutError::invalid(field, format!("must be in (0, 1), got {}", value)))
            }
        }
        fn closed_unit(field: &'static str, value: f32) -> LayoutResult<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(LayoutError::invalid(field, format!("must be in [0, 1], got {}", value)))
            }
        }

        open_unit("alpha_min", self.alpha_min)?;
        open_unit("alpha_decay", self.alpha_decay)?;
        closed_unit("alpha_target", self.alpha_target)?;
        closed_unit("velocity_decay", self.velocity_decay)?;
        if !(self.restart_alpha.is_finite() && self.restart_alpha > self.alpha_min) {
            return Err(LayoutError::invalid(
                "restart_alpha",
                format!("must exceed alpha_min, got {}", self.restart_alpha),
            ));
        }
        Ok(())
    }
}

/// Everything needed to build a layout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub simulation: SimulationConfig,
    pub forces: ForceRegistry,
    /// Alpha target held while any node is being dragged (default: 0.3).
    pub drag_alpha_target: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            forces: ForceRegistry::default(),
            drag_alpha_target: 0.3,
        }
    }
}

impl LayoutConfig {
    pub fn validate(&self) -> LayoutResult<()> {
        self.simulation.validate()?;
        self.forces.validate()?;
        if !(0.0..=1.0).contains(&self.drag_alpha_target) {
            return Err(LayoutError::invalid(
                "drag_alpha_target",
                format!("must be in [0, 1], got {}", self.drag_alpha_target),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_decay_cools_in_300_ticks() {
        let config = SimulationConfig::default();
        assert!((config.alpha_decay - 0.0228).abs() < 1e-3);

        let remaining = (1.0 - config.alpha_decay).powf(DEFAULT_COOLING_TICKS);
        assert!((remaining - config.alpha_min).abs() < 1e-5);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let cases = [
            SimulationConfig { alpha_min: 0.0, ..SimulationConfig::default() },
            SimulationConfig { alpha_min: 1.5, ..SimulationConfig::default() },
            SimulationConfig { alpha_decay: 1.0, ..SimulationConfig::default() },
            SimulationConfig { velocity_decay: -0.1, ..SimulationConfig::default() },
            SimulationConfig { alpha_target: f32::NAN, ..SimulationConfig::default() },
            SimulationConfig { restart_alpha: 0.0, ..SimulationConfig::default() },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{:?} should be rejected", config);
        }
    }

    #[test]
    fn test_rejects_bad_drag_target() {
        let config = LayoutConfig {
            drag_alpha_target: 3.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConfig { field: "drag_alpha_target", .. })
        ));
    }
}

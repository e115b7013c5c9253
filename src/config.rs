//! Engine configuration.
//!
//! Every tunable constant lives here so hosts can adjust the feel of the
//! cloud from a JSON file without recompiling. Missing fields fall back to
//! their defaults.
//!
//! ```json
//! {
//!   "particle_count": 20000,
//!   "initial_shape": "heart",
//!   "field": { "k_expand": 2.0, "k_noise": 0.5 },
//!   "style": { "color": [1.0, 0.0, 0.33] }
//! }
//! ```

use crate::error::ConfigError;
use crate::shapes::ShapeId;
use crate::visuals::RenderStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-particle motion constants. Rates are per reference frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldParams {
    /// Exponential smoothing applied to the raw gesture factor.
    pub factor_smoothing: f32,
    /// Smoothed factor below which no expansion is applied.
    pub expansion_threshold: f32,
    /// Extra scale at factor 1 (`expansion = 1 + factor × k_expand`).
    pub k_expand: f32,
    /// Jitter magnitude at factor 1.
    pub k_noise: f32,
    /// Fraction of the remaining distance covered each frame.
    pub lerp_speed: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self {
            factor_smoothing: 0.1,
            expansion_threshold: 0.01,
            k_expand: 2.0,
            k_noise: 0.5,
            lerp_speed: 0.05,
        }
    }
}

/// Aggregate pose constants. Rates are per reference frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TransformParams {
    /// World units between the top and bottom screen edge targets.
    pub vertical_range: f32,
    /// Y rotation speed per unit of horizontal deviation, radians per frame.
    pub rotation_gain: f32,
    /// Offset approach rate while driven.
    pub driven_return: f32,
    /// Offset return rate while idle.
    pub idle_return: f32,
    /// Multiplier applied to the X tilt while driven.
    pub tilt_decay: f32,
    /// Idle Y spin, radians per frame.
    pub idle_spin_y: f32,
    /// Idle X spin, radians per frame.
    pub idle_spin_x: f32,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            vertical_range: 4.0,
            rotation_gain: 0.1,
            driven_return: 0.1,
            idle_return: 0.05,
            tilt_decay: 0.95,
            idle_spin_y: 0.002,
            idle_spin_x: 0.001,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of particles. Fixed for the life of the simulation.
    pub particle_count: usize,
    /// Shape the particles converge to on start.
    pub initial_shape: String,
    /// Seed for all sampling. `None` seeds from the clock.
    pub seed: Option<u64>,
    pub field: FieldParams,
    pub transform: TransformParams,
    pub style: RenderStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: 20_000,
            initial_shape: ShapeId::Heart.name().into(),
            seed: None,
            field: FieldParams::default(),
            transform: TransformParams::default(),
            style: RenderStyle::default(),
        }
    }
}

impl EngineConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::Invalid("particle_count must be > 0".into()));
        }

        let rates = [
            ("field.factor_smoothing", self.field.factor_smoothing),
            ("field.lerp_speed", self.field.lerp_speed),
            ("transform.driven_return", self.transform.driven_return),
            ("transform.idle_return", self.transform.idle_return),
            ("transform.tilt_decay", self.transform.tilt_decay),
        ];
        for (name, rate) in rates {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ConfigError::Invalid(format!("{} must be in (0, 1], got {}", name, rate)));
            }
        }

        let non_negative = [
            ("field.expansion_threshold", self.field.expansion_threshold),
            ("field.k_expand", self.field.k_expand),
            ("field.k_noise", self.field.k_noise),
            ("style.point_size", self.style.point_size),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be >= 0, got {}", name, value)));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.particle_count, 20_000);
        assert_eq!(config.initial_shape, "heart");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json(r#"{ "particle_count": 500, "field": { "k_expand": 5.0 } }"#).unwrap();
        assert_eq!(config.particle_count, 500);
        assert_eq!(config.field.k_expand, 5.0);
        assert_eq!(config.field.lerp_speed, 0.05);
        assert_eq!(config.transform, TransformParams::default());
    }

    #[test]
    fn test_zero_particles_rejected() {
        let err = EngineConfig::from_json(r#"{ "particle_count": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        let err = EngineConfig::from_json(r#"{ "field": { "lerp_speed": 1.5 } }"#).unwrap_err();
        assert!(err.to_string().contains("field.lerp_speed"));
    }

    #[test]
    fn test_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("morphcloud-config-{}.json", std::process::id()));
        let config = EngineConfig {
            particle_count: 1234,
            initial_shape: "saturn".into(),
            seed: Some(9),
            ..EngineConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}

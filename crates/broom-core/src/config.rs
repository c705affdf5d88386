//! Broom tuning parameters.
//!
//! A [`BroomConfig`] is fixed for the lifetime of a controller. It can be
//! built in code, or loaded from a TOML file in which every field is optional
//! and falls back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    gear::GearMode,
};

/// Tuning parameters for a broom controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroomConfig {
    /// Top horizontal speed at full throttle (m/s).
    pub max_speed: f32,
    /// Rate at which horizontal speed eases toward the throttle target (1/s).
    pub acceleration: f32,
    /// Heading change per second at full steering deflection (rad/s).
    pub steering_sensitivity: f32,
    /// Hover lift at zero ground distance (m/s²). Emergency lift uses twice this as an impulse.
    pub lift_force: f32,
    /// Ground distance at which hover lift fades to zero (m).
    pub hover_height: f32,
    /// Target-height change rate on vertical gears, also the height-lock gain.
    pub vertical_acceleration: f32,
    /// Cap on the vertical velocity commanded by the height lock (m/s).
    pub max_vertical_speed: f32,
    /// Gain of the airborne altitude-restoring acceleration.
    pub height_stabilization_force: f32,
    /// Levitation oscillator frequency (rad/s of phase advance).
    pub levitation_frequency: f32,
    /// Peak levitation offset (m).
    pub levitation_amplitude: f32,
    /// Levitation amplitude multiplier while moving.
    pub movement_levitation_reduction: f32,
    /// Rate at which the levitation offset eases toward its target (1/s).
    pub levitation_smoothness: f32,
    /// Minimum time between accepted gear shifts (s).
    pub gear_shift_cooldown: f32,
    /// Lowest allowed target/stable height (world Y).
    pub min_height: f32,
    /// Highest allowed target/stable height (world Y).
    pub max_height: f32,
    /// Highest selectable gear (1..=4).
    pub max_gear: u8,
    /// Downward acceleration on horizontal gears when no ground is in hover range (m/s²).
    pub airborne_sink_acceleration: f32,
    /// Model roll at full steering deflection (degrees).
    pub max_tilt_angle: f32,
    /// Peak model pitch wobble from levitation (degrees).
    pub levitation_tilt_angle: f32,
    /// Rate at which the model tilt eases toward its target (1/s).
    pub tilt_smoothness: f32,
}

impl Default for BroomConfig {
    fn default() -> Self {
        Self {
            max_speed: 20.0,
            acceleration: 5.0,
            steering_sensitivity: 2.0,
            lift_force: 15.0,
            hover_height: 2.0,
            vertical_acceleration: 8.0,
            max_vertical_speed: 10.0,
            height_stabilization_force: 20.0,
            levitation_frequency: 1.0,
            levitation_amplitude: 0.2,
            movement_levitation_reduction: 0.5,
            levitation_smoothness: 2.0,
            gear_shift_cooldown: 0.5,
            min_height: 1.0,
            max_height: 50.0,
            max_gear: GearMode::COUNT,
            airborne_sink_acceleration: 0.5,
            max_tilt_angle: 30.0,
            levitation_tilt_angle: 5.0,
            tilt_smoothness: 5.0,
        }
    }
}

impl BroomConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded broom config from {}", path.display());
        Ok(config)
    }

    /// Render the config as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A copy with `key = value` assignments applied, validated.
    ///
    /// Values use TOML syntax, so `max_gear = 2` and `max_speed = 12.5` both
    /// work.
    pub fn with_overrides<'a>(
        &self,
        overrides: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let mut value = toml::Value::try_from(self)?;
        let Some(table) = value.as_table_mut() else {
            return Err(ConfigError::Serialize {
                message: "config did not serialize to a table".to_string(),
            });
        };

        for (key, raw) in overrides {
            let key = key.trim();
            if !table.contains_key(key) {
                return Err(ConfigError::Parse {
                    message: format!("unknown field `{key}`"),
                });
            }
            let mut parsed: toml::Table = toml::from_str(&format!("{key} = {}", raw.trim()))?;
            if let Some(v) = parsed.remove(key) {
                table.insert(key.to_string(), v);
            }
        }

        let config: Self = value.try_into()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is usable by the controller.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("steering_sensitivity", self.steering_sensitivity),
            ("lift_force", self.lift_force),
            ("hover_height", self.hover_height),
            ("vertical_acceleration", self.vertical_acceleration),
            ("max_vertical_speed", self.max_vertical_speed),
            ("height_stabilization_force", self.height_stabilization_force),
            ("levitation_frequency", self.levitation_frequency),
            ("levitation_amplitude", self.levitation_amplitude),
            (
                "movement_levitation_reduction",
                self.movement_levitation_reduction,
            ),
            ("levitation_smoothness", self.levitation_smoothness),
            ("gear_shift_cooldown", self.gear_shift_cooldown),
            ("min_height", self.min_height),
            ("max_height", self.max_height),
            ("airborne_sink_acceleration", self.airborne_sink_acceleration),
            ("max_tilt_angle", self.max_tilt_angle),
            ("levitation_tilt_angle", self.levitation_tilt_angle),
            ("tilt_smoothness", self.tilt_smoothness),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::invalid(field, format!("must be finite, got {value}")));
            }
        }

        // Everything except the height bounds is a rate, gain or magnitude.
        for (field, value) in fields {
            if field != "min_height" && field != "max_height" && value < 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("must not be negative, got {value}"),
                ));
            }
        }

        if self.hover_height <= 0.0 {
            return Err(ConfigError::invalid(
                "hover_height",
                format!("must be positive, got {}", self.hover_height),
            ));
        }
        if self.min_height > self.max_height {
            return Err(ConfigError::invalid(
                "min_height",
                format!(
                    "{} is above max_height {}",
                    self.min_height, self.max_height
                ),
            ));
        }
        if !(1..=GearMode::COUNT).contains(&self.max_gear) {
            return Err(ConfigError::invalid(
                "max_gear",
                format!("must be in 1..={}, got {}", GearMode::COUNT, self.max_gear),
            ));
        }

        Ok(())
    }

    /// Clamp a height into `[min_height, max_height]`.
    ///
    /// Never panics, even for a config that fails [`Self::validate`]: inverted
    /// bounds saturate at `max_height`, a NaN bound is ignored and a NaN
    /// height becomes `min_height`.
    pub fn clamp_height(&self, height: f32) -> f32 {
        height.max(self.min_height).min(self.max_height)
    }

    /// Probe range used to decide whether the broom counts as grounded.
    pub fn grounded_probe_distance(&self) -> f32 {
        self.hover_height + GROUNDED_PROBE_MARGIN
    }

    /// Probe range used for hover lift; longer than the grounded check.
    pub fn hover_probe_distance(&self) -> f32 {
        self.hover_height * 2.0
    }
}

/// Extra reach of the grounded probe beyond the hover height (m).
const GROUNDED_PROBE_MARGIN: f32 = 0.2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BroomConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = BroomConfig::from_toml_str("max_speed = 35.0\nmax_gear = 2\n")
            .expect("partial config should parse");
        assert_eq!(config.max_speed, 35.0);
        assert_eq!(config.max_gear, 2);
        assert_eq!(config.hover_height, 2.0);
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let text = BroomConfig::default().to_toml_string().unwrap();
        let parsed = BroomConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, BroomConfig::default());
    }

    #[test]
    fn test_rejects_inverted_height_bounds() {
        let err = BroomConfig::from_toml_str("min_height = 60.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "min_height",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_hover_height() {
        let config = BroomConfig {
            hover_height: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "hover_height",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_gear_out_of_range() {
        for max_gear in [0, 5] {
            let config = BroomConfig {
                max_gear,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "max_gear {max_gear} accepted");
        }
    }

    #[test]
    fn test_rejects_negative_and_nan() {
        let negative = BroomConfig {
            acceleration: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());

        let nan = BroomConfig {
            lift_force: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_negative_heights_are_allowed() {
        let config = BroomConfig {
            min_height: -20.0,
            max_height: -5.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let err = BroomConfig::from_toml_str("max_speed = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("broom-config-that-does-not-exist.toml");
        let err = BroomConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("broom-config-that-does-not-exist"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("broom-config-{}.toml", std::process::id()));
        std::fs::write(&path, "hover_height = 3.5\n").unwrap();
        let config = BroomConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.hover_height, 3.5);
    }

    #[test]
    fn test_clamp_height_tolerates_unvalidated_bounds() {
        let inverted = BroomConfig {
            min_height: 60.0,
            max_height: 50.0,
            ..BroomConfig::default()
        };
        assert_eq!(inverted.clamp_height(10.0), 50.0);
        assert_eq!(inverted.clamp_height(70.0), 50.0);

        let nan_max = BroomConfig {
            max_height: f32::NAN,
            ..BroomConfig::default()
        };
        assert_eq!(nan_max.clamp_height(70.0), 70.0);
        assert_eq!(nan_max.clamp_height(0.0), 1.0);

        assert_eq!(BroomConfig::default().clamp_height(f32::NAN), 1.0);
    }

    #[test]
    fn test_probe_distances() {
        let config = BroomConfig::default();
        assert!((config.grounded_probe_distance() - 2.2).abs() < 1e-6);
        assert!((config.hover_probe_distance() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_overrides_apply_and_validate() {
        let config = BroomConfig::default()
            .with_overrides([("max_speed", "12.5"), ("max_gear", "2")])
            .unwrap();
        assert_eq!(config.max_speed, 12.5);
        assert_eq!(config.max_gear, 2);
        assert_eq!(config.hover_height, 2.0);

        let err = BroomConfig::default()
            .with_overrides([("max_gear", "9")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "max_gear", .. }));
    }

    #[test]
    fn test_unknown_override_is_rejected() {
        let err = BroomConfig::default()
            .with_overrides([("warp_factor", "9")])
            .unwrap_err();
        assert!(err.to_string().contains("warp_factor"));
    }
}

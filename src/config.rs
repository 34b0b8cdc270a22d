//! Configuration management for the face overlay pipeline

use crate::constants::{
    AVATAR_SCALE_Y_COMPENSATION, BREATH_INTENSITY, BREATH_PHASE_STEP, BREATH_RATE,
    DEFAULT_ANCHOR_DISTANCE, DEFAULT_DEPTH_SCALE, DEFAULT_FOV_DEGREES, DEFAULT_VIDEO_HEIGHT,
    DEFAULT_VIDEO_WIDTH, DRAG_SENSITIVITY, FALLBACK_AVATAR_SCALE, NECK_FORWARD_TILT,
    PINCH_SENSITIVITY, ROTATION_STEP, SCALE_OFFSET_MAX, SCALE_OFFSET_MIN,
    WHEEL_DEPTH_SENSITIVITY, WHEEL_SCALE_SENSITIVITY,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display container dimensions
    pub display: DisplayConfig,

    /// Landmark projection parameters
    pub projection: ProjectionConfig,

    /// Gesture sensitivities and clamps
    pub gestures: GestureConfig,

    /// Avatar rig animation parameters
    pub rig: RigConfig,
}

/// Display container configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Container width in pixels
    pub width: u32,

    /// Container height in pixels
    pub height: u32,
}

/// Landmark projection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionConfig {
    /// Vertical field of view of the perspective camera, in degrees
    pub fov_degrees: f32,

    /// Distance from the camera at which face anchors are placed
    pub anchor_distance: f32,

    /// Strength of the tracked depth pass-through
    pub depth_scale: f32,
}

/// Gesture sensitivities and clamps
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Screen-pixels-to-world factor for single-pointer drags
    pub drag_sensitivity: f32,

    /// Pinch-distance-to-scale factor for two-finger gestures
    pub pinch_sensitivity: f32,

    /// Wheel-to-scale factor
    pub wheel_scale_sensitivity: f32,

    /// Wheel-to-depth factor when the modifier key is held
    pub wheel_depth_sensitivity: f32,

    /// Radians per discrete rotation button press
    pub rotation_step: f32,

    /// Manual scale offset clamp range
    pub scale_min: f32,
    pub scale_max: f32,

    /// Vertical compensation per unit of scale change when wheel-scaling a
    /// full-body avatar
    pub avatar_scale_y_compensation: f32,
}

/// Avatar rig animation parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RigConfig {
    /// Root scale used until interocular calibration has run
    pub fallback_scale: f32,

    /// Breathing accumulator advance per frame
    pub breath_phase_step: f32,

    /// Breathing oscillation rate applied to the accumulator
    pub breath_rate: f32,

    /// Breathing oscillation amplitude on the spine chain
    pub breath_intensity: f32,

    /// Fixed forward tilt added to the neck bone, in radians
    pub neck_forward_tilt: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIDEO_WIDTH,
            height: DEFAULT_VIDEO_HEIGHT,
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            anchor_distance: DEFAULT_ANCHOR_DISTANCE,
            depth_scale: DEFAULT_DEPTH_SCALE,
        }
    }
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: DRAG_SENSITIVITY,
            pinch_sensitivity: PINCH_SENSITIVITY,
            wheel_scale_sensitivity: WHEEL_SCALE_SENSITIVITY,
            wheel_depth_sensitivity: WHEEL_DEPTH_SENSITIVITY,
            rotation_step: ROTATION_STEP,
            scale_min: SCALE_OFFSET_MIN,
            scale_max: SCALE_OFFSET_MAX,
            avatar_scale_y_compensation: AVATAR_SCALE_Y_COMPENSATION,
        }
    }
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            fallback_scale: FALLBACK_AVATAR_SCALE,
            breath_phase_step: BREATH_PHASE_STEP,
            breath_rate: BREATH_RATE,
            breath_intensity: BREATH_INTENSITY,
            neck_forward_tilt: NECK_FORWARD_TILT,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.display.width == 0 || self.display.height == 0 {
            return Err(Error::ConfigError(
                "Display dimensions must be greater than 0".to_string(),
            ));
        }

        if !(0.0..180.0).contains(&self.projection.fov_degrees) || self.projection.fov_degrees == 0.0
        {
            return Err(Error::ConfigError(
                "Field of view must be between 0 and 180 degrees (exclusive)".to_string(),
            ));
        }
        if self.projection.anchor_distance <= 0.0 {
            return Err(Error::ConfigError(
                "Anchor distance must be greater than 0".to_string(),
            ));
        }

        if self.gestures.scale_min <= 0.0 || self.gestures.scale_min >= self.gestures.scale_max {
            return Err(Error::ConfigError(
                "Scale clamp range must satisfy 0 < min < max".to_string(),
            ));
        }
        for (name, value) in [
            ("drag_sensitivity", self.gestures.drag_sensitivity),
            ("pinch_sensitivity", self.gestures.pinch_sensitivity),
            (
                "wheel_scale_sensitivity",
                self.gestures.wheel_scale_sensitivity,
            ),
            (
                "wheel_depth_sensitivity",
                self.gestures.wheel_depth_sensitivity,
            ),
            ("rotation_step", self.gestures.rotation_step),
        ] {
            if value <= 0.0 {
                return Err(Error::ConfigError(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if self.rig.fallback_scale <= 0.0 {
            return Err(Error::ConfigError(
                "Rig fallback scale must be greater than 0".to_string(),
            ));
        }
        if self.rig.breath_intensity < 0.0 {
            return Err(Error::ConfigError(
                "Breath intensity must not be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Face Overlay Configuration

# Display container
display:
  width: 1280
  height: 720

# Landmark projection
projection:
  fov_degrees: 45.0
  anchor_distance: 2.0
  depth_scale: 0.3

# Gesture control
gestures:
  drag_sensitivity: 0.001
  pinch_sensitivity: 0.002
  wheel_scale_sensitivity: 0.0005
  wheel_depth_sensitivity: 0.002
  rotation_step: 0.25
  scale_min: 0.3
  scale_max: 3.0
  avatar_scale_y_compensation: 2.0

# Avatar rig animation
rig:
  fallback_scale: 2.2
  breath_phase_step: 0.036
  breath_rate: 0.5
  breath_intensity: 0.05
  neck_forward_tilt: 0.3
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.gestures.scale_min, 0.3);
        assert_eq!(config.gestures.scale_max, 3.0);
        assert_eq!(config.projection.fov_degrees, 45.0);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut config = Config::default();
        config.gestures.scale_min = 5.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.projection.fov_degrees = 180.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.width = 0;
        assert!(config.validate().is_err());
    }
}

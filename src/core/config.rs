//! Engine configuration
//!
//! Configuration can be built in code with the `with_*` builders or loaded
//! from RON (preferred) or JSON. Missing fields fall back to their defaults.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::scheduler::TickPolicy;

/// Default camera setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Units per second contributed by one held movement key
    pub fly_speed: f32,
    /// Degrees of rotation per unit of cursor travel
    pub mouse_sensitivity: f32,
    /// Speed multiplier while boost is held
    pub boost_multiplier: f32,
    /// Initial position
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            near: 0.1,
            far: 100.0,
            fly_speed: 1.0,
            mouse_sensitivity: 0.15,
            boost_multiplier: 10.0,
            position: Vec3::ZERO,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window title
    pub title: String,
    /// Initial window width
    pub width: u32,
    /// Initial window height
    pub height: u32,
    /// Enable VSync
    pub vsync: bool,
    /// Fixed simulation rate
    pub updates_per_second: u32,
    /// How leftover frame time is carried between ticks
    pub tick_policy: TickPolicy,
    /// Catch-up cap for [`TickPolicy::CatchUp`]
    pub max_updates_per_frame: u32,
    /// Default scene camera
    pub camera: CameraConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("Skyframe"),
            width: 800,
            height: 600,
            vsync: true,
            updates_per_second: 20,
            tick_policy: TickPolicy::default(),
            max_updates_per_frame: 5,
            camera: CameraConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Create a new config with a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set window dimensions
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable VSync
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Set the fixed update rate
    pub fn with_updates_per_second(mut self, updates_per_second: u32) -> Self {
        self.updates_per_second = updates_per_second;
        self
    }

    /// Set how the fixed-step accumulator is drained
    pub fn with_tick_policy(mut self, policy: TickPolicy) -> Self {
        self.tick_policy = policy;
        self
    }

    /// Replace the camera setup
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    /// Length of one fixed tick in milliseconds
    pub fn tick_ms(&self) -> f32 {
        1000.0 / self.updates_per_second.max(1) as f32
    }

    /// Check values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid("window size must be non-zero".into()));
        }
        if self.updates_per_second == 0 {
            return Err(ConfigError::Invalid(
                "updates_per_second must be at least 1".into(),
            ));
        }
        if self.max_updates_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "max_updates_per_frame must be at least 1".into(),
            ));
        }
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(
                "camera.fov_degrees must be in (0, 180)".into(),
            ));
        }
        if !(camera.near > 0.0 && camera.far > camera.near) {
            return Err(ConfigError::Invalid(
                "camera clip planes must satisfy 0 < near < far".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a RON document
    ///
    /// # Errors
    ///
    /// Returns an error if parsing or validation fails
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(source).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the config to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load the config from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the config to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Errors that can occur while loading or validating configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// IO error
    IoError(String),
    /// Syntax or type error in the document
    ParseError(String),
    /// Serialization error
    SerializeError(String),
    /// A value the engine cannot run with
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::ParseError(e) => write!(f, "Parse error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

//! # Unified Configuration System
//!
//! All tunables of the scene engine in one serializable tree. Each section
//! has builder-style setters, sensible defaults, and a `validate` step that
//! the loaders run before handing the configuration out.
//!
//! ## Configuration Categories
//!
//! - **Logging**: default log filter for the `env_logger` sink
//! - **Picking**: intersection epsilon, hit policy, distance limits
//! - **Rendering**: how the render action talks to its backend

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::config::{Config, ConfigError};

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `"info"` or `"scene_engine=debug"`
    pub level: String,
}

impl LoggingConfig {
    /// Create a logging configuration with the given filter
    pub fn new(level: impl Into<String>) -> Self {
        Self { level: level.into() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

/// # Pick Configuration
///
/// Controls how [`PickAction`](crate::action::PickAction) tests rays against
/// triangle geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    /// Determinant threshold below which a ray counts as parallel to a triangle
    pub epsilon: f32,
    /// Keep every hit (sorted front to back) instead of only the nearest one
    pub pick_all: bool,
    /// Hits farther along the ray than this are ignored
    pub max_distance: f32,
    /// Skip culled triangles when the cull mode category says so
    pub honor_face_culling: bool,
}

impl PickConfig {
    /// Default determinant threshold for ray/triangle tests
    pub const DEFAULT_EPSILON: f32 = 1e-6;

    /// Create a new pick configuration
    pub fn new() -> Self {
        Self {
            epsilon: Self::DEFAULT_EPSILON,
            pick_all: true,
            max_distance: f32::INFINITY,
            honor_face_culling: true,
        }
    }

    /// Keep all hits or only the nearest
    #[must_use]
    pub fn with_pick_all(mut self, pick_all: bool) -> Self {
        self.pick_all = pick_all;
        self
    }

    /// Limit the distance along the ray
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Set the parallel-ray threshold
    #[must_use]
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Enable or disable back-face rejection while picking
    #[must_use]
    pub fn with_face_culling(mut self, honor: bool) -> Self {
        self.honor_face_culling = honor;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(format!("Pick epsilon must be positive and finite, got {}", self.epsilon));
        }
        if self.max_distance.is_nan() || self.max_distance <= 0.0 {
            return Err(format!("Pick max distance must be positive, got {}", self.max_distance));
        }
        Ok(())
    }
}

impl Default for PickConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Render Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Send every enabled category's default value to the backend before
    /// traversal starts, so the backend never renders with stale state
    pub prime_backend: bool,
}

impl RenderConfig {
    /// Create a new render configuration
    pub fn new() -> Self {
        Self { prime_backend: true }
    }

    /// Enable or disable backend priming
    #[must_use]
    pub fn with_prime_backend(mut self, prime: bool) -> Self {
        self.prime_backend = prime;
        self
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Engine Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneEngineConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Picking configuration
    pub picking: PickConfig,
    /// Rendering configuration
    pub render: RenderConfig,
}

impl SceneEngineConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.logging.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        self.picking.validate()?;
        Ok(())
    }

    /// Load and validate a configuration file (`.toml` or `.ron`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}

impl Config for SceneEngineConfig {}

//! # Core Engine Module
//!
//! Shared configuration for the traversal engine and its actions.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for logging, picking and rendering

pub mod config;

// Re-export commonly used config types
pub use config::{
    Config,
    ConfigError,
    LoggingConfig,
    PickConfig,
    RenderConfig,
    SceneEngineConfig,
};

//! Configuration system for the Terra globe viewer.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization. [`GlobeParams`] is the tunable parameter set that
//! is passed by reference into scene composition and the per-frame update.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, AtmosphereParams, CameraConfig, Config, ConfigSource, ControlsConfig,
    DebugConfig, GlobeParams, RenderConfig, WindowConfig,
};
pub use error::ConfigError;

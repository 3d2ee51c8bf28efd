//! Loader configuration
//!
//! This module provides:
//! - [`LoaderOptions`]: the raw options bag supplied by the host
//! - [`BuildConfiguration`]: the validated configuration for one build
//! - [`ConfigLoader`]: options files in JSON or TOML

pub mod build;
pub mod loader;
pub mod options;

pub use build::{
    BuildConfiguration, CargoWebOptions, ConfigError, StrategyKind, WasmBindgenOptions,
    DEFAULT_NAME_PATTERN, DEFAULT_TARGET,
};
pub use loader::ConfigLoader;
pub use options::{CargoWebSettings, LoaderOptions, Toggle, WasmBindgenSettings};

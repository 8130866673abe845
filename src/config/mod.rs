// src/config/mod.rs

//! Configuration loading and validation for hotbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file through the filesystem abstraction (`loader.rs`).
//! - Validate values (`validate.rs`).
//! - Merge CLI overrides into the effective [`Settings`] (`settings.rs`).

pub mod loader;
pub mod model;
pub mod settings;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_config, load_from_path, DEFAULT_CONFIG_FILE};
pub use model::{BuildSection, ConfigFile, ConfigSection, RawConfigFile, WatchSection};
pub use settings::Settings;

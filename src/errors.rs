// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HotbuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),

    #[error("failed to initialise file watcher: {0}")]
    WatcherInit(#[source] notify::Error),

    #[error("failed to watch path {path:?}: {source}")]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HotbuildError>;

use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HotbuildError, Result};
use crate::fs::FileSystem;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "Hotbuild.toml";

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// semantic checks.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let contents = fs.read_to_string(path.as_ref())?;
    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(fs, path)?;
    ConfigFile::try_from(raw_config)
}

/// Load the effective configuration.
///
/// - `explicit = Some(path)`: the file must exist.
/// - `explicit = None`: `<cwd>/Hotbuild.toml` is used if present, otherwise
///   defaults apply.
pub fn load_config(fs: &dyn FileSystem, cwd: &Path, explicit: Option<&str>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => {
            let path = PathBuf::from(path);
            if !fs.is_file(&path) {
                return Err(HotbuildError::ConfigError(format!(
                    "config file {:?} does not exist",
                    path
                )));
            }
            load_and_validate(fs, &path)
        }
        None => {
            let path = default_config_path(cwd);
            if fs.is_file(&path) {
                load_and_validate(fs, &path)
            } else {
                ConfigFile::try_from(RawConfigFile::default())
            }
        }
    }
}

pub fn default_config_path(cwd: &Path) -> PathBuf {
    cwd.join(DEFAULT_CONFIG_FILE)
}

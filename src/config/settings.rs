// src/config/settings.rs

//! Effective settings: config file values overridden by CLI flags.

use std::time::Duration;

use crate::build::BuildSettings;
use crate::cli::CliArgs;
use crate::config::model::ConfigFile;
use crate::config::validate::{validate_exclude, validate_stop_timeout};
use crate::errors::Result;
use crate::types::TriggerWhileBuildingBehaviour;

/// Everything the core needs, resolved once before the loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub build: BuildSettings,
    pub extensions: Vec<String>,
    pub paths: Vec<String>,
    pub exclude: Vec<String>,
    pub recursive: bool,
    pub use_hash: bool,
    pub debounce: Duration,
    pub stop_timeout: Duration,
    pub behaviour: TriggerWhileBuildingBehaviour,
    pub initial_build: bool,
}

impl Settings {
    /// Merge `cli` over `cfg`.
    ///
    /// Non-empty list flags replace the file's lists; boolean flags can only
    /// switch features on (or, for `--no-initial-build`, off).
    pub fn resolve(cfg: &ConfigFile, cli: &CliArgs) -> Result<Self> {
        let build = BuildSettings {
            program: cfg.build.program.clone(),
            args: cfg.build.args.clone(),
            main: cli.main.clone().unwrap_or_else(|| cfg.build.main.clone()),
            output: cli.output.clone().or_else(|| cfg.build.output.clone()),
        };

        let stop_timeout_ms = cli.stop_timeout_ms.unwrap_or(cfg.config.stop_timeout_ms);
        validate_stop_timeout(stop_timeout_ms)?;

        let exclude = override_list(&cli.exclude, &cfg.watch.exclude);
        validate_exclude(&exclude)?;

        Ok(Self {
            build,
            extensions: override_list(&cli.extensions, &cfg.watch.extensions),
            paths: override_list(&cli.paths, &cfg.watch.paths),
            exclude,
            recursive: cli.recursive || cfg.watch.recursive,
            use_hash: cli.use_hash || cfg.watch.use_hash,
            debounce: Duration::from_millis(cli.debounce_ms.unwrap_or(cfg.config.debounce_ms)),
            stop_timeout: Duration::from_millis(stop_timeout_ms),
            behaviour: cli
                .while_building
                .unwrap_or(cfg.config.triggered_while_building_behaviour),
            initial_build: cfg.config.initial_build && !cli.no_initial_build,
        })
    }
}

fn override_list(cli: &[String], file: &[String]) -> Vec<String> {
    if cli.is_empty() {
        file.to_vec()
    } else {
        cli.to_vec()
    }
}

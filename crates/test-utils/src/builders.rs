#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use hotbuild::build::BuildSpec;
use hotbuild::cli::CliArgs;
use hotbuild::config::{ConfigFile, RawConfigFile, Settings};
use hotbuild::engine::CoreRuntime;
use hotbuild::fs::{FileSystem, RealFileSystem};
use hotbuild::types::TriggerWhileBuildingBehaviour;

/// Builder for `Settings` starting from the built-in defaults.
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        let cfg = ConfigFile::try_from(RawConfigFile::default())
            .expect("default config must be valid");
        let settings =
            Settings::resolve(&cfg, &CliArgs::default()).expect("default settings must resolve");
        Self { settings }
    }

    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.settings.extensions = exts.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn path(mut self, path: &str) -> Self {
        self.settings.paths.push(path.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.settings.exclude.push(pattern.to_string());
        self
    }

    pub fn main(mut self, main: &str) -> Self {
        self.settings.build.main = main.to_string();
        self
    }

    pub fn output(mut self, output: &str) -> Self {
        self.settings.build.output = Some(output.to_string());
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.settings.debounce = Duration::from_millis(ms);
        self
    }

    pub fn stop_timeout_ms(mut self, ms: u64) -> Self {
        self.settings.stop_timeout = Duration::from_millis(ms);
        self
    }

    pub fn behaviour(mut self, behaviour: TriggerWhileBuildingBehaviour) -> Self {
        self.settings.behaviour = behaviour;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.settings.use_hash = val;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A fake project root; nothing on disk is touched through it.
pub fn project_root() -> PathBuf {
    PathBuf::from("/work/app")
}

/// Resolve the build spec for `settings` inside `root`.
pub fn spec_for(settings: &Settings, root: &Path) -> BuildSpec {
    BuildSpec::resolve(root, &settings.build).expect("build spec must resolve")
}

/// Core runtime over the real filesystem.
pub fn core_for(settings: &Settings, root: &Path) -> CoreRuntime {
    core_with_fs(settings, root, Arc::new(RealFileSystem))
}

pub fn core_with_fs(settings: &Settings, root: &Path, fs: Arc<dyn FileSystem>) -> CoreRuntime {
    let spec = spec_for(settings, root);
    let gate = hotbuild::build_gate(settings, &spec, root, fs).expect("gate must build");
    CoreRuntime::new(gate, settings.behaviour)
}

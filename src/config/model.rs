// src/config/model.rs

use serde::Deserialize;

use crate::exec::DEFAULT_STOP_TIMEOUT;
use crate::types::TriggerWhileBuildingBehaviour;
use crate::watch::DEFAULT_DEBOUNCE;

/// Configuration as deserialized from TOML, before validation.
///
/// ```toml
/// [build]
/// program = "go"
/// args = ["build"]
/// main = "main.go"
/// output = "server"
///
/// [watch]
/// extensions = ["go", "tmpl"]
/// paths = ["./templates"]
/// exclude = ["vendor/**"]
///
/// [config]
/// debounce_ms = 1000
/// triggered_while_building_behaviour = "queue"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub config: ConfigSection,
}

/// Validated configuration. Obtain one through `ConfigFile::try_from`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub build: BuildSection,
    pub watch: WatchSection,
    pub config: ConfigSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(build: BuildSection, watch: WatchSection, config: ConfigSection) -> Self {
        Self { build, watch, config }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Compiler front-end to run.
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments placed before `-o <output>`.
    #[serde(default = "default_build_args")]
    pub args: Vec<String>,

    /// Main source file or pattern; empty means "let the compiler decide".
    #[serde(default)]
    pub main: String,

    /// Output name or path; `None` uses the working directory's base name.
    #[serde(default)]
    pub output: Option<String>,
}

fn default_program() -> String {
    "go".to_string()
}

fn default_build_args() -> Vec<String> {
    vec!["build".to_string()]
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_build_args(),
            main: String::new(),
            output: None,
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Extension allow-list; `"go"` and `".go"` are equivalent, `"*"` matches
    /// everything.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Extra files or directories to watch. The working directory is always
    /// watched.
    #[serde(default)]
    pub paths: Vec<String>,

    /// Globs (relative to the working directory) whose matches never trigger.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Watch directories recursively.
    #[serde(default)]
    pub recursive: bool,

    /// Ignore changes whose file content is byte-identical to the last seen.
    #[serde(default)]
    pub use_hash: bool,
}

fn default_extensions() -> Vec<String> {
    vec!["go".to_string()]
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            paths: Vec::new(),
            exclude: Vec::new(),
            recursive: false,
            use_hash: false,
        }
    }
}

/// `[config]` section: loop behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Triggers within this many milliseconds of the last accepted one are
    /// suppressed.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Time a stopped instance gets before it is killed.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,

    /// `"queue"` (default) or `"ignore"`.
    #[serde(default)]
    pub triggered_while_building_behaviour: TriggerWhileBuildingBehaviour,

    /// Build once at startup without waiting for a change.
    #[serde(default = "default_initial_build")]
    pub initial_build: bool,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE.as_millis() as u64
}

fn default_stop_timeout_ms() -> u64 {
    DEFAULT_STOP_TIMEOUT.as_millis() as u64
}

fn default_initial_build() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            stop_timeout_ms: default_stop_timeout_ms(),
            triggered_while_building_behaviour: TriggerWhileBuildingBehaviour::default(),
            initial_build: default_initial_build(),
        }
    }
}

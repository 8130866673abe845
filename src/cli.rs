// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::types::TriggerWhileBuildingBehaviour;

/// Command-line arguments for `hotbuild`.
///
/// Every option overrides the corresponding value from the config file.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hotbuild",
    version,
    about = "Rebuild and restart a program whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Hotbuild.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Main source file or pattern passed to the compiler.
    #[arg(long, value_name = "PATTERN")]
    pub main: Option<String>,

    /// Output binary name or path (default: working directory name).
    #[arg(short = 'o', long, value_name = "NAME")]
    pub output: Option<String>,

    /// Watched file extensions, e.g. `go,tmpl`. `*` watches everything.
    #[arg(long = "ext", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Additional file or directory to watch (repeatable).
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// Glob of paths to ignore, relative to the working directory (repeatable).
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Watch directories recursively.
    #[arg(long)]
    pub recursive: bool,

    /// Skip rebuilds when a changed file's content is byte-identical.
    #[arg(long)]
    pub use_hash: bool,

    /// Suppress triggers within this many milliseconds of the last one.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Time the old instance gets to exit before it is killed.
    #[arg(long, value_name = "MS")]
    pub stop_timeout_ms: Option<u64>,

    /// What to do with a trigger while a build is running (queue, ignore).
    #[arg(long, value_name = "MODE")]
    pub while_building: Option<TriggerWhileBuildingBehaviour>,

    /// Do not build at startup; wait for the first change.
    #[arg(long)]
    pub no_initial_build: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration, but don't build or watch.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

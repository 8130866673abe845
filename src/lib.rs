// src/lib.rs

pub mod build;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::build::{BuildRunner, BuildSpec, CommandBuildBackend};
use crate::cli::CliArgs;
use crate::config::{load_config, Settings};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent};
use crate::errors::{HotbuildError, Result};
use crate::exec::{ProcessSupervisor, RealCycleBackend, TokioLauncher};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::{
    spawn_watcher, ContentHashes, EventDebouncer, EventGate, ExtensionSet, PathFilter, WatchTarget,
};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - build spec resolution
/// - event gate / core / runtime
/// - cycle worker (build runner + process supervisor)
/// - file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = std::env::current_dir().map_err(HotbuildError::WorkingDir)?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let cfg = load_config(fs.as_ref(), &cwd, args.config.as_deref())?;
    let settings = Settings::resolve(&cfg, &args)?;
    let spec = BuildSpec::resolve(&cwd, &settings.build)?;
    let target = WatchTarget::new(&cwd, &settings.paths);

    if args.dry_run {
        print_dry_run(&settings, &spec, &target);
        return Ok(());
    }

    let gate = build_gate(&settings, &spec, &cwd, fs)?;
    let core = CoreRuntime::new(gate, settings.behaviour);

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let runner = BuildRunner::new(CommandBuildBackend, spec.clone());
    let supervisor = ProcessSupervisor::new(TokioLauncher, spec.output(), settings.stop_timeout)
        .with_exit_reports(rt_tx.clone());
    let cycles = RealCycleBackend::new(runner, supervisor, rt_tx.clone());

    info!(paths = %target, "initialising watcher");
    let _watcher_handle = spawn_watcher(&target, settings.recursive, rt_tx.clone())?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    if settings.initial_build {
        rt_tx
            .send(RuntimeEvent::ManualTrigger { at: Instant::now() })
            .await
            .map_err(|e| HotbuildError::Other(e.into()))?;
    }

    let runtime = Runtime::new(core, rt_rx, cycles);
    runtime.run().await
}

/// Assemble the event gate from resolved settings.
///
/// The path filter ignores `spec.output()`; exclude globs are relative to
/// `cwd`; content hashing reads through `fs`.
pub fn build_gate(
    settings: &Settings,
    spec: &BuildSpec,
    cwd: &Path,
    fs: Arc<dyn FileSystem>,
) -> Result<EventGate> {
    let extensions = ExtensionSet::normalize(&settings.extensions);
    if extensions.is_empty() {
        warn!("no watched extensions configured; changes will never trigger a build");
    }

    let filter = PathFilter::new(cwd, spec.output(), extensions).with_exclude(&settings.exclude)?;
    let gate = EventGate::new(filter, EventDebouncer::new(settings.debounce));

    Ok(if settings.use_hash {
        gate.with_content_hashes(ContentHashes::new(fs))
    } else {
        gate
    })
}

/// Simple dry-run output: print the resolved build and watch settings.
fn print_dry_run(settings: &Settings, spec: &BuildSpec, target: &WatchTarget) {
    println!("hotbuild dry-run");
    println!("  build: {} {}", spec.program(), spec.args().join(" "));
    println!("  output: {}", spec.output().display());
    println!("  extensions: {}", ExtensionSet::normalize(&settings.extensions));
    println!("  watch: {target}");
    if !settings.exclude.is_empty() {
        println!("  exclude: {:?}", settings.exclude);
    }
    println!("  recursive: {}", settings.recursive);
    println!("  use_hash: {}", settings.use_hash);
    println!("  debounce: {:?}", settings.debounce);
    println!("  stop_timeout: {:?}", settings.stop_timeout);
    println!("  while_building: {:?}", settings.behaviour);
    println!("  initial_build: {}", settings.initial_build);
}

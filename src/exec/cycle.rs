// src/exec/cycle.rs

//! The build + restart unit of work and the background worker that runs it.
//!
//! The runtime talks to a [`CycleBackend`] instead of running builds itself,
//! so the watch loop never blocks on a compiler or a child process.
//! [`RealCycleBackend`] forwards requests to [`spawn_cycle_worker`]; tests can
//! provide their own backend that reports scripted outcomes.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tracing::{debug, error, info};

use crate::build::{BuildBackend, BuildOutcome, BuildRunner};
use crate::engine::RuntimeEvent;
use crate::errors::{Error, Result};
use crate::exec::process::ProcessLauncher;
use crate::exec::supervisor::{ProcessSupervisor, RestartReport};
use crate::types::BoxFuture;

/// A request to build and, on success, restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleRequest {
    pub id: u64,
    /// Path whose change caused this cycle; `None` for the initial build.
    pub trigger: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Build failed; the running instance was left untouched.
    BuildFailed(BuildOutcome),
    /// Build succeeded and a restart was attempted.
    Restarted(RestartReport),
    /// The unit of work panicked; the worker carries on.
    Panicked { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub id: u64,
    pub outcome: CycleOutcome,
}

/// Trait abstracting where build/restart cycles run.
pub trait CycleBackend: Send {
    /// Hand a cycle to the backend. Must return without waiting for the
    /// cycle; completion is reported as `RuntimeEvent::CycleFinished`.
    fn start_cycle(&mut self, request: CycleRequest) -> BoxFuture<'_, Result<()>>;

    /// Stop the running instance (bounded) before the process exits.
    fn shutdown(&mut self) -> BoxFuture<'_, Result<()>>;
}

/// Messages accepted by the background worker.
#[derive(Debug)]
pub enum WorkerMessage {
    Run(CycleRequest),
    Shutdown(oneshot::Sender<()>),
}

/// Build runner and supervisor, owned together by the worker.
struct CycleUnit<B: BuildBackend, L: ProcessLauncher> {
    runner: BuildRunner<B>,
    supervisor: ProcessSupervisor<L>,
}

impl<B: BuildBackend, L: ProcessLauncher> CycleUnit<B, L> {
    async fn run(&mut self, request: &CycleRequest) -> CycleOutcome {
        debug!(cycle = request.id, trigger = ?request.trigger, "running build/restart cycle");
        let outcome = self.runner.build().await;
        if !outcome.is_success() {
            return CycleOutcome::BuildFailed(outcome);
        }
        CycleOutcome::Restarted(self.supervisor.restart().await)
    }
}

/// Spawn the background worker.
///
/// Requests are handled strictly one at a time, so at most one build and at
/// most one restart are ever in progress. Each cycle runs in its own Tokio
/// task; a panic there is reported as [`CycleOutcome::Panicked`] and the
/// worker keeps its runner and supervisor.
///
/// Once `stopping` turns true, a completion report that cannot be delivered
/// is dropped instead of waited on.
pub fn spawn_cycle_worker<B, L>(
    runner: BuildRunner<B>,
    supervisor: ProcessSupervisor<L>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    mut stopping: watch::Receiver<bool>,
) -> mpsc::Sender<WorkerMessage>
where
    B: BuildBackend + 'static,
    L: ProcessLauncher + 'static,
{
    let (tx, mut rx) = mpsc::channel::<WorkerMessage>(8);
    let unit = Arc::new(Mutex::new(CycleUnit { runner, supervisor }));

    tokio::spawn(async move {
        info!("cycle worker started");

        while let Some(msg) = rx.recv().await {
            match msg {
                WorkerMessage::Run(request) => {
                    let report = run_isolated(Arc::clone(&unit), request).await;
                    let delivered = tokio::select! {
                        res = runtime_tx.send(RuntimeEvent::CycleFinished(report)) => res.is_ok(),
                        _ = wait_until_stopping(&mut stopping) => {
                            debug!("shutting down; dropping cycle report");
                            true
                        }
                    };
                    if !delivered {
                        debug!("runtime channel closed; stopping cycle worker");
                        break;
                    }
                }
                WorkerMessage::Shutdown(reply) => {
                    let stopped = unit.lock().await.supervisor.stop().await;
                    debug!(?stopped, "cycle worker stopped the running instance");
                    let _ = reply.send(());
                    break;
                }
            }
        }

        info!("cycle worker finished");
    });

    tx
}

/// Resolves once shutdown has begun. Never resolves if the backend is gone
/// without signalling it.
async fn wait_until_stopping(stopping: &mut watch::Receiver<bool>) {
    loop {
        if *stopping.borrow_and_update() {
            return;
        }
        if stopping.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn run_isolated<B, L>(unit: Arc<Mutex<CycleUnit<B, L>>>, request: CycleRequest) -> CycleReport
where
    B: BuildBackend + 'static,
    L: ProcessLauncher + 'static,
{
    let id = request.id;

    let task = tokio::spawn(async move {
        let mut unit = unit.lock().await;
        unit.run(&request).await
    });

    let outcome = match task.await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(cycle = id, error = %err, "build/restart cycle panicked");
            CycleOutcome::Panicked {
                message: err.to_string(),
            }
        }
    };

    CycleReport { id, outcome }
}

/// Real backend used in production.
pub struct RealCycleBackend {
    tx: mpsc::Sender<WorkerMessage>,
    stopping: watch::Sender<bool>,
}

impl RealCycleBackend {
    /// Create the backend, spawning the worker immediately.
    pub fn new<B, L>(
        runner: BuildRunner<B>,
        supervisor: ProcessSupervisor<L>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self
    where
        B: BuildBackend + 'static,
        L: ProcessLauncher + 'static,
    {
        let (stopping, stopping_rx) = watch::channel(false);
        let tx = spawn_cycle_worker(runner, supervisor, runtime_tx, stopping_rx);
        Self { tx, stopping }
    }
}

impl CycleBackend for RealCycleBackend {
    fn start_cycle(&mut self, request: CycleRequest) -> BoxFuture<'_, Result<()>> {
        let tx = self.tx.clone();
        Box::pin(async move {
            tx.send(WorkerMessage::Run(request))
                .await
                .map_err(|e| Error::msg(format!("cycle worker unavailable: {e}")))?;
            Ok(())
        })
    }

    fn shutdown(&mut self) -> BoxFuture<'_, Result<()>> {
        self.stopping.send_replace(true);
        let tx = self.tx.clone();
        Box::pin(async move {
            let (reply_tx, reply_rx) = oneshot::channel();
            if tx.send(WorkerMessage::Shutdown(reply_tx)).await.is_err() {
                debug!("cycle worker already gone at shutdown");
                return Ok(());
            }
            let _ = reply_rx.await;
            Ok(())
        })
    }
}

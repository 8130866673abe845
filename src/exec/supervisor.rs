// src/exec/supervisor.rs

//! Lifecycle of the single running instance of the program under
//! development.

use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::engine::RuntimeEvent;
use crate::exec::process::{ChildProcess, ProcessLauncher};

/// Extra time allowed for the hard kill after `stop_timeout` has elapsed.
pub const KILL_GRACE: Duration = Duration::from_secs(5);

/// Default time an instance gets to exit after SIGTERM.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    NoProcess,
    Running,
    /// Transient: a stop is in progress inside `restart` or `stop`.
    Terminating,
}

/// How stopping the previous instance went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The instance had already exited on its own.
    AlreadyExited,
    /// Exited after the termination request.
    Terminated,
    /// Ignored the termination request and was killed.
    Killed,
    /// Could not be confirmed dead within the bounded wait.
    Unresponsive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartReport {
    /// `None` when there was no previous instance.
    pub stopped: Option<StopOutcome>,
    /// Generation of the new instance, `None` if the launch failed.
    pub launched: Option<u64>,
}

struct ActiveChild {
    generation: u64,
    pid: Option<u32>,
    stop_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<StopOutcome>,
}

/// Owns at most one live child instance.
///
/// `restart` always stops the previous instance first (terminate, bounded
/// wait, hard kill) and then launches a new one, regardless of how the stop
/// went. It returns as soon as the new instance is spawned; a supervision
/// task per instance waits for its exit.
pub struct ProcessSupervisor<L: ProcessLauncher> {
    launcher: L,
    program: PathBuf,
    stop_timeout: Duration,
    state: SupervisorState,
    active: Option<ActiveChild>,
    generation: u64,
    exit_tx: Option<mpsc::Sender<RuntimeEvent>>,
}

impl<L: ProcessLauncher> std::fmt::Debug for ProcessSupervisor<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("program", &self.program)
            .field("stop_timeout", &self.stop_timeout)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> ProcessSupervisor<L> {
    pub fn new(launcher: L, program: impl Into<PathBuf>, stop_timeout: Duration) -> Self {
        Self {
            launcher,
            program: program.into(),
            stop_timeout,
            state: SupervisorState::NoProcess,
            active: None,
            generation: 0,
            exit_tx: None,
        }
    }

    /// Report instances that exit on their own as `RuntimeEvent::ChildExited`.
    pub fn with_exit_reports(mut self, tx: mpsc::Sender<RuntimeEvent>) -> Self {
        self.exit_tx = Some(tx);
        self
    }

    pub fn state(&self) -> SupervisorState {
        match &self.active {
            Some(active) if active.handle.is_finished() => SupervisorState::NoProcess,
            _ => self.state,
        }
    }

    /// Generation of the most recently launched instance (0 = none yet).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn restart(&mut self) -> RestartReport {
        let stopped = self.stop().await;
        let launched = self.launch();
        RestartReport { stopped, launched }
    }

    /// Stop the current instance, if any.
    pub async fn stop(&mut self) -> Option<StopOutcome> {
        let active = self.active.take()?;
        let outcome = self.stop_active(active).await;
        self.state = SupervisorState::NoProcess;
        Some(outcome)
    }

    async fn stop_active(&mut self, mut active: ActiveChild) -> StopOutcome {
        let generation = active.generation;

        if active.handle.is_finished() {
            debug!(generation, "previous instance already exited");
            return match active.handle.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(generation, error = %err, "supervision task failed");
                    StopOutcome::AlreadyExited
                }
            };
        }

        self.state = SupervisorState::Terminating;
        info!(generation, pid = ?active.pid, "stopping previous instance");

        if let Some(stop) = active.stop_tx.take() {
            if stop.send(()).is_err() {
                debug!(generation, "previous instance exited while stopping");
            }
        }

        match timeout(self.stop_timeout + KILL_GRACE, &mut active.handle).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                error!(generation, error = %err, "supervision task failed while stopping");
                StopOutcome::Unresponsive
            }
            Err(_) => {
                error!(
                    generation,
                    pid = ?active.pid,
                    "previous instance did not exit after kill; starting the new one anyway"
                );
                StopOutcome::Unresponsive
            }
        }
    }

    fn launch(&mut self) -> Option<u64> {
        info!(program = ?self.program, "starting instance");

        let child = match self.launcher.launch(&self.program) {
            Ok(child) => child,
            Err(err) => {
                error!(program = ?self.program, error = %format!("{err:#}"), "failed to start instance");
                self.state = SupervisorState::NoProcess;
                return None;
            }
        };

        self.generation += 1;
        let generation = self.generation;
        let pid = child.id();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(supervise(
            child,
            generation,
            stop_rx,
            self.stop_timeout,
            self.exit_tx.clone(),
        ));

        info!(generation, ?pid, "instance started");
        self.active = Some(ActiveChild {
            generation,
            pid,
            stop_tx: Some(stop_tx),
            handle,
        });
        self.state = SupervisorState::Running;
        Some(generation)
    }
}

/// Wait for the instance to exit, or stop it when asked.
///
/// Stopped instances do not report `ChildExited`.
async fn supervise(
    mut child: Box<dyn ChildProcess>,
    generation: u64,
    stop_rx: oneshot::Receiver<()>,
    stop_timeout: Duration,
    exit_tx: Option<mpsc::Sender<RuntimeEvent>>,
) -> StopOutcome {
    tokio::select! {
        res = child.wait() => {
            match res {
                Ok(report) => {
                    if report.success {
                        info!(generation, "instance exited");
                    } else {
                        warn!(generation, exit_code = ?report.code, "instance exited with failure");
                    }
                    if let Some(tx) = exit_tx {
                        let _ = tx
                            .send(RuntimeEvent::ChildExited { generation, code: report.code })
                            .await;
                    }
                }
                Err(err) => {
                    error!(generation, error = %format!("{err:#}"), "waiting for instance failed");
                }
            }
            StopOutcome::AlreadyExited
        }

        stop = stop_rx => {
            if stop.is_err() {
                debug!(generation, "supervisor dropped; killing instance");
            }
            terminate(child.as_mut(), generation, stop_timeout).await
        }
    }
}

async fn terminate(child: &mut dyn ChildProcess, generation: u64, stop_timeout: Duration) -> StopOutcome {
    if let Err(err) = child.terminate() {
        warn!(generation, error = %format!("{err:#}"), "termination request failed");
    }

    match timeout(stop_timeout, child.wait()).await {
        Ok(Ok(report)) => {
            debug!(generation, exit_code = ?report.code, "instance terminated");
            return StopOutcome::Terminated;
        }
        Ok(Err(err)) => {
            warn!(generation, error = %format!("{err:#}"), "waiting for terminated instance failed");
        }
        Err(_) => {
            warn!(
                generation,
                timeout_ms = stop_timeout.as_millis() as u64,
                "instance ignored termination request; killing"
            );
        }
    }

    match child.kill().await {
        Ok(()) => StopOutcome::Killed,
        Err(err) => {
            error!(generation, error = %format!("{err:#}"), "kill failed");
            StopOutcome::Unresponsive
        }
    }
}

// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`process`] defines the launch capability and its Tokio implementation.
//! - [`supervisor`] owns the single running instance: start, stop, restart.
//! - [`cycle`] runs build + restart units on a background worker that the
//!   runtime reaches through the [`CycleBackend`] trait.

pub mod cycle;
pub mod process;
pub mod supervisor;

pub use cycle::{
    spawn_cycle_worker, CycleBackend, CycleOutcome, CycleReport, CycleRequest, RealCycleBackend,
    WorkerMessage,
};
pub use process::{ChildProcess, ExitReport, ProcessLauncher, TokioLauncher};
pub use supervisor::{
    ProcessSupervisor, RestartReport, StopOutcome, SupervisorState, DEFAULT_STOP_TIMEOUT,
};

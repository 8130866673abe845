// src/engine/mod.rs

//! Orchestration engine for hotbuild: the watch loop.
//!
//! This module ties together:
//! - the event gate (which filesystem events are build-worthy),
//! - the single-slot cycle queue (what happens when a trigger arrives while a
//!   build is in flight),
//! - the main runtime loop reacting to file changes, watcher errors, cycle
//!   completions, child exits and shutdown.
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::path::PathBuf;
use std::time::Instant;

use crate::exec::CycleReport;
use crate::types::ChangeKind;

/// Events flowing into the runtime from the watcher, the cycle worker, etc.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A watched path changed.
    FileChanged {
        path: PathBuf,
        kind: ChangeKind,
        at: Instant,
    },
    /// The watch mechanism reported an error after startup.
    WatchError { message: String },
    /// Build without a filesystem event (initial build at startup).
    ManualTrigger { at: Instant },
    /// A build/restart cycle finished.
    CycleFinished(CycleReport),
    /// A child instance exited on its own.
    ChildExited {
        generation: u64,
        code: Option<i32>,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod slot;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
pub use slot::{CycleSlot, SlotDecision};
pub use crate::types::TriggerWhileBuildingBehaviour;

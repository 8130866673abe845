// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::engine::slot::{CycleSlot, SlotDecision};
use crate::exec::{CycleOutcome, CycleReport, CycleRequest, StopOutcome};
use crate::types::ChangeKind;
use crate::watch::{EventGate, GateDecision};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand this cycle to the cycle backend.
    StartCycle(CycleRequest),
    /// Stop the running instance and end the loop.
    Shutdown,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Handle a filesystem change: gate it, then try to claim the cycle slot.
pub fn handle_file_change(
    gate: &mut EventGate,
    slot: &mut CycleSlot,
    path: PathBuf,
    kind: ChangeKind,
    at: Instant,
) -> CoreStep {
    match gate.evaluate(&path, kind, at) {
        GateDecision::Ignored(_) => CoreStep::running(Vec::new()),
        GateDecision::Trigger => {
            info!(?path, %kind, "build triggered");
            CoreStep::running(claim_slot(slot, Some(path)))
        }
    }
}

/// Handle a trigger that bypasses the gate (initial build).
pub fn handle_manual_trigger(gate: &mut EventGate, slot: &mut CycleSlot, at: Instant) -> CoreStep {
    gate.stamp(at);
    info!("initial build triggered");
    CoreStep::running(claim_slot(slot, None))
}

pub fn handle_watch_error(message: &str) -> CoreStep {
    warn!(error = %message, "file watcher reported an error");
    CoreStep::running(Vec::new())
}

/// Free the slot and start the queued cycle, if any.
pub fn handle_cycle_finished(slot: &mut CycleSlot, report: CycleReport) -> CoreStep {
    match &report.outcome {
        CycleOutcome::BuildFailed(build) => {
            debug!(cycle = report.id, ?build, "cycle ended without restart");
        }
        CycleOutcome::Restarted(restart) => {
            if matches!(restart.stopped, Some(StopOutcome::Unresponsive)) {
                warn!(cycle = report.id, "previous instance may still be running");
            }
            match restart.launched {
                Some(generation) => debug!(cycle = report.id, generation, "cycle restarted instance"),
                None => debug!(cycle = report.id, "cycle built but could not start instance"),
            }
        }
        CycleOutcome::Panicked { message } => {
            debug!(cycle = report.id, %message, "cycle aborted");
        }
    }

    let mut commands = Vec::new();
    if let Some(next) = slot.finish(report.id) {
        info!(cycle = next.id, trigger = ?next.trigger, "starting queued build");
        commands.push(CoreCommand::StartCycle(next));
    }
    CoreStep::running(commands)
}

pub fn handle_child_exited(generation: u64, code: Option<i32>) -> CoreStep {
    match code {
        Some(0) => info!(generation, "instance exited; waiting for the next change"),
        _ => warn!(generation, exit_code = ?code, "instance exited abnormally; waiting for the next change"),
    }
    CoreStep::running(Vec::new())
}

pub fn handle_shutdown() -> CoreStep {
    CoreStep {
        commands: vec![CoreCommand::Shutdown],
        keep_running: false,
    }
}

fn claim_slot(slot: &mut CycleSlot, trigger: Option<PathBuf>) -> Vec<CoreCommand> {
    match slot.request(trigger) {
        SlotDecision::Start(request) => vec![CoreCommand::StartCycle(request)],
        SlotDecision::Queued => {
            info!(in_flight = ?slot.in_flight(), "build in progress; queued one more");
            Vec::new()
        }
        SlotDecision::Dropped => {
            info!(in_flight = ?slot.in_flight(), "build in progress; trigger ignored");
            Vec::new()
        }
    }
}

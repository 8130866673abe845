// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from channels and handing cycles to the cycle backend. The core can
//! be unit tested without Tokio, channels, or processes; event timestamps are
//! part of the events, so debounce behaviour is deterministic in tests.

use std::time::Instant;

use crate::engine::event_handlers::{
    handle_child_exited, handle_cycle_finished, handle_file_change, handle_manual_trigger,
    handle_shutdown, handle_watch_error, CoreStep,
};
use crate::engine::slot::CycleSlot;
use crate::engine::RuntimeEvent;
use crate::types::TriggerWhileBuildingBehaviour;
use crate::watch::EventGate;

/// Pure core runtime state.
///
/// Owns the event gate (and with it the debounce timestamp) and the cycle
/// slot. It has **no** channels, no Tokio types, and does not perform any
/// process IO.
#[derive(Debug)]
pub struct CoreRuntime {
    gate: EventGate,
    slot: CycleSlot,
}

impl CoreRuntime {
    pub fn new(gate: EventGate, behaviour: TriggerWhileBuildingBehaviour) -> Self {
        Self {
            gate,
            slot: CycleSlot::new(behaviour),
        }
    }

    /// Whether no cycle is in flight.
    pub fn is_idle(&self) -> bool {
        self.slot.is_idle()
    }

    /// Whether a trigger is waiting for the in-flight cycle.
    pub fn has_pending(&self) -> bool {
        self.slot.has_pending()
    }

    /// Instant of the most recently started trigger.
    pub fn last_trigger(&self) -> Option<Instant> {
        self.gate.debouncer().last_trigger()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::FileChanged { path, kind, at } => {
                handle_file_change(&mut self.gate, &mut self.slot, path, kind, at)
            }
            RuntimeEvent::ManualTrigger { at } => {
                handle_manual_trigger(&mut self.gate, &mut self.slot, at)
            }
            RuntimeEvent::WatchError { message } => handle_watch_error(&message),
            RuntimeEvent::CycleFinished(report) => handle_cycle_finished(&mut self.slot, report),
            RuntimeEvent::ChildExited { generation, code } => handle_child_exited(generation, code),
            RuntimeEvent::ShutdownRequested => handle_shutdown(),
        }
    }
}

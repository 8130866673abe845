// src/engine/slot.rs

use std::path::PathBuf;

use tracing::debug;

use crate::exec::CycleRequest;
use crate::types::TriggerWhileBuildingBehaviour;

/// What happened to a trigger handed to [`CycleSlot::request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotDecision {
    /// No cycle was running; start this one now.
    Start(CycleRequest),
    /// A cycle is running; the trigger is remembered for afterwards.
    Queued,
    /// A cycle is running and the trigger was dropped.
    Dropped,
}

/// Guarantees at most one build/restart cycle in flight.
///
/// Semantics:
/// - `Queue`: triggers arriving while a cycle runs coalesce into a single
///   pending entry (the latest path wins). When the cycle finishes exactly
///   one more cycle starts.
/// - `Ignore`: triggers arriving while a cycle runs are dropped.
#[derive(Debug)]
pub struct CycleSlot {
    behaviour: TriggerWhileBuildingBehaviour,
    in_flight: Option<u64>,
    pending: Option<Option<PathBuf>>,
    next_id: u64,
}

impl CycleSlot {
    pub fn new(behaviour: TriggerWhileBuildingBehaviour) -> Self {
        Self {
            behaviour,
            in_flight: None,
            pending: None,
            next_id: 1,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn request(&mut self, trigger: Option<PathBuf>) -> SlotDecision {
        if self.in_flight.is_none() {
            return SlotDecision::Start(self.start(trigger));
        }

        match self.behaviour {
            TriggerWhileBuildingBehaviour::Queue => {
                let merged = self.pending.is_some();
                self.pending = Some(trigger);
                debug!(merged, "trigger queued behind in-flight cycle");
                SlotDecision::Queued
            }
            TriggerWhileBuildingBehaviour::Ignore => SlotDecision::Dropped,
        }
    }

    /// Mark cycle `id` finished. Returns the queued cycle to start next, if
    /// any. Unknown or stale ids change nothing.
    pub fn finish(&mut self, id: u64) -> Option<CycleRequest> {
        if self.in_flight != Some(id) {
            debug!(cycle = id, in_flight = ?self.in_flight, "ignoring completion of unknown cycle");
            return None;
        }
        self.in_flight = None;

        let trigger = self.pending.take()?;
        Some(self.start(trigger))
    }

    fn start(&mut self, trigger: Option<PathBuf>) -> CycleRequest {
        let id = self.next_id;
        self.next_id += 1;
        self.in_flight = Some(id);
        CycleRequest { id, trigger }
    }
}

// src/watch/debounce.rs

use std::time::{Duration, Instant};

/// Default suppression window after an accepted trigger.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

/// Result of asking the debouncer about an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// Fire a build; the trigger timestamp has been updated.
    Accept,
    /// Too close to the last accepted trigger.
    Suppress { since_last: Duration },
}

/// Coarse global debounce over the whole watch target.
///
/// An editor save usually produces several notifications in quick succession;
/// only the first one within `window` of the last accepted trigger fires.
/// The debouncer is owned by a single control loop and is never shared.
#[derive(Debug, Clone)]
pub struct EventDebouncer {
    window: Duration,
    last_trigger: Option<Instant>,
}

impl EventDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_trigger: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Instant of the most recently accepted trigger.
    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }

    /// Decide whether an event observed at `now` fires a build.
    ///
    /// Elapsed time `<= window` suppresses. A clock reading earlier than the
    /// last trigger counts as zero elapsed time.
    pub fn check(&mut self, now: Instant) -> DebounceDecision {
        if let Some(last) = self.last_trigger {
            let since_last = now.saturating_duration_since(last);
            if since_last <= self.window {
                return DebounceDecision::Suppress { since_last };
            }
        }
        self.last_trigger = Some(now);
        DebounceDecision::Accept
    }

    /// Record a trigger that bypassed `check` (e.g. the initial build).
    pub fn stamp(&mut self, now: Instant) {
        match self.last_trigger {
            Some(last) if last >= now => {}
            _ => self.last_trigger = Some(now),
        }
    }
}

// src/watch/gate.rs

//! The filter chain every filesystem event passes through before it may
//! become a build trigger.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::types::ChangeKind;
use crate::watch::debounce::{DebounceDecision, EventDebouncer};
use crate::watch::filter::PathFilter;
use crate::watch::hash::{ContentCheck, ContentHashes};

/// Why an event did not become a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    MetadataOnly,
    FilteredPath,
    ContentUnchanged,
    Debounced { since_last: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Trigger,
    Ignored(IgnoreReason),
}

/// Metadata check → [`PathFilter`] → optional [`ContentHashes`] →
/// [`EventDebouncer`].
///
/// Only an accepted event advances the debounce timestamp or records a
/// content hash.
#[derive(Debug)]
pub struct EventGate {
    filter: PathFilter,
    hashes: Option<ContentHashes>,
    debouncer: EventDebouncer,
}

impl EventGate {
    pub fn new(filter: PathFilter, debouncer: EventDebouncer) -> Self {
        Self {
            filter,
            hashes: None,
            debouncer,
        }
    }

    pub fn with_content_hashes(mut self, hashes: ContentHashes) -> Self {
        self.hashes = Some(hashes);
        self
    }

    pub fn debouncer(&self) -> &EventDebouncer {
        &self.debouncer
    }

    pub fn evaluate(&mut self, path: &Path, kind: ChangeKind, at: Instant) -> GateDecision {
        if kind.is_metadata_only() {
            debug!(?path, %kind, "ignoring metadata-only change");
            return GateDecision::Ignored(IgnoreReason::MetadataOnly);
        }

        if self.filter.is_ignored(path) {
            debug!(?path, %kind, "ignoring change to unwatched file");
            return GateDecision::Ignored(IgnoreReason::FilteredPath);
        }

        let content = match self.hashes.as_ref().map(|h| h.check(path)) {
            Some(ContentCheck::Unchanged) => {
                debug!(?path, %kind, "ignoring change with identical content");
                return GateDecision::Ignored(IgnoreReason::ContentUnchanged);
            }
            other => other,
        };

        match self.debouncer.check(at) {
            DebounceDecision::Accept => {
                if let (Some(hashes), Some(check)) = (self.hashes.as_mut(), content) {
                    hashes.record(path, check);
                }
                GateDecision::Trigger
            }
            DebounceDecision::Suppress { since_last } => {
                debug!(
                    ?path,
                    %kind,
                    since_last_ms = since_last.as_millis() as u64,
                    window_ms = self.debouncer.window().as_millis() as u64,
                    "ignoring change inside debounce window"
                );
                GateDecision::Ignored(IgnoreReason::Debounced { since_last })
            }
        }
    }

    /// Stamp the debouncer for a trigger that did not come from the watcher.
    pub fn stamp(&mut self, at: Instant) {
        self.debouncer.stamp(at);
    }
}

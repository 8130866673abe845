// src/watch/mod.rs

//! File watching and change relevance.
//!
//! This module is responsible for:
//! - normalising the extension allow-list ([`extensions`]),
//! - deciding which paths matter ([`filter`]),
//! - collapsing bursts of notifications ([`debounce`]),
//! - optionally skipping content-identical saves ([`hash`]),
//! - wiring those into one decision per event ([`gate`]),
//! - turning `notify` callbacks into runtime events ([`watcher`]).
//!
//! It does **not** know about builds or processes.

pub mod debounce;
pub mod extensions;
pub mod filter;
pub mod gate;
pub mod hash;
pub mod path_utils;
pub mod target;
pub mod watcher;

pub use debounce::{DebounceDecision, EventDebouncer, DEFAULT_DEBOUNCE};
pub use extensions::{ExtensionSet, WILDCARD};
pub use filter::PathFilter;
pub use gate::{EventGate, GateDecision, IgnoreReason};
pub use hash::{compute_file_hash, ContentCheck, ContentHashes};
pub use target::WatchTarget;
pub use watcher::{spawn_watcher, WatcherHandle};

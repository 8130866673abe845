// src/watch/watcher.rs

use std::time::Instant;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::RuntimeEvent;
use crate::errors::{HotbuildError, Result};
use crate::types::ChangeKind;
use crate::watch::target::WatchTarget;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Register every path of `target` with a `notify` watcher and forward
/// events to the runtime.
///
/// - each changed path becomes one `RuntimeEvent::FileChanged`, stamped with
///   the instant the notification arrived;
/// - watcher errors become `RuntimeEvent::WatchError`.
///
/// Failing to create the watcher or to register any path is fatal.
pub fn spawn_watcher(
    target: &WatchTarget,
    recursive: bool,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) =
        mpsc::unbounded_channel::<(notify::Result<Event>, Instant)>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = event_tx.send((res, Instant::now())) {
                // The receiving task is gone; nothing left to notify.
                eprintln!("hotbuild: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )
    .map_err(HotbuildError::WatcherInit)?;

    let mode = if recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };

    info!(paths = %target, recursive, "registering watched paths");
    for path in target.paths() {
        watcher
            .watch(path, mode)
            .map_err(|source| HotbuildError::WatchPath {
                path: path.clone(),
                source,
            })?;
    }

    tokio::spawn(async move {
        while let Some((res, at)) = event_rx.recv().await {
            let forwarded = match res {
                Ok(event) => forward_event(event, at, &runtime_tx).await,
                Err(err) => {
                    runtime_tx
                        .send(RuntimeEvent::WatchError {
                            message: err.to_string(),
                        })
                        .await
                        .is_ok()
                }
            };
            if !forwarded {
                debug!("runtime channel closed; stopping watcher forwarding");
                break;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Returns false once the runtime channel is closed.
async fn forward_event(
    event: Event,
    at: Instant,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) -> bool {
    let kind = ChangeKind::from(&event.kind);
    debug!(?event, %kind, "received notify event");

    for path in event.paths {
        let msg = RuntimeEvent::FileChanged { path, kind, at };
        if runtime_tx.send(msg).await.is_err() {
            return false;
        }
    }
    true
}

// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::CycleBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// The watch loop: drives [`CoreRuntime`] in response to `RuntimeEvent`s and
/// delegates build/restart cycles to a [`CycleBackend`].
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// semantics. Handing a cycle to the backend never waits for the cycle, so
/// the loop keeps consuming (and debouncing) events while a build runs.
pub struct Runtime<C: CycleBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    cycles: C,
}

impl<C: CycleBackend> fmt::Debug for Runtime<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<C: CycleBackend> Runtime<C> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, cycles: C) -> Self {
        Self {
            core,
            event_rx,
            cycles,
        }
    }

    /// Main event loop.
    ///
    /// Runs until shutdown is requested or every event sender is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("hotbuild runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::StartCycle(request) => {
                debug!(cycle = request.id, "dispatching build/restart cycle");
                self.cycles.start_cycle(request).await?;
            }
            CoreCommand::Shutdown => {
                info!("shutting down; stopping running instance");
                self.shutdown_cycles().await;
            }
        }
        Ok(())
    }

    /// Wait for the cycle backend to stop, discarding events meanwhile so
    /// that nothing blocks on a full runtime channel.
    async fn shutdown_cycles(&mut self) {
        let mut shutdown = self.cycles.shutdown();
        let mut draining = true;

        loop {
            tokio::select! {
                res = &mut shutdown => {
                    if let Err(err) = res {
                        error!(error = %err, "failed to stop running instance at shutdown");
                    }
                    return;
                }
                event = self.event_rx.recv(), if draining => match event {
                    Some(event) => debug!(?event, "discarding event during shutdown"),
                    None => draining = false,
                },
            }
        }
    }
}

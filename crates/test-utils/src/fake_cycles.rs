use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use hotbuild::engine::RuntimeEvent;
use hotbuild::errors::Result;
use hotbuild::exec::{CycleBackend, CycleOutcome, CycleReport, CycleRequest, RestartReport};
use hotbuild::types::BoxFuture;
use tokio::sync::mpsc;

/// What the fake backend has seen.
#[derive(Debug, Default)]
pub struct CycleLog {
    pub requests: Vec<CycleRequest>,
    pub shutdowns: usize,
}

/// Cycle backend that finishes each cycle immediately with a scripted
/// outcome, reporting it back through the runtime channel.
pub struct FakeCycleBackend {
    log: Arc<Mutex<CycleLog>>,
    outcomes: VecDeque<CycleOutcome>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl FakeCycleBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            log: Arc::new(Mutex::new(CycleLog::default())),
            outcomes: VecDeque::new(),
            runtime_tx,
        }
    }

    /// Queue the outcome reported for the next unscripted cycle.
    pub fn then(mut self, outcome: CycleOutcome) -> Self {
        self.outcomes.push_back(outcome);
        self
    }

    pub fn log(&self) -> Arc<Mutex<CycleLog>> {
        Arc::clone(&self.log)
    }
}

/// Outcome of a successful cycle that launched instance `generation`.
pub fn restarted(generation: u64) -> CycleOutcome {
    CycleOutcome::Restarted(RestartReport {
        stopped: None,
        launched: Some(generation),
    })
}

impl CycleBackend for FakeCycleBackend {
    fn start_cycle(&mut self, request: CycleRequest) -> BoxFuture<'_, Result<()>> {
        let id = request.id;
        self.log.lock().unwrap().requests.push(request);
        let outcome = self.outcomes.pop_front().unwrap_or_else(|| restarted(id));
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            let report = CycleReport { id, outcome };
            tokio::spawn(async move {
                let _ = tx.send(RuntimeEvent::CycleFinished(report)).await;
            });
            Ok(())
        })
    }

    fn shutdown(&mut self) -> BoxFuture<'_, Result<()>> {
        self.log.lock().unwrap().shutdowns += 1;
        Box::pin(async { Ok(()) })
    }
}

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use hotbuild::exec::{ChildProcess, ExitReport, ProcessLauncher};
use hotbuild::types::BoxFuture;
use tokio::sync::watch;

/// Observable lifecycle steps of fake child instances, numbered from 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessEvent {
    Launched { instance: u64, program: PathBuf },
    LaunchFailed,
    TerminateRequested(u64),
    Killed(u64),
    KillFailed(u64),
}

/// How fake children react to stop requests.
#[derive(Debug, Clone, Copy)]
pub struct ChildBehaviour {
    /// Exit when asked to terminate.
    pub honours_terminate: bool,
    /// `terminate()` returns an error.
    pub terminate_fails: bool,
    /// `kill()` returns an error and the child stays alive.
    pub kill_fails: bool,
}

impl Default for ChildBehaviour {
    fn default() -> Self {
        Self {
            honours_terminate: true,
            terminate_fails: false,
            kill_fails: false,
        }
    }
}

type ExitSender = Arc<watch::Sender<Option<ExitReport>>>;

/// Launcher that creates in-memory children and records what happens to them.
#[derive(Clone)]
pub struct FakeLauncher {
    log: Arc<Mutex<Vec<ProcessEvent>>>,
    controls: Arc<Mutex<HashMap<u64, ExitSender>>>,
    behaviour: ChildBehaviour,
    failing_launches: Arc<Mutex<usize>>,
    next: Arc<Mutex<u64>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::with_behaviour(ChildBehaviour::default())
    }

    pub fn with_behaviour(behaviour: ChildBehaviour) -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            controls: Arc::new(Mutex::new(HashMap::new())),
            behaviour,
            failing_launches: Arc::new(Mutex::new(0)),
            next: Arc::new(Mutex::new(0)),
        }
    }

    /// Make the next `n` launches fail.
    pub fn fail_next_launches(&self, n: usize) {
        *self.failing_launches.lock().unwrap() = n;
    }

    pub fn events(&self) -> Vec<ProcessEvent> {
        self.log.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ProcessEvent::Launched { .. }))
            .count()
    }

    /// Make instance `n` exit on its own with `code`.
    pub fn exit_instance(&self, n: u64, code: i32) {
        if let Some(tx) = self.controls.lock().unwrap().get(&n) {
            tx.send_replace(Some(ExitReport {
                success: code == 0,
                code: Some(code),
            }));
        }
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&mut self, program: &Path) -> Result<Box<dyn ChildProcess>> {
        {
            let mut failing = self.failing_launches.lock().unwrap();
            if *failing > 0 {
                *failing -= 1;
                self.log.lock().unwrap().push(ProcessEvent::LaunchFailed);
                return Err(anyhow!("fake launch failure for {:?}", program));
            }
        }

        let instance = {
            let mut next = self.next.lock().unwrap();
            *next += 1;
            *next
        };

        let (tx, rx) = watch::channel(None);
        let tx = Arc::new(tx);
        self.controls
            .lock()
            .unwrap()
            .insert(instance, Arc::clone(&tx));
        self.log.lock().unwrap().push(ProcessEvent::Launched {
            instance,
            program: program.to_path_buf(),
        });

        Ok(Box::new(FakeChild {
            instance,
            behaviour: self.behaviour,
            log: Arc::clone(&self.log),
            exit_tx: tx,
            exit_rx: rx,
        }))
    }
}

struct FakeChild {
    instance: u64,
    behaviour: ChildBehaviour,
    log: Arc<Mutex<Vec<ProcessEvent>>>,
    exit_tx: ExitSender,
    exit_rx: watch::Receiver<Option<ExitReport>>,
}

impl FakeChild {
    fn record(&self, event: ProcessEvent) {
        self.log.lock().unwrap().push(event);
    }

    fn mark_exited(&self) {
        self.exit_tx.send_replace(Some(ExitReport {
            success: false,
            code: None,
        }));
    }
}

impl ChildProcess for FakeChild {
    fn id(&self) -> Option<u32> {
        Some(10_000 + self.instance as u32)
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitReport>> {
        Box::pin(async move {
            loop {
                let current = *self.exit_rx.borrow_and_update();
                if let Some(report) = current {
                    return Ok(report);
                }
                if self.exit_rx.changed().await.is_err() {
                    return Err(anyhow!("exit channel closed"));
                }
            }
        })
    }

    fn terminate(&mut self) -> Result<()> {
        self.record(ProcessEvent::TerminateRequested(self.instance));
        if self.behaviour.terminate_fails {
            return Err(anyhow!("fake terminate failure"));
        }
        if self.behaviour.honours_terminate {
            self.mark_exited();
        }
        Ok(())
    }

    fn kill(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if self.behaviour.kill_fails {
                self.record(ProcessEvent::KillFailed(self.instance));
                return Err(anyhow!("fake kill failure"));
            }
            self.record(ProcessEvent::Killed(self.instance));
            self.mark_exited();
            Ok(())
        })
    }
}

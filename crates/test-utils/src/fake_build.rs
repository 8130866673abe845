use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use hotbuild::build::{BuildBackend, BuildStatus};
use hotbuild::types::BoxFuture;

/// Scripted result of one fake build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBuild {
    Succeed,
    Fail(i32),
    SpawnError,
    Panic,
}

/// One recorded invocation: program followed by its arguments.
pub type BuildCall = (String, Vec<String>);

/// A build backend that:
/// - records every invocation
/// - replays scripted results, then falls back to `default`
/// - optionally sleeps to simulate a slow compiler
pub struct FakeBuildBackend {
    script: VecDeque<FakeBuild>,
    default: FakeBuild,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<BuildCall>>>,
}

impl FakeBuildBackend {
    pub fn new(default: FakeBuild) -> Self {
        Self {
            script: VecDeque::new(),
            default,
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(FakeBuild::Succeed)
    }

    pub fn failing(code: i32) -> Self {
        Self::new(FakeBuild::Fail(code))
    }

    pub fn then(mut self, result: FakeBuild) -> Self {
        self.script.push_back(result);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared view of the recorded invocations.
    pub fn calls(&self) -> Arc<Mutex<Vec<BuildCall>>> {
        Arc::clone(&self.calls)
    }
}

impl BuildBackend for FakeBuildBackend {
    fn run<'a>(&'a mut self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, anyhow::Result<BuildStatus>> {
        let result = self.script.pop_front().unwrap_or(self.default);
        let delay = self.delay;
        let calls = Arc::clone(&self.calls);

        Box::pin(async move {
            calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));

            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            match result {
                FakeBuild::Succeed => Ok(BuildStatus {
                    success: true,
                    code: Some(0),
                }),
                FakeBuild::Fail(code) => Ok(BuildStatus {
                    success: false,
                    code: Some(code),
                }),
                FakeBuild::SpawnError => Err(anyhow!("fake compiler not found")),
                FakeBuild::Panic => panic!("fake compiler panicked"),
            }
        })
    }
}

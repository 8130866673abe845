// src/build/runner.rs

//! Invoking the external compiler.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::Command;
use tracing::{error, info};

use crate::build::spec::BuildSpec;
use crate::types::BoxFuture;

/// Exit status of a build invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStatus {
    pub success: bool,
    /// `None` when the compiler was terminated by a signal.
    pub code: Option<i32>,
}

/// What a build attempt amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Succeeded,
    /// The compiler ran and reported failure.
    Failed { code: Option<i32> },
    /// The compiler could not be run at all.
    SpawnFailed { message: String },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Succeeded)
    }
}

/// Capability that runs `program args...` with inherited stdout/stderr.
///
/// Production code uses [`CommandBuildBackend`]; tests substitute a fake that
/// records invocations and returns scripted statuses.
pub trait BuildBackend: Send {
    fn run<'a>(&'a mut self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, Result<BuildStatus>>;
}

/// Runs the compiler as a real child process.
#[derive(Debug, Clone, Default)]
pub struct CommandBuildBackend;

impl BuildBackend for CommandBuildBackend {
    fn run<'a>(&'a mut self, program: &'a str, args: &'a [String]) -> BoxFuture<'a, Result<BuildStatus>> {
        Box::pin(async move {
            let status = Command::new(program)
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .kill_on_drop(true)
                .status()
                .await
                .with_context(|| format!("running build program '{program}'"))?;

            Ok(BuildStatus {
                success: status.success(),
                code: status.code(),
            })
        })
    }
}

/// Runs one build per call using a fixed [`BuildSpec`].
///
/// There is no retry: a failed build leaves the running instance alone and
/// waits for the next trigger.
#[derive(Debug)]
pub struct BuildRunner<B: BuildBackend> {
    backend: B,
    spec: BuildSpec,
}

impl<B: BuildBackend> BuildRunner<B> {
    pub fn new(backend: B, spec: BuildSpec) -> Self {
        Self { backend, spec }
    }

    pub async fn build(&mut self) -> BuildOutcome {
        info!(
            program = %self.spec.program(),
            args = ?self.spec.args(),
            "building"
        );

        match self.backend.run(self.spec.program(), self.spec.args()).await {
            Ok(BuildStatus { success: true, .. }) => {
                info!(output = ?self.spec.output(), "build succeeded");
                BuildOutcome::Succeeded
            }
            Ok(BuildStatus { success: false, code }) => {
                error!(exit_code = ?code, "build failed; keeping the previous instance");
                BuildOutcome::Failed { code }
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), "build could not be started");
                BuildOutcome::SpawnFailed {
                    message: format!("{err:#}"),
                }
            }
        }
    }
}

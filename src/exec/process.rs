// src/exec/process.rs

//! Process launch capability.
//!
//! [`ProcessLauncher`] starts the program under development and hands back a
//! [`ChildProcess`] the supervisor can wait on, ask to terminate, and kill.
//! [`TokioLauncher`] is the real implementation; tests plug in fakes.

use std::path::Path;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::process::{Child, Command};

use crate::types::BoxFuture;

/// How a child instance exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    pub success: bool,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

/// A running instance of the program under development.
pub trait ChildProcess: Send {
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit. Must be cancel-safe: the supervisor
    /// drops an in-progress wait when it decides to stop the process.
    fn wait(&mut self) -> BoxFuture<'_, Result<ExitReport>>;

    /// Ask the process to exit (SIGTERM on Unix).
    fn terminate(&mut self) -> Result<()>;

    /// Forcefully kill the process and reap it.
    fn kill(&mut self) -> BoxFuture<'_, Result<()>>;
}

pub trait ProcessLauncher: Send {
    fn launch(&mut self, program: &Path) -> Result<Box<dyn ChildProcess>>;
}

/// Launches the program with inherited stdout/stderr and a null stdin.
#[derive(Debug, Clone, Default)]
pub struct TokioLauncher;

impl ProcessLauncher for TokioLauncher {
    fn launch(&mut self, program: &Path) -> Result<Box<dyn ChildProcess>> {
        let child = Command::new(program)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning {:?}", program))?;
        Ok(Box::new(TokioChild { child }))
    }
}

#[derive(Debug)]
struct TokioChild {
    child: Child,
}

impl ChildProcess for TokioChild {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    fn wait(&mut self) -> BoxFuture<'_, Result<ExitReport>> {
        Box::pin(async move {
            let status = self.child.wait().await.context("waiting for child process")?;
            Ok(ExitReport {
                success: status.success(),
                code: status.code(),
            })
        })
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> Result<()> {
        // Already reaped; nothing to signal.
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error())
                .with_context(|| format!("sending SIGTERM to pid {pid}"));
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) -> Result<()> {
        self.child.start_kill().context("terminating child process")
    }

    fn kill(&mut self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move { self.child.kill().await.context("killing child process") })
    }
}

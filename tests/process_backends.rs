#![cfg(unix)]

use std::error::Error;
use std::path::Path;

use hotbuild::build::{BuildBackend, CommandBuildBackend};
use hotbuild::exec::{ProcessLauncher, TokioLauncher};
use hotbuild_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn build_backend_reports_exit_status() -> TestResult {
    init_tracing();
    let mut backend = CommandBuildBackend;

    let ok = backend.run("sh", &args(&["-c", "exit 0"])).await?;
    assert!(ok.success);
    assert_eq!(ok.code, Some(0));

    let failed = backend.run("sh", &args(&["-c", "exit 3"])).await?;
    assert!(!failed.success);
    assert_eq!(failed.code, Some(3));
    Ok(())
}

#[tokio::test]
async fn build_backend_fails_for_a_missing_program() {
    let mut backend = CommandBuildBackend;
    let res = backend
        .run("hotbuild-no-such-compiler", &args(&["build"]))
        .await;
    assert!(res.is_err());
}

#[tokio::test]
async fn launcher_waits_for_a_real_process() -> TestResult {
    init_tracing();
    let mut launcher = TokioLauncher;

    let mut child = launcher.launch(Path::new("true"))?;
    assert!(child.id().is_some());
    let report = with_timeout(child.wait()).await?;
    assert!(report.success);
    assert_eq!(report.code, Some(0));
    Ok(())
}

#[tokio::test]
async fn launcher_fails_for_a_missing_binary() {
    let mut launcher = TokioLauncher;
    assert!(launcher
        .launch(Path::new("/nonexistent/hotbuild-app"))
        .is_err());
}

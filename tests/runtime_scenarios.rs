use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::sleep;

use hotbuild::build::BuildRunner;
use hotbuild::config::Settings;
use hotbuild::engine::{Runtime, RuntimeEvent};
use hotbuild::exec::{ProcessSupervisor, RealCycleBackend};
use hotbuild::fs::mock::MockFileSystem;
use hotbuild::types::{ChangeKind, TriggerWhileBuildingBehaviour};
use hotbuild_test_utils::builders::{core_with_fs, project_root, spec_for, SettingsBuilder};
use hotbuild_test_utils::fake_build::{BuildCall, FakeBuildBackend};
use hotbuild_test_utils::fake_cycles::FakeCycleBackend;
use hotbuild_test_utils::fake_process::{FakeLauncher, ProcessEvent};
use hotbuild_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

struct Scenario {
    tx: mpsc::Sender<RuntimeEvent>,
    runtime: Runtime<RealCycleBackend>,
    launcher: FakeLauncher,
    calls: Arc<Mutex<Vec<BuildCall>>>,
    expected_args: Vec<String>,
}

fn scenario(settings: Settings, build: FakeBuildBackend) -> Scenario {
    init_tracing();
    let root = project_root();
    let spec = spec_for(&settings, &root);
    let core = core_with_fs(&settings, &root, Arc::new(MockFileSystem::new()));
    let launcher = FakeLauncher::new();
    let calls = build.calls();

    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let runner = BuildRunner::new(build, spec.clone());
    let supervisor = ProcessSupervisor::new(launcher.clone(), spec.output(), settings.stop_timeout)
        .with_exit_reports(tx.clone());
    let cycles = RealCycleBackend::new(runner, supervisor, tx.clone());

    Scenario {
        tx,
        runtime: Runtime::new(core, rx, cycles),
        launcher,
        calls,
        expected_args: spec.args().to_vec(),
    }
}

fn src_main() -> PathBuf {
    project_root().join("src").join("main.go")
}

fn go_settings() -> SettingsBuilder {
    SettingsBuilder::new()
        .extensions(&[".go"])
        .path("./src")
        .stop_timeout_ms(50)
}

fn write(path: PathBuf, at: Instant) -> RuntimeEvent {
    RuntimeEvent::FileChanged {
        path,
        kind: ChangeKind::Write,
        at,
    }
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    with_timeout(async {
        while !cond() {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
}

#[tokio::test]
async fn content_write_builds_once_and_restarts_once() -> TestResult {
    let s = scenario(go_settings().build(), FakeBuildBackend::succeeding());

    s.tx.send(write(src_main(), Instant::now())).await?;
    s.tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(s.runtime.run()).await?;

    let calls = s.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![("go".to_string(), s.expected_args.clone())]);
    assert_eq!(s.launcher.launch_count(), 1);
    // Shutdown stops the instance that the cycle started.
    assert!(s
        .launcher
        .events()
        .contains(&ProcessEvent::TerminateRequested(1)));
    Ok(())
}

#[tokio::test]
async fn two_writes_inside_the_debounce_window_build_once() -> TestResult {
    let s = scenario(go_settings().build(), FakeBuildBackend::succeeding());
    let t0 = Instant::now();

    s.tx.send(write(src_main(), t0)).await?;
    s.tx.send(write(src_main(), t0 + Duration::from_millis(200))).await?;
    s.tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(s.runtime.run()).await?;

    assert_eq!(s.calls.lock().unwrap().len(), 1);
    assert_eq!(s.launcher.launch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn permission_change_does_not_build() -> TestResult {
    let s = scenario(go_settings().build(), FakeBuildBackend::succeeding());

    s.tx.send(RuntimeEvent::FileChanged {
        path: src_main(),
        kind: ChangeKind::Metadata,
        at: Instant::now(),
    })
    .await?;
    s.tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(s.runtime.run()).await?;

    assert!(s.calls.lock().unwrap().is_empty());
    assert_eq!(s.launcher.launch_count(), 0);
    Ok(())
}

#[tokio::test]
async fn failed_build_never_restarts() -> TestResult {
    let s = scenario(go_settings().build(), FakeBuildBackend::failing(1));

    s.tx.send(write(src_main(), Instant::now())).await?;
    s.tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(s.runtime.run()).await?;

    assert_eq!(s.calls.lock().unwrap().len(), 1);
    assert!(s.launcher.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn trigger_during_a_build_is_queued_for_one_more_cycle() -> TestResult {
    let s = scenario(
        go_settings().debounce_ms(20).build(),
        FakeBuildBackend::succeeding().with_delay(Duration::from_millis(200)),
    );
    let Scenario {
        tx,
        runtime,
        launcher,
        calls,
        ..
    } = s;
    let handle = tokio::spawn(runtime.run());
    let t0 = Instant::now();

    tx.send(write(src_main(), t0)).await?;
    tx.send(write(project_root().join("src/a.go"), t0 + Duration::from_millis(50))).await?;
    tx.send(write(project_root().join("src/b.go"), t0 + Duration::from_millis(100))).await?;

    wait_until(|| launcher.launch_count() == 2).await;
    sleep(Duration::from_millis(300)).await;

    assert_eq!(calls.lock().unwrap().len(), 2);
    assert_eq!(launcher.launch_count(), 2);

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(handle).await??;
    Ok(())
}

#[tokio::test]
async fn trigger_during_a_build_is_dropped_when_ignoring() -> TestResult {
    let s = scenario(
        go_settings()
            .debounce_ms(20)
            .behaviour(TriggerWhileBuildingBehaviour::Ignore)
            .build(),
        FakeBuildBackend::succeeding().with_delay(Duration::from_millis(200)),
    );
    let Scenario {
        tx,
        runtime,
        launcher,
        calls,
        ..
    } = s;
    let handle = tokio::spawn(runtime.run());
    let t0 = Instant::now();

    tx.send(write(src_main(), t0)).await?;
    tx.send(write(project_root().join("src/a.go"), t0 + Duration::from_millis(50))).await?;

    wait_until(|| launcher.launch_count() == 1).await;
    sleep(Duration::from_millis(300)).await;

    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(launcher.launch_count(), 1);

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(handle).await??;
    Ok(())
}

#[tokio::test]
async fn runtime_starts_queued_cycle_after_completion() -> TestResult {
    init_tracing();
    let settings = SettingsBuilder::new().debounce_ms(10).build();
    let core = core_with_fs(&settings, &project_root(), Arc::new(MockFileSystem::new()));
    let (tx, rx) = mpsc::channel::<RuntimeEvent>(16);
    let cycles = FakeCycleBackend::new(tx.clone());
    let log = cycles.log();
    let t0 = Instant::now();

    // Both triggers are read before the first completion can arrive.
    tx.send(RuntimeEvent::ManualTrigger { at: t0 }).await?;
    tx.send(write(project_root().join("main.go"), t0 + Duration::from_millis(50)))
        .await?;

    let handle = tokio::spawn(Runtime::new(core, rx, cycles).run());
    wait_until(|| log.lock().unwrap().requests.len() == 2).await;
    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(handle).await??;

    let log = log.lock().unwrap();
    assert_eq!(log.requests[0].id, 1);
    assert_eq!(log.requests[0].trigger, None);
    assert_eq!(log.requests[1].id, 2);
    assert_eq!(log.requests[1].trigger, Some(project_root().join("main.go")));
    assert_eq!(log.shutdowns, 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_during_a_slow_build_survives_an_event_flood() -> TestResult {
    let s = scenario(
        go_settings().build(),
        FakeBuildBackend::succeeding().with_delay(Duration::from_millis(300)),
    );
    let Scenario {
        tx,
        runtime,
        launcher,
        calls,
        ..
    } = s;
    let handle = tokio::spawn(runtime.run());

    tx.send(RuntimeEvent::ManualTrigger { at: Instant::now() }).await?;
    tx.send(RuntimeEvent::ShutdownRequested).await?;

    // Far more events than the runtime channel holds, as a compiler writing
    // into the watched directory would produce.
    let flood_tx = tx.clone();
    tokio::spawn(async move {
        let t0 = Instant::now();
        for i in 0..200u64 {
            let event = write(src_main(), t0 + Duration::from_millis(i));
            if flood_tx.send(event).await.is_err() {
                break;
            }
        }
    });

    with_timeout(handle).await??;

    assert_eq!(calls.lock().unwrap().len(), 1);
    assert_eq!(launcher.launch_count(), 1);
    assert!(launcher
        .events()
        .contains(&ProcessEvent::TerminateRequested(1)));
    Ok(())
}

#[tokio::test]
async fn watch_error_is_not_fatal() -> TestResult {
    let s = scenario(go_settings().build(), FakeBuildBackend::succeeding());

    s.tx.send(RuntimeEvent::WatchError {
        message: "inotify queue overflow".to_string(),
    })
    .await?;
    s.tx.send(write(src_main(), Instant::now())).await?;
    s.tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(s.runtime.run()).await?;

    assert_eq!(s.calls.lock().unwrap().len(), 1);
    assert_eq!(s.launcher.launch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn exited_instance_waits_for_the_next_change() -> TestResult {
    let s = scenario(go_settings().build(), FakeBuildBackend::succeeding());
    let Scenario {
        tx,
        runtime,
        launcher,
        calls,
        ..
    } = s;
    let handle = tokio::spawn(runtime.run());
    let t0 = Instant::now();

    tx.send(write(src_main(), t0)).await?;
    wait_until(|| launcher.launch_count() == 1).await;

    launcher.exit_instance(1, 2);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(launcher.launch_count(), 1);
    assert_eq!(calls.lock().unwrap().len(), 1);

    tx.send(write(src_main(), t0 + Duration::from_secs(2))).await?;
    wait_until(|| launcher.launch_count() == 2).await;
    assert_eq!(calls.lock().unwrap().len(), 2);
    // The exited instance is not stopped again.
    assert!(!launcher
        .events()
        .contains(&ProcessEvent::TerminateRequested(1)));

    tx.send(RuntimeEvent::ShutdownRequested).await?;
    with_timeout(handle).await??;
    Ok(())
}

#[test]
fn core_keeps_running_after_watch_errors_and_child_exits() {
    init_tracing();
    let settings = SettingsBuilder::new().build();
    let mut core = core_with_fs(&settings, &project_root(), Arc::new(MockFileSystem::new()));

    let err = core.step(RuntimeEvent::WatchError {
        message: "watch descriptor removed".to_string(),
    });
    assert!(err.keep_running);
    assert!(err.commands.is_empty());

    let exited = core.step(RuntimeEvent::ChildExited {
        generation: 1,
        code: Some(1),
    });
    assert!(exited.keep_running);
    assert!(exited.commands.is_empty());
    assert!(core.is_idle());
}

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hotbuild::engine::{CoreCommand, RuntimeEvent};
use hotbuild::exec::CycleReport;
use hotbuild::fs::mock::MockFileSystem;
use hotbuild::types::ChangeKind;
use hotbuild::watch::{compute_file_hash, ContentCheck, ContentHashes};
use hotbuild_test_utils::builders::{core_with_fs, project_root, SettingsBuilder};
use hotbuild_test_utils::fake_cycles::restarted;

fn main_go() -> PathBuf {
    project_root().join("main.go")
}

#[test]
fn identical_content_is_not_a_change() {
    let fs = MockFileSystem::new();
    fs.add_file(main_go(), "package main\n");
    let mut hashes = ContentHashes::new(Arc::new(fs.clone()));

    assert!(hashes.has_changed(&main_go()));
    assert!(!hashes.has_changed(&main_go()));

    fs.add_file(main_go(), "package main\n\nfunc main() {}\n");
    assert!(hashes.has_changed(&main_go()));
    assert_eq!(hashes.len(), 1);
}

#[test]
fn removed_files_always_count_as_changed() {
    let fs = MockFileSystem::new();
    fs.add_file(main_go(), "package main\n");
    let mut hashes = ContentHashes::new(Arc::new(fs.clone()));
    hashes.has_changed(&main_go());

    fs.remove_file(main_go());
    assert!(hashes.has_changed(&main_go()));
    assert!(hashes.has_changed(&main_go()));
    assert!(hashes.is_empty());
}

#[test]
fn hash_depends_only_on_content() -> anyhow::Result<()> {
    let fs = MockFileSystem::new();
    fs.add_file("/a.go", "same");
    fs.add_file("/b.go", "same");
    fs.add_file("/c.go", "other");

    let a = compute_file_hash(&fs, "/a.go".as_ref())?;
    let b = compute_file_hash(&fs, "/b.go".as_ref())?;
    let c = compute_file_hash(&fs, "/c.go".as_ref())?;
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(compute_file_hash(&fs, "/missing.go".as_ref()).is_err());
    Ok(())
}

#[test]
fn resave_without_edits_does_not_trigger_with_use_hash() {
    let fs = MockFileSystem::new();
    fs.add_file(main_go(), "package main\n");
    let settings = SettingsBuilder::new().use_hash(true).build();
    let mut core = core_with_fs(&settings, &project_root(), Arc::new(fs.clone()));
    let t0 = Instant::now();

    let first = core.step(RuntimeEvent::FileChanged {
        path: main_go(),
        kind: ChangeKind::Write,
        at: t0,
    });
    assert!(matches!(first.commands.as_slice(), [CoreCommand::StartCycle(_)]));
    core.step(RuntimeEvent::CycleFinished(CycleReport {
        id: 1,
        outcome: restarted(1),
    }));

    let resave = core.step(RuntimeEvent::FileChanged {
        path: main_go(),
        kind: ChangeKind::Write,
        at: t0 + Duration::from_secs(5),
    });
    assert!(resave.commands.is_empty());

    fs.add_file(main_go(), "package main\n// edited\n");
    let edit = core.step(RuntimeEvent::FileChanged {
        path: main_go(),
        kind: ChangeKind::Write,
        at: t0 + Duration::from_secs(10),
    });
    assert!(matches!(edit.commands.as_slice(), [CoreCommand::StartCycle(_)]));
}

#[test]
fn check_alone_records_nothing() {
    let fs = MockFileSystem::new();
    fs.add_file(main_go(), "package main\n");
    let mut hashes = ContentHashes::new(Arc::new(fs.clone()));

    let first = hashes.check(&main_go());
    assert!(matches!(first, ContentCheck::Changed(Some(_))));
    assert!(hashes.is_empty());

    hashes.record(&main_go(), first);
    assert_eq!(hashes.check(&main_go()), ContentCheck::Unchanged);
}

#[test]
fn debounced_edit_is_still_seen_as_a_change_later() {
    let fs = MockFileSystem::new();
    fs.add_file(main_go(), "package main\n");
    let settings = SettingsBuilder::new().use_hash(true).build();
    let mut core = core_with_fs(&settings, &project_root(), Arc::new(fs.clone()));
    let t0 = Instant::now();
    let write_at = |at| RuntimeEvent::FileChanged {
        path: main_go(),
        kind: ChangeKind::Write,
        at,
    };

    let first = core.step(write_at(t0));
    assert!(matches!(first.commands.as_slice(), [CoreCommand::StartCycle(_)]));
    core.step(RuntimeEvent::CycleFinished(CycleReport {
        id: 1,
        outcome: restarted(1),
    }));

    fs.add_file(main_go(), "package main\n// edited\n");
    let debounced = core.step(write_at(t0 + Duration::from_millis(200)));
    assert!(debounced.commands.is_empty());

    // Same bytes as the debounced edit, but different from the last build.
    let touch = core.step(write_at(t0 + Duration::from_secs(5)));
    assert!(matches!(touch.commands.as_slice(), [CoreCommand::StartCycle(_)]));
}

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use hotbuild::watch::{ExtensionSet, PathFilter, WatchTarget};
use hotbuild_test_utils::init_tracing;

fn root() -> PathBuf {
    PathBuf::from("/work/app")
}

fn filter(exts: &[&str]) -> PathFilter {
    PathFilter::new(root(), root().join("app"), ExtensionSet::normalize(exts))
}

#[test]
fn extensions_are_normalised_and_deduplicated() {
    let set = ExtensionSet::normalize(["go", ".tmpl", "", "  go ", ".go"]);
    let exts: Vec<&str> = set.iter().collect();
    assert_eq!(exts, vec![".go", ".tmpl"]);
    assert!(!set.is_wildcard());
}

#[test]
fn empty_extension_set_matches_nothing() {
    let set = ExtensionSet::normalize(Vec::<String>::new());
    assert!(set.is_empty());
    assert!(!set.matches("/work/app/main.go"));
}

#[test]
fn suffix_match_is_plain_string_comparison() {
    init_tracing();
    let f = filter(&["go"]);

    assert!(!f.is_ignored(Path::new("/work/app/main.go")));
    assert!(!f.is_ignored(Path::new("/work/app/src/handlers/user.go")));
    assert!(f.is_ignored(Path::new("/work/app/main.go.swp")));
    assert!(f.is_ignored(Path::new("/work/app/README.md")));
    assert!(f.is_ignored(Path::new("/work/app/go")));
}

#[test]
fn wildcard_matches_every_path_except_the_output() {
    let f = filter(&["*"]);

    assert!(f.extensions().is_wildcard());
    assert!(!f.is_ignored(Path::new("/work/app/README.md")));
    assert!(!f.is_ignored(Path::new("/work/app/Makefile")));
    assert!(f.is_ignored(Path::new("/work/app/app")));
}

#[test]
fn build_output_is_ignored_even_when_it_matches_an_extension() {
    let f = PathFilter::new(root(), root().join("server.go"), ExtensionSet::normalize(["go"]));
    assert!(f.is_ignored(Path::new("/work/app/server.go")));
    assert!(!f.is_ignored(Path::new("/work/app/main.go")));
}

#[test]
fn exclude_globs_apply_relative_to_the_root() -> anyhow::Result<()> {
    let f = filter(&["go"]).with_exclude(&["vendor/**".to_string(), "**/*_test.go".to_string()])?;

    assert!(f.is_ignored(Path::new("/work/app/vendor/lib/lib.go")));
    assert!(f.is_ignored(Path::new("/work/app/pkg/store_test.go")));
    assert!(!f.is_ignored(Path::new("/work/app/pkg/store.go")));
    Ok(())
}

#[test]
fn invalid_exclude_glob_is_rejected() {
    let res = filter(&["go"]).with_exclude(&["src/[".to_string()]);
    assert!(res.is_err());
}

#[test]
fn watch_target_always_contains_cwd_once() {
    let target = WatchTarget::new(&root(), ["./src", "src", "/work/app", "/srv/templates"]);
    assert_eq!(
        target.paths(),
        &[
            PathBuf::from("/work/app/src"),
            PathBuf::from("/work/app"),
            PathBuf::from("/srv/templates"),
        ]
    );

    let only_cwd = WatchTarget::new(&root(), Vec::<String>::new());
    assert_eq!(only_cwd.paths(), &[root()]);
}

proptest! {
    #[test]
    fn files_with_a_watched_extension_pass(
        dirs in proptest::collection::vec("[a-z]{1,6}", 0..3),
        stem in "[a-z]{1,8}",
        ext in "[a-z]{1,4}",
    ) {
        let f = filter(&[ext.as_str()]);
        let mut path = root();
        for d in &dirs {
            path.push(d);
        }
        path.push(format!("{stem}.{ext}"));
        prop_assert!(!f.is_ignored(&path));
    }

    #[test]
    fn longer_suffixes_do_not_match(
        stem in "[a-z]{1,8}",
        ext in "[a-z]{1,4}",
        tail in "[a-z]{1,3}",
    ) {
        let f = filter(&[ext.as_str()]);
        let path = root().join(format!("{stem}.{ext}{tail}"));
        prop_assert!(f.is_ignored(&path));
    }

    #[test]
    fn output_is_always_ignored(
        exts in proptest::collection::vec("[a-z*]{1,4}", 0..4),
    ) {
        let f = PathFilter::new(root(), root().join("app"), ExtensionSet::normalize(&exts));
        prop_assert!(f.is_ignored(&root().join("app")));
    }

    #[test]
    fn normalisation_is_idempotent(raw in proptest::collection::vec("[ .a-z*]{0,5}", 0..6)) {
        let once = ExtensionSet::normalize(&raw);
        let twice = ExtensionSet::normalize(once.iter());
        prop_assert_eq!(once, twice);
    }
}

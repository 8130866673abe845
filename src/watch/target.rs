use std::fmt;
use std::path::{Path, PathBuf};

use crate::watch::path_utils::absolutize;

/// Filesystem locations monitored for changes.
///
/// Always contains the working directory. Relative entries are resolved
/// against it and duplicates are dropped, keeping first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    paths: Vec<PathBuf>,
}

impl WatchTarget {
    pub fn new<I, P>(cwd: &Path, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut out: Vec<PathBuf> = Vec::new();
        let candidates = paths
            .into_iter()
            .map(|p| absolutize(cwd, p.as_ref()))
            .chain(std::iter::once(cwd.to_path_buf()));

        for path in candidates {
            if !out.contains(&path) {
                out.push(path);
            }
        }
        Self { paths: out }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list: Vec<String> = self.paths.iter().map(|p| p.display().to_string()).collect();
        write!(f, "[{}]", list.join(", "))
    }
}

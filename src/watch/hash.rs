use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::{debug, warn};

use crate::fs::FileSystem;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Result of comparing a file against its recorded hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentCheck {
    Unchanged,
    /// New hash, or `None` when the file is gone or unreadable.
    Changed(Option<String>),
}

/// Content hash per file as of the last accepted change, kept in memory only.
///
/// Lets the watch loop skip notifications that did not actually change a
/// file's bytes (e.g. an editor re-saving an unmodified buffer).
#[derive(Debug)]
pub struct ContentHashes {
    fs: Arc<dyn FileSystem>,
    hashes: HashMap<PathBuf, String>,
}

impl ContentHashes {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            hashes: HashMap::new(),
        }
    }

    /// Compare `path` with its recorded hash without updating it.
    ///
    /// Removed or unreadable files always count as changed.
    pub fn check(&self, path: &Path) -> ContentCheck {
        if !self.fs.is_file(path) {
            return ContentCheck::Changed(None);
        }

        let new_hash = match compute_file_hash(self.fs.as_ref(), path) {
            Ok(h) => h,
            Err(err) => {
                warn!(?path, error = %err, "failed to hash changed file; treating as changed");
                return ContentCheck::Changed(None);
            }
        };

        match self.hashes.get(path) {
            Some(old) if *old == new_hash => {
                debug!(?path, "content hash unchanged");
                ContentCheck::Unchanged
            }
            _ => ContentCheck::Changed(Some(new_hash)),
        }
    }

    /// Store the outcome of [`ContentHashes::check`] for an accepted change.
    pub fn record(&mut self, path: &Path, check: ContentCheck) {
        match check {
            ContentCheck::Unchanged => {}
            ContentCheck::Changed(Some(hash)) => {
                self.hashes.insert(path.to_path_buf(), hash);
            }
            ContentCheck::Changed(None) => {
                self.hashes.remove(path);
            }
        }
    }

    /// `check` followed by `record`.
    pub fn has_changed(&mut self, path: &Path) -> bool {
        let check = self.check(path);
        let changed = check != ContentCheck::Unchanged;
        self.record(path, check);
        changed
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

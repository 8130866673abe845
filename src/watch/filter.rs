// src/watch/filter.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::watch::extensions::ExtensionSet;
use crate::watch::path_utils::relative_str;

/// Decides whether a changed path is relevant for a rebuild.
///
/// Allow-list semantics: a path passes only when its suffix matches one of the
/// configured extensions (or the set holds the wildcard). The build output is
/// always ignored so the tool never reacts to its own artifact. Optional
/// `exclude` globs are evaluated relative to `root`.
#[derive(Clone)]
pub struct PathFilter {
    root: PathBuf,
    output: PathBuf,
    extensions: ExtensionSet,
    exclude: GlobSet,
    exclude_patterns: Vec<String>,
}

impl fmt::Debug for PathFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathFilter")
            .field("root", &self.root)
            .field("output", &self.output)
            .field("extensions", &self.extensions)
            .field("exclude", &self.exclude_patterns)
            .finish()
    }
}

impl PathFilter {
    pub fn new(
        root: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        extensions: ExtensionSet,
    ) -> Self {
        Self {
            root: root.into(),
            output: output.into(),
            extensions,
            exclude: GlobSet::empty(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Add glob patterns (e.g. `"vendor/**"`) whose matches are ignored.
    pub fn with_exclude(mut self, patterns: &[String]) -> Result<Self> {
        self.exclude = compile_globs(patterns)?;
        self.exclude_patterns = patterns.to_vec();
        Ok(self)
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn extensions(&self) -> &ExtensionSet {
        &self.extensions
    }

    /// True if a change to `path` must not trigger a build.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if path == self.output {
            return true;
        }

        if !self.exclude_patterns.is_empty() && self.is_excluded(path) {
            return true;
        }

        !self.extensions.matches(&path.to_string_lossy())
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.exclude.is_match(path) {
            return true;
        }
        match relative_str(&self.root, path) {
            Some(rel) => self.exclude.is_match(rel.as_str()),
            None => false,
        }
    }
}

pub(crate) fn compile_globs(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid exclude glob '{pat}'"))?;
        builder.add(glob);
    }
    builder.build().context("building exclude glob set")
}

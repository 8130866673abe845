// src/build/spec.rs

use std::path::{Path, PathBuf};

use crate::errors::{HotbuildError, Result};
use crate::watch::path_utils::absolutize;

/// Flag placed in front of the output path.
pub const OUTPUT_FLAG: &str = "-o";

/// Build-related settings after config and CLI merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Compiler front-end to invoke, e.g. `go`.
    pub program: String,
    /// Leading arguments, e.g. `["build"]`.
    pub args: Vec<String>,
    /// Main source file or pattern; omitted from the arguments when empty.
    pub main: String,
    /// Output name or path; defaults to the working directory's base name.
    pub output: Option<String>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            program: "go".to_string(),
            args: vec!["build".to_string()],
            main: String::new(),
            output: None,
        }
    }
}

/// The fully resolved build invocation.
///
/// `args` is `settings.args ++ ["-o", output] ++ [main]`; `output` is always
/// absolute and is both what gets launched and what the path filter ignores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    program: String,
    args: Vec<String>,
    output: PathBuf,
}

impl BuildSpec {
    pub fn resolve(cwd: &Path, settings: &BuildSettings) -> Result<Self> {
        let output = resolve_output(cwd, settings.output.as_deref())?;

        let mut args = settings.args.clone();
        args.push(OUTPUT_FLAG.to_string());
        args.push(output.to_string_lossy().into_owned());
        if !settings.main.is_empty() {
            args.push(settings.main.clone());
        }

        Ok(Self {
            program: settings.program.clone(),
            args,
            output,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

fn resolve_output(cwd: &Path, output: Option<&str>) -> Result<PathBuf> {
    let mut name = match output.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => name.to_string(),
        None => cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                HotbuildError::ConfigError(format!(
                    "cannot derive an output name from working directory {:?}; pass --output",
                    cwd
                ))
            })?,
    };

    let suffix = std::env::consts::EXE_SUFFIX;
    if !suffix.is_empty() && !name.ends_with(suffix) {
        name.push_str(suffix);
    }

    Ok(absolutize(cwd, Path::new(&name)))
}

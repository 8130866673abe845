// src/build/mod.rs

//! Build invocation: the resolved [`BuildSpec`] and the [`BuildRunner`]
//! that executes it through a pluggable [`BuildBackend`].

pub mod runner;
pub mod spec;

pub use runner::{BuildBackend, BuildOutcome, BuildRunner, BuildStatus, CommandBuildBackend};
pub use spec::{BuildSettings, BuildSpec, OUTPUT_FLAG};

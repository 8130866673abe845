use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{HotbuildError, Result};
use crate::watch::filter::compile_globs;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = HotbuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.build, raw.watch, raw.config))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_program(&cfg.build.program)?;
    validate_stop_timeout(cfg.config.stop_timeout_ms)?;
    validate_exclude(&cfg.watch.exclude)?;
    Ok(())
}

pub(crate) fn validate_program(program: &str) -> Result<()> {
    if program.trim().is_empty() {
        return Err(HotbuildError::ConfigError(
            "[build].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_stop_timeout(ms: u64) -> Result<()> {
    if ms == 0 {
        return Err(HotbuildError::ConfigError(
            "[config].stop_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_exclude(patterns: &[String]) -> Result<()> {
    compile_globs(patterns)
        .map(|_| ())
        .map_err(|e| HotbuildError::ConfigError(format!("{e:#}")))
}

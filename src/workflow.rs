use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::classpath::resolve_class_unit;
use crate::config::Config;
use crate::error::{InjectError, Result};
use crate::inject::{InjectionOutcome, LevelSite};
use crate::smali::TextUnit;

/// One fallback level tried by [`run_inject_workflow`]
#[derive(Clone, Debug, Serialize)]
pub struct Attempt {
    pub level: u8,
    pub result: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct InjectionReport {
    pub unit: PathBuf,
    pub lib_name: String,
    pub attempts: Vec<Attempt>,
    pub outcome: InjectionOutcome,
    pub persisted: bool,
}

/// Read-only view produced by [`run_locate`]
#[derive(Clone, Debug, Serialize)]
pub struct LocateReport {
    pub unit: PathBuf,
    pub levels: Vec<LevelSite>,
}

/// Resolve the unit to edit: `target` itself, or the configured class
/// inside the `target` directory
pub fn resolve_target(target: &Path, cfg: &Config) -> Result<PathBuf> {
    match &cfg.class_name {
        Some(class) => resolve_class_unit(target, class),
        None => Ok(target.to_path_buf()),
    }
}

/// Try each configured fallback level until one succeeds
///
/// A level whose method is missing moves on to the next one; any other
/// error stops the run.
pub fn run_inject_workflow(target: &Path, cfg: &Config) -> Result<InjectionReport> {
    let unit = resolve_target(target, cfg)?;
    let injector = cfg.injector();
    let mut attempts = Vec::with_capacity(cfg.levels.len());

    info!(
        unit = %unit.display(),
        lib = %cfg.lib_name,
        levels = ?cfg.levels,
        dry_run = cfg.dry_run,
        "starting injection"
    );

    for &level in &cfg.levels {
        let result = if cfg.dry_run {
            injector.dry_run_file(&unit, level)
        } else {
            injector.inject_file(&unit, level)
        };

        match result {
            Ok(outcome) => {
                attempts.push(Attempt {
                    level,
                    result: "ok".to_string(),
                });
                return Ok(InjectionReport {
                    unit,
                    lib_name: cfg.lib_name.clone(),
                    attempts,
                    outcome,
                    persisted: !cfg.dry_run,
                });
            }
            Err(err) if err.is_recoverable() => {
                warn!(level, "{err}; trying next level");
                attempts.push(Attempt {
                    level,
                    result: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
    }

    Err(InjectError::FallbacksExhausted {
        tried: attempts.iter().map(|a| a.level).collect(),
    })
}

/// Report the candidate site of every level without editing
pub fn run_locate(target: &Path, cfg: &Config) -> Result<LocateReport> {
    let unit_path = resolve_target(target, cfg)?;
    let unit = TextUnit::read(&unit_path)?;
    let levels = cfg.injector().locate(&unit);
    Ok(LocateReport {
        unit: unit_path,
        levels,
    })
}

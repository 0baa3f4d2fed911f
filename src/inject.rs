//! Splicing `System.loadLibrary` into one class
//!
//! Each call handles exactly one fallback level against one text unit and
//! either persists the edited unit once or leaves it untouched. Trying the
//! next level after `TargetNotFound` is the caller's job, see
//! [`crate::workflow`].

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::error::{InjectError, Result};
use crate::smali::method::methods;
use crate::smali::registers::{find_declaration, RegisterDirective};
use crate::smali::{
    budget_registers, find_insertion_point, find_method, synthesize_static_initializer, MethodSpan,
    Payload, RegisterGrowth, SlotCounting, TextUnit,
};

/// Candidate injection sites, numbered the way callers ask for them
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum FallbackLevel {
    /// `attachBaseContext`, the earliest hook of an `Application`
    AttachBaseContext = 1,
    /// `<clinit>`, created when missing
    StaticInitializer = 2,
    /// `onCreate`
    OnCreate = 3,
}

impl FallbackLevel {
    pub const ALL: [FallbackLevel; 3] = [
        FallbackLevel::AttachBaseContext,
        FallbackLevel::StaticInitializer,
        FallbackLevel::OnCreate,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn method_name(self) -> &'static str {
        match self {
            FallbackLevel::AttachBaseContext => "attachBaseContext",
            FallbackLevel::StaticInitializer => "<clinit>",
            FallbackLevel::OnCreate => "onCreate",
        }
    }
}

impl From<FallbackLevel> for u8 {
    fn from(level: FallbackLevel) -> Self {
        level.number()
    }
}

impl TryFrom<u8> for FallbackLevel {
    type Error = InjectError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(FallbackLevel::AttachBaseContext),
            2 => Ok(FallbackLevel::StaticInitializer),
            3 => Ok(FallbackLevel::OnCreate),
            other => Err(InjectError::InvalidFallbackLevel(other)),
        }
    }
}

/// What a successful call did to the unit
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InjectionAction {
    /// Payload inserted into an existing method
    Spliced {
        method_line: usize,
        insert_at: usize,
        registers: Option<RegisterGrowth>,
    },
    /// A new `<clinit>` was added
    Synthesized { insert_at: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InjectionOutcome {
    pub level: FallbackLevel,
    pub method: &'static str,
    #[serde(flatten)]
    pub action: InjectionAction,
}

/// Read-only view of what a level would patch
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelSite {
    pub level: FallbackLevel,
    pub method: &'static str,
    pub site: Option<HookSite>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HookSite {
    pub method_line: usize,
    pub declaration: Option<(RegisterDirective, u32)>,
    pub param_slots: u32,
    pub insert_at: usize,
    /// Declarations sharing the name; only the first one is patched
    pub overloads: usize,
}

pub struct Injector {
    payload: Payload,
    counting: SlotCounting,
}

impl Injector {
    pub fn new(payload: Payload, counting: SlotCounting) -> Self {
        Self { payload, counting }
    }

    /// Inject into the unit at `path` and write it back
    ///
    /// `level` is validated before the file is touched. On any error the
    /// file is left as it was.
    pub fn inject_file(&self, path: &Path, level: u8) -> Result<InjectionOutcome> {
        self.run(path, level, true)
    }

    /// Same decision procedure as [`Injector::inject_file`] without writing
    pub fn dry_run_file(&self, path: &Path, level: u8) -> Result<InjectionOutcome> {
        self.run(path, level, false)
    }

    fn run(&self, path: &Path, level: u8, persist: bool) -> Result<InjectionOutcome> {
        let level = FallbackLevel::try_from(level)?;
        let mut unit = TextUnit::read(path)?;
        let outcome = self.inject_unit(&mut unit, level)?;
        if persist {
            unit.persist(path)?;
            info!(path = %path.display(), level = level.number(), "unit rewritten");
        }
        Ok(outcome)
    }

    /// Apply one fallback level to an in-memory unit
    ///
    /// The unit is only modified when `Ok` is returned.
    pub fn inject_unit(
        &self,
        unit: &mut TextUnit,
        level: FallbackLevel,
    ) -> Result<InjectionOutcome> {
        let method = level.method_name();

        let Some(span) = find_method(unit, method) else {
            if level == FallbackLevel::StaticInitializer {
                let insert_at = synthesize_static_initializer(unit, &self.payload);
                return Ok(InjectionOutcome {
                    level,
                    method,
                    action: InjectionAction::Synthesized { insert_at },
                });
            }
            debug!(method, "no such method");
            return Err(InjectError::TargetNotFound {
                level: level.number(),
                method,
            });
        };

        let param_slots = self.param_slots(unit, span);
        let registers = budget_registers(unit, span, param_slots)?;
        let insert_at = find_insertion_point(unit, span);
        unit.insert_lines(insert_at, self.payload.splice_lines());
        info!(method, method_line = span.start, insert_at, "payload spliced");

        Ok(InjectionOutcome {
            level,
            method,
            action: InjectionAction::Spliced {
                method_line: span.start,
                insert_at,
                registers,
            },
        })
    }

    /// Report every level's site without editing
    pub fn locate(&self, unit: &TextUnit) -> Vec<LevelSite> {
        let spans = methods(unit);
        FallbackLevel::ALL
            .iter()
            .map(|&level| {
                let method = level.method_name();
                let site = find_method(unit, method).map(|span| HookSite {
                    method_line: span.start,
                    declaration: find_declaration(unit, span).map(|d| (d.directive, d.count)),
                    param_slots: self.param_slots(unit, span),
                    insert_at: find_insertion_point(unit, span),
                    overloads: spans
                        .iter()
                        .filter(|s| s.decl(unit).is_some_and(|decl| decl.name == method))
                        .count(),
                });
                LevelSite {
                    level,
                    method,
                    site,
                }
            })
            .collect()
    }

    fn param_slots(&self, unit: &TextUnit, span: MethodSpan) -> u32 {
        span.decl(unit)
            .map_or(0, |decl| decl.param_slots(self.counting))
    }
}

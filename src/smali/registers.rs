//! Register budgeting for an injected scratch register
//!
//! Parameters always occupy the highest-numbered registers of a method's
//! frame. Raising `.registers` therefore only adds low-numbered locals and
//! shifts `pN` upward, so body lines addressing parameters through `pN`
//! stay valid and `v0` becomes free at method entry.

use serde::Serialize;
use tracing::debug;

use super::line::{indent_of, LineKind};
use super::method::MethodSpan;
use super::unit::TextUnit;
use crate::error::{InjectError, Result};

/// The two mutually exclusive register declaration forms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterDirective {
    /// `.registers N`: total frame size, parameters included
    Registers,
    /// `.locals N`: frame size excluding parameters
    Locals,
}

impl RegisterDirective {
    pub fn keyword(&self) -> &'static str {
        match self {
            RegisterDirective::Registers => ".registers",
            RegisterDirective::Locals => ".locals",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            ".registers" => Some(RegisterDirective::Registers),
            ".locals" => Some(RegisterDirective::Locals),
            _ => None,
        }
    }
}

/// A register declaration found in a method body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterDeclaration {
    /// Line index within the unit
    pub line: usize,
    pub directive: RegisterDirective,
    pub count: u32,
}

impl RegisterDeclaration {
    /// Smallest count for this directive that leaves one scratch register
    /// below the `param_slots` parameter registers
    pub fn needed(&self, param_slots: u32) -> u32 {
        match self.directive {
            RegisterDirective::Registers => self.count.max(param_slots + 1),
            RegisterDirective::Locals => self.count.max(1),
        }
    }
}

/// A rewrite performed by [`budget_registers`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RegisterGrowth {
    pub directive: RegisterDirective,
    pub from: u32,
    pub to: u32,
}

/// Find the register declaration of `span`
///
/// Returns `None` when the body has no declaration or the first one has a
/// count that does not parse.
pub fn find_declaration(unit: &TextUnit, span: MethodSpan) -> Option<RegisterDeclaration> {
    span.body().find_map(|idx| {
        let kind = LineKind::of(unit.line(idx));
        let LineKind::Directive { keyword, rest } = kind else {
            return None;
        };
        let directive = RegisterDirective::from_keyword(keyword)?;
        let count = rest
            .split_whitespace()
            .next()
            .and_then(|token| token.parse().ok());
        Some(count.map(|count| RegisterDeclaration {
            line: idx,
            directive,
            count,
        }))
    })?
}

/// Grow the declaration of `span` so that `v0` is free for the payload
///
/// Leaves the unit untouched when the count already suffices.
///
/// # Errors
/// [`InjectError::MalformedRegisterDeclaration`] when the method has no
/// readable `.registers`/`.locals` line.
pub fn budget_registers(
    unit: &mut TextUnit,
    span: MethodSpan,
    param_slots: u32,
) -> Result<Option<RegisterGrowth>> {
    let Some(decl) = find_declaration(unit, span) else {
        let method = span
            .decl(unit)
            .map_or_else(|| unit.line(span.start).trim().to_string(), |d| d.name.to_string());
        return Err(InjectError::MalformedRegisterDeclaration {
            method,
            line: span.start + 1,
        });
    };

    let needed = decl.needed(param_slots);
    debug!(
        directive = decl.directive.keyword(),
        current = decl.count,
        param_slots,
        needed,
        "register budget"
    );
    if needed <= decl.count {
        return Ok(None);
    }

    let rewritten = format!(
        "{}{} {}",
        indent_of(unit.line(decl.line)),
        decl.directive.keyword(),
        needed
    );
    unit.replace_line(decl.line, rewritten);
    Ok(Some(RegisterGrowth {
        directive: decl.directive,
        from: decl.count,
        to: needed,
    }))
}

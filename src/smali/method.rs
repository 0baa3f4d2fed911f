//! Locating methods inside a text unit

use super::line::LineKind;
use super::signature::MethodDecl;
use super::unit::TextUnit;

/// Line range of one method
///
/// `start` is the `.method` line, `end` the matching `.end method` line or
/// the unit length when the block is never closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MethodSpan {
    pub start: usize,
    pub end: usize,
}

impl MethodSpan {
    /// Body lines, exclusive of the declaration and `.end method`
    pub fn body(&self) -> std::ops::Range<usize> {
        self.start + 1..self.end
    }

    pub fn decl<'u>(&self, unit: &'u TextUnit) -> Option<MethodDecl<'u>> {
        MethodDecl::parse(unit.line(self.start))
    }
}

/// Find the first method named exactly `name`
///
/// Overloads are not distinguished; the first declaration in file order
/// wins.
pub fn find_method(unit: &TextUnit, name: &str) -> Option<MethodSpan> {
    let start = unit
        .lines()
        .iter()
        .position(|line| MethodDecl::parse(line).is_some_and(|decl| decl.name == name))?;
    Some(MethodSpan {
        start,
        end: method_end(unit, start),
    })
}

/// Every method declared in the unit, in file order
pub fn methods(unit: &TextUnit) -> Vec<MethodSpan> {
    let mut spans = Vec::new();
    let mut idx = 0;
    while idx < unit.len() {
        if LineKind::of(unit.line(idx)).is_directive(".method") {
            let end = method_end(unit, idx);
            spans.push(MethodSpan { start: idx, end });
            idx = end;
        }
        idx += 1;
    }
    spans
}

fn method_end(unit: &TextUnit, start: usize) -> usize {
    unit.lines()[start + 1..]
        .iter()
        .position(|line| LineKind::of(line).is_end_of("method"))
        .map_or(unit.len(), |offset| start + 1 + offset)
}

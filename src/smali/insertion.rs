//! Locating the first executable line of a method

use super::line::LineKind;
use super::method::MethodSpan;
use super::unit::TextUnit;

/// Directives that may precede the first instruction
const PROLOGUE_DIRECTIVES: &[&str] = &[
    ".registers",
    ".locals",
    ".param",
    ".prologue",
    ".line",
    ".local",
    ".restart",
    ".source",
];

/// `.end` forms that close prologue metadata
const PROLOGUE_ENDS: &[&str] = &["param", "local", "annotation"];

/// Index of the first executable line in `span`
///
/// Blank lines, comments, register/debug directives and annotation blocks
/// are skipped. A label counts as executable: code inserted before it still
/// runs first. When the body has nothing executable the payload goes right
/// after the declaration.
pub fn find_insertion_point(unit: &TextUnit, span: MethodSpan) -> usize {
    let mut annotation_depth = 0usize;

    for idx in span.body() {
        let kind = LineKind::of(unit.line(idx));

        if kind.is_directive(".annotation") {
            annotation_depth += 1;
            continue;
        }
        if annotation_depth > 0 {
            if kind.is_end_of("annotation") {
                annotation_depth -= 1;
            }
            continue;
        }

        match kind {
            LineKind::Blank | LineKind::Comment => continue,
            LineKind::Directive { keyword, rest } => {
                if PROLOGUE_DIRECTIVES.contains(&keyword) {
                    continue;
                }
                let closes_metadata = keyword == ".end"
                    && rest
                        .split_whitespace()
                        .next()
                        .is_some_and(|what| PROLOGUE_ENDS.contains(&what));
                if closes_metadata {
                    continue;
                }
                return idx;
            }
            LineKind::Label(_) | LineKind::Instruction(_) => return idx,
        }
    }

    span.start + 1
}

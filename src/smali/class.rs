//! Synthesizing a static initializer for classes that lack one

use tracing::info;

use super::line::LineKind;
use super::payload::{Payload, BODY_INDENT};
use super::unit::TextUnit;

/// Header directives after which a new method may be placed
const HEADER_DIRECTIVES: &[&str] = &[".source", ".implements", ".super"];

/// Where a synthesized method goes: right after the first header directive,
/// or after the `.class` line when there is none
pub fn header_insertion_offset(unit: &TextUnit) -> usize {
    unit.lines()
        .iter()
        .position(|line| {
            matches!(
                LineKind::of(line),
                LineKind::Directive { keyword, .. } if HEADER_DIRECTIVES.contains(&keyword)
            )
        })
        .map_or(1, |idx| idx + 1)
        .min(unit.len())
}

/// A complete `<clinit>` that only loads the payload library
pub fn static_initializer_block(payload: &Payload) -> Vec<String> {
    let mut block = vec![
        String::new(),
        ".method static constructor <clinit>()V".to_string(),
        format!("{BODY_INDENT}.registers 1"),
    ];
    block.extend(payload.instructions());
    block.extend([
        String::new(),
        format!("{BODY_INDENT}return-void"),
        ".end method".to_string(),
        String::new(),
    ]);
    block
}

/// Insert a new static initializer and return the index of its first line
pub fn synthesize_static_initializer(unit: &mut TextUnit, payload: &Payload) -> usize {
    let at = header_insertion_offset(unit);
    info!(at, lib = payload.lib_name(), "synthesizing <clinit>");
    unit.insert_lines(at, static_initializer_block(payload));
    at
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smali::method::find_method;
    use crate::smali::registers::find_declaration;

    #[test]
    fn inserts_after_super() {
        let mut unit = TextUnit::parse(
            "# generated\n\n.class public Lcom/example/App;\n.super Landroid/app/Application;\n.source \"App.java\"\n",
        );
        let at = synthesize_static_initializer(&mut unit, &Payload::new("frida-gadget"));
        assert_eq!(at, 4);
        assert_eq!(unit.line(4), "");
        assert_eq!(unit.line(5), ".method static constructor <clinit>()V");
        assert_eq!(unit.line(11), ".end method");
        assert_eq!(unit.line(13), ".source \"App.java\"");
    }

    #[test]
    fn source_before_super_wins() {
        let unit = TextUnit::parse(".class LA;\n.source \"A.java\"\n.super Ljava/lang/Object;\n");
        assert_eq!(header_insertion_offset(&unit), 2);
    }

    #[test]
    fn defaults_to_after_class_line() {
        let unit = TextUnit::parse(".class LA;\n\n.method public foo()V\n.end method\n");
        assert_eq!(header_insertion_offset(&unit), 1);
        assert_eq!(header_insertion_offset(&TextUnit::parse("")), 0);
    }

    #[test]
    fn synthesized_method_has_scratch_register() {
        let mut unit = TextUnit::parse(".class LA;\n.super Ljava/lang/Object;\n");
        synthesize_static_initializer(&mut unit, &Payload::new("gadget"));

        let span = find_method(&unit, "<clinit>").unwrap();
        let slots = span.decl(&unit).unwrap().param_slots(Default::default());
        let decl = find_declaration(&unit, span).unwrap();
        assert_eq!(slots, 0);
        assert!(decl.count >= slots + 1);
        assert_eq!(decl.needed(slots), decl.count);
    }
}

//! The two instructions that load a native library

/// Indentation baksmali uses inside method bodies
pub const BODY_INDENT: &str = "    ";

/// Call issued with the library name in `v0`
pub const LOAD_LIBRARY_CALL: &str =
    "invoke-static {v0}, Ljava/lang/System;->loadLibrary(Ljava/lang/String;)V";

/// `System.loadLibrary(<lib_name>)` as smali
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payload {
    lib_name: String,
}

impl Payload {
    /// `lib_name` is the name without `lib` prefix or `.so` suffix, as
    /// `System.loadLibrary` expects it
    pub fn new(lib_name: impl Into<String>) -> Self {
        Self {
            lib_name: lib_name.into(),
        }
    }

    pub fn lib_name(&self) -> &str {
        &self.lib_name
    }

    /// `const-string` followed by the load call, indented for a method body
    pub fn instructions(&self) -> [String; 2] {
        [
            format!(
                "{BODY_INDENT}const-string v0, \"{}\"",
                escape_string(&self.lib_name)
            ),
            format!("{BODY_INDENT}{LOAD_LIBRARY_CALL}"),
        ]
    }

    /// Lines spliced ahead of a method's first instruction
    pub fn splice_lines(&self) -> Vec<String> {
        let mut lines = vec![String::new()];
        lines.extend(self.instructions());
        lines
    }
}

fn escape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instructions_load_named_library() {
        let [load, call] = Payload::new("frida-gadget").instructions();
        assert_eq!(load, "    const-string v0, \"frida-gadget\"");
        assert_eq!(
            call,
            "    invoke-static {v0}, Ljava/lang/System;->loadLibrary(Ljava/lang/String;)V"
        );
    }

    #[test]
    fn splice_starts_with_blank_line() {
        let lines = Payload::new("x").splice_lines();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].is_empty());
    }

    #[test]
    fn quotes_are_escaped() {
        let [load, _] = Payload::new("we\"ird\\").instructions();
        assert_eq!(load, "    const-string v0, \"we\\\"ird\\\\\"");
    }
}

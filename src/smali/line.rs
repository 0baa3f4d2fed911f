//! Line tokenizer for smali text
//!
//! Smali is line oriented: every line is blank, a `#` comment, a `:label`,
//! a `.directive` with arguments, or an instruction. Classification only
//! looks at the first token, which is enough for everything the engine
//! needs to decide.

/// Classified view over one line of a text unit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    Label(&'a str),
    /// `keyword` includes the leading dot; `rest` is trimmed
    Directive { keyword: &'a str, rest: &'a str },
    Instruction(&'a str),
}

impl<'a> LineKind<'a> {
    /// Classify a raw line
    pub fn of(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if trimmed.starts_with('#') {
            return LineKind::Comment;
        }
        let code = strip_comment(trimmed);
        if let Some(label) = code.strip_prefix(':') {
            return LineKind::Label(label);
        }
        if code.starts_with('.') {
            let (keyword, rest) = code
                .split_once(char::is_whitespace)
                .unwrap_or((code, ""));
            return LineKind::Directive {
                keyword,
                rest: rest.trim(),
            };
        }
        LineKind::Instruction(code)
    }

    /// `true` when this is the directive `keyword` (e.g. `".method"`)
    pub fn is_directive(&self, expected: &str) -> bool {
        matches!(self, LineKind::Directive { keyword, .. } if *keyword == expected)
    }

    /// `true` for `.end <what>`
    pub fn is_end_of(&self, what: &str) -> bool {
        match self {
            LineKind::Directive { keyword, rest } => {
                *keyword == ".end" && rest.split_whitespace().next() == Some(what)
            }
            _ => false,
        }
    }

    /// Arguments of a directive, empty for anything else
    pub fn rest(&self) -> &'a str {
        match *self {
            LineKind::Directive { rest, .. } => rest,
            _ => "",
        }
    }
}

/// `line` without a trailing `#` comment
///
/// A `#` inside a string or char literal is part of the literal.
pub fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if let Some(open) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == open => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '#' => return line[..idx].trim_end(),
            _ => {}
        }
    }
    line
}

/// Leading whitespace of `line`, reused when a line is rewritten in place
pub fn indent_of(line: &str) -> &str {
    let body = line.trim_start();
    &line[..line.len() - body.len()]
}

//! Method declaration parsing and parameter register accounting

use serde::Serialize;

use super::line::LineKind;

/// How wide primitives (`J`, `D`) are counted
///
/// Dalvik passes `long` and `double` in two consecutive registers. The
/// default keeps the long-standing one-slot rule so existing patch results
/// stay reproducible; `Dalvik` follows the VM convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotCounting {
    #[default]
    Observed,
    Dalvik,
}

/// A `.method` line split into its parts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl<'a> {
    pub flags: Vec<&'a str>,
    pub name: &'a str,
    /// Raw parameter descriptors, without the parentheses
    pub params: &'a str,
    pub return_type: &'a str,
}

impl<'a> MethodDecl<'a> {
    /// Parse a `.method` declaration line
    ///
    /// Returns `None` for any other line or a declaration without a
    /// `name(params)ret` token.
    pub fn parse(line: &'a str) -> Option<Self> {
        let kind = LineKind::of(line);
        if !kind.is_directive(".method") {
            return None;
        }
        let mut tokens: Vec<&str> = kind.rest().split_whitespace().collect();
        let pos = tokens.iter().position(|t| t.contains('('))?;
        let descriptor = tokens[pos];
        tokens.truncate(pos);

        let (name, tail) = descriptor.split_once('(')?;
        let (params, return_type) = tail.split_once(')')?;
        Some(Self {
            flags: tokens,
            name,
            params,
            return_type,
        })
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(&"static")
    }

    /// Registers occupied by the parameters, receiver included
    pub fn param_slots(&self, counting: SlotCounting) -> u32 {
        let receiver = u32::from(!self.is_static());
        receiver + descriptor_slots(self.params, counting)
    }
}

/// Walk a parameter descriptor string and count register slots
///
/// Object types take one slot, array markers are skipped and their element
/// type is counted like any other parameter (an array is one reference, so
/// a wide element never takes two slots), everything else is a primitive.
pub fn descriptor_slots(params: &str, counting: SlotCounting) -> u32 {
    let bytes = params.as_bytes();
    let mut count = 0;
    let mut i = 0;
    let mut in_array = false;

    while i < bytes.len() {
        match bytes[i] {
            b'[' => {
                in_array = true;
                i += 1;
                continue;
            }
            b'L' => {
                count += 1;
                match params[i..].find(';') {
                    Some(end) => i += end + 1,
                    // unterminated class name, nothing left to count
                    None => break,
                }
            }
            b'J' | b'D' if counting == SlotCounting::Dalvik && !in_array => {
                count += 2;
                i += 1;
            }
            _ => {
                count += 1;
                i += 1;
            }
        }
        in_array = false;
    }

    count
}

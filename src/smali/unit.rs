//! Owned, line-addressable copy of one class disassembly

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{InjectError, Result};

/// One `.smali` file held as an ordered list of lines
///
/// Line terminators are stripped on read and remembered per line, so a
/// file with mixed `\n` and `\r\n` endings renders back byte for byte.
/// Inserted lines use the first terminator seen in the file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextUnit {
    lines: Vec<String>,
    /// Terminator after each line; empty for a last line without one
    endings: Vec<&'static str>,
    newline: &'static str,
}

impl TextUnit {
    pub fn parse(text: &str) -> Self {
        let mut lines = Vec::new();
        let mut endings = Vec::new();
        for piece in text.split_inclusive('\n') {
            let (line, ending) = if let Some(line) = piece.strip_suffix("\r\n") {
                (line, "\r\n")
            } else if let Some(line) = piece.strip_suffix('\n') {
                (line, "\n")
            } else {
                (piece, "")
            };
            lines.push(line.to_owned());
            endings.push(ending);
        }
        let newline = endings
            .iter()
            .copied()
            .find(|ending| !ending.is_empty())
            .unwrap_or("\n");
        Self {
            lines,
            endings,
            newline,
        }
    }

    /// Read a unit from disk
    ///
    /// # Errors
    /// - [`InjectError::MissingBackingUnit`] when `path` is not a file
    /// - [`InjectError::IoError`] when it cannot be read as UTF-8
    pub fn read(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(InjectError::MissingBackingUnit(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)
            .map_err(|e| InjectError::from_io_error(path.display().to_string(), e))?;
        Ok(Self::parse(&text))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, idx: usize) -> &str {
        &self.lines[idx]
    }

    pub fn replace_line(&mut self, idx: usize, text: String) {
        self.lines[idx] = text;
    }

    /// Insert `new_lines` so that the first of them lands at index `at`
    pub fn insert_lines<I>(&mut self, at: usize, new_lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        let at = at.min(self.lines.len());
        let before = self.lines.len();
        self.lines.splice(at..at, new_lines);
        let added = self.lines.len() - before;
        if added == 0 {
            return;
        }
        self.endings
            .splice(at..at, std::iter::repeat(self.newline).take(added));

        // appending after an unterminated last line moves the missing
        // terminator to the new last line
        if at == before && at > 0 && self.endings[at - 1].is_empty() {
            self.endings[at - 1] = self.newline;
            if let Some(last) = self.endings.last_mut() {
                *last = "";
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            out.push_str(line);
            out.push_str(ending);
        }
        out
    }

    /// Write the unit back over `path`
    ///
    /// The text goes to a temporary file in the same directory which is then
    /// renamed over the target, so a failed write leaves the old unit intact.
    /// The target's permissions are carried over, and a symlink is followed
    /// so the link itself survives.
    pub fn persist(&self, path: &Path) -> Result<()> {
        let io_err = |e| InjectError::from_io_error(path.display().to_string(), e);
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(self.render().as_bytes()).map_err(io_err)?;
        if let Ok(meta) = fs::metadata(&target) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(io_err)?;
        }
        tmp.persist(&target).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

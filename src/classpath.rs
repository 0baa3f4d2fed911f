//! Mapping class names to `.smali` units in a disassembly tree

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{InjectError, Result};
use crate::smali::SMALI_EXTENSION;

/// Prefix of the per-dex directories apktool writes after the first
const MULTIDEX_PREFIX: &str = "smali_classes";

/// Relative unit path for a class name
///
/// Accepts `com.example.App`, `com/example/App` and `Lcom/example/App;`.
pub fn class_relative_path(class: &str) -> PathBuf {
    let class = class.trim();
    let internal = class
        .strip_prefix('L')
        .and_then(|c| c.strip_suffix(';'))
        .unwrap_or(class);
    let mut path = PathBuf::from(internal.replace('.', "/"));
    path.set_extension(SMALI_EXTENSION);
    path
}

/// Find the unit for `class` under `root`
///
/// Looks in `root` itself (plain baksmali output), then `smali/`, then
/// `smali_classesN/` in ascending N.
pub fn resolve_class_unit(root: &Path, class: &str) -> Result<PathBuf> {
    let relative = class_relative_path(class);
    for dir in search_roots(root)? {
        let candidate = dir.join(&relative);
        debug!(candidate = %candidate.display(), "probing class unit");
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(InjectError::ClassNotFound {
        class: class.to_string(),
        root: root.to_path_buf(),
    })
}

fn search_roots(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut multidex: Vec<(u32, PathBuf)> = Vec::new();
    let entries =
        fs::read_dir(root).map_err(|e| InjectError::from_io_error(root.display().to_string(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| InjectError::from_io_error(root.display().to_string(), e))?;
        let name = entry.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_prefix(MULTIDEX_PREFIX))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(index) = index {
            if entry.path().is_dir() {
                multidex.push((index, entry.path()));
            }
        }
    }
    multidex.sort();

    let mut roots = vec![root.to_path_buf(), root.join("smali")];
    roots.extend(multidex.into_iter().map(|(_, path)| path));
    Ok(roots)
}

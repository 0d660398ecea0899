//! Curated baseline dataset.
//!
//! The hand-maintained tools, updates, breakthroughs, concerns and trends
//! ship embedded in the binary and can be replaced by a JSON file of the same
//! shape (for example a previous export).

use std::fs;
use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Dataset;

/// Embedded curated dataset.
pub const BUILTIN_BASELINE: &str = include_str!("../../data/baseline.json");

/// Parse the embedded curated dataset.
pub fn builtin() -> Result<Dataset> {
    Ok(serde_json::from_str(BUILTIN_BASELINE)?)
}

/// Load a curated dataset from a JSON file.
pub fn load(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| AppError::import(path.display(), e))
}

/// Load the baseline from `path` when given, falling back to the embedded one.
///
/// Only a missing file falls back. A file that exists but does not parse is
/// an error, so callers never write the embedded data over it.
pub fn load_or_builtin(path: Option<&Path>) -> Result<Dataset> {
    match path {
        Some(path) => match load(path) {
            Err(AppError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No baseline at {:?}. Using built-in baseline.", path);
                builtin()
            }
            other => other,
        },
        None => builtin(),
    }
}

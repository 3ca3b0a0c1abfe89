//! Shared argument-shape checks used by every public entry point.
//!
//! All checks are eager and run before any side effect, so a failed call
//! never leaves behind a partial registration or subscription.

use crate::error::{Error, Result};

/// Reject an empty or whitespace-only string argument.
pub fn require_non_blank(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::EmptyValue(format!(
            "\"{name}\" cannot be empty or contain only whitespace"
        )));
    }
    Ok(())
}

/// Reject an empty dependency-path list, or any blank element inside it.
pub fn require_paths(paths: &[&str]) -> Result<()> {
    if paths.is_empty() {
        return Err(Error::EmptyValue(
            "\"paths\" must contain at least one dependency path".into(),
        ));
    }
    for (i, path) in paths.iter().enumerate() {
        if path.trim().is_empty() {
            return Err(Error::EmptyValue(format!(
                "\"paths\" element {i} cannot be empty or contain only whitespace"
            )));
        }
    }
    Ok(())
}

/// Reject a count that differs from a declared arity.
pub fn require_arity(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::ArityMismatch { expected, actual });
    }
    Ok(())
}

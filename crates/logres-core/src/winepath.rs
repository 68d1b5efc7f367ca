//! Translation of Windows paths recorded by the Wine-hosted application.
//!
//! The vendor databases store install locations as Windows absolute paths
//! seen from inside the Wine prefix (drive letter, backslashes). Only the
//! part below the installation root is meaningful on the host side, so a
//! recorded path is reduced to the segments after the anchor directory.

use std::path::PathBuf;

use thiserror::Error;

/// A recorded Windows path that does not contain the anchor segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no `{anchor}` segment in recorded path `{path}`")]
pub struct PathResolutionError {
    pub path: String,
    pub anchor: String,
}

/// Reduces a recorded Windows path to the part below the anchor directory.
///
/// The path is split on backslashes (repeated separators collapse), the
/// drive prefix is dropped, and the first segment exactly equal to `anchor`
/// marks the installation root. Everything after it comes back as a native
/// relative path. Matching is case-sensitive; a path without the anchor is
/// an error.
pub fn translate(recorded: &str, anchor: &str) -> Result<PathBuf, PathResolutionError> {
    let segments: Vec<&str> = recorded.split('\\').filter(|s| !s.is_empty()).collect();

    let mut parts = segments.as_slice();
    if let Some(first) = parts.first() {
        if is_drive(first) {
            parts = &parts[1..];
        }
    }

    let idx = parts
        .iter()
        .position(|s| *s == anchor)
        .ok_or_else(|| PathResolutionError {
            path: recorded.to_string(),
            anchor: anchor.to_string(),
        })?;

    let mut rel = PathBuf::new();
    for part in &parts[idx + 1..] {
        rel.push(part);
    }
    Ok(rel)
}

/// True for a drive prefix segment such as `C:`.
fn is_drive(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

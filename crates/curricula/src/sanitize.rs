//! Helpers for sanitizing data before it enters tracing span attributes.
//!
//! Logs are safe to share for debugging: candidate documents sit in
//! directories that may carry personal names, so only file names go out.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

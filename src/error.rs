//! Error types for the edgequake-mdrefine library.
//!
//! Refinement has exactly one class of fatal failure: I/O. Reading the source
//! Markdown or writing the `_refined` sibling can fail, and those failures
//! are returned as `Err(RefineError)` from the file-level entry points.
//!
//! Content problems are *not* errors. A malformed image reference passes
//! through unchanged, a missing caption yields a figure without
//! `<figcaption>`, and an empty alt text with no usable filename yields an
//! empty `alt=""`. None of those ever reach this module.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// All fatal errors returned by the edgequake-mdrefine library.
#[derive(Debug, Error)]
pub enum RefineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source Markdown file was not found at the given path.
    #[error("Markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The path exists but is a directory or another non-file entry.
    #[error("Not a regular file: '{path}'")]
    NotAFile { path: PathBuf },

    /// Process lacks permission to read the source or write the destination.
    #[error("Permission denied for '{path}'\nCheck read access on the source and write access on its directory.")]
    PermissionDenied { path: PathBuf },

    /// Any other read fault, including a source that is not valid UTF-8.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or persist the refined Markdown file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RefineError {
    /// Classify a read-side [`io::Error`] for `path`.
    pub(crate) fn from_read(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => RefineError::FileNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => RefineError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => RefineError::ReadFailed {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Classify a write-side [`io::Error`] for `path`.
    pub(crate) fn from_write(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::PermissionDenied => RefineError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => RefineError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// `true` for the "nothing to read" family (missing path or directory).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RefineError::FileNotFound { .. } | RefineError::NotAFile { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_mentions_path() {
        let e = RefineError::FileNotFound {
            path: PathBuf::from("missing/doc.md"),
        };
        let msg = e.to_string();
        assert!(msg.contains("missing/doc.md"), "got: {msg}");
        assert!(e.is_not_found());
    }

    #[test]
    fn read_error_classification() {
        let p = Path::new("doc.md");
        let e = RefineError::from_read(p, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(e, RefineError::FileNotFound { .. }));

        let e = RefineError::from_read(p, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(e, RefineError::PermissionDenied { .. }));

        let e = RefineError::from_read(p, io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(e, RefineError::ReadFailed { .. }));
        assert!(!e.is_not_found());
    }

    #[test]
    fn write_error_classification() {
        let p = Path::new("out/doc_refined.md");
        let e = RefineError::from_write(p, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(e, RefineError::PermissionDenied { .. }));

        let e = RefineError::from_write(p, io::Error::other("disk full"));
        assert!(e.to_string().contains("disk full"));
        assert!(matches!(e, RefineError::OutputWriteFailed { .. }));
    }

    #[test]
    fn invalid_config_display() {
        let e = RefineError::InvalidConfig("caption window must be 1–10".into());
        assert!(e.to_string().starts_with("Invalid configuration"));
    }
}

//! Source resolution, destination naming and atomic output.
//!
//! ## Why write through a temp file?
//!
//! The refined document must never exist half-written. The text is fully
//! built in memory first, then written to a [`tempfile::NamedTempFile`] in
//! the destination directory and persisted with a rename. If anything fails
//! the temp file is removed on drop and no destination file appears.

use crate::error::RefineError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Validate that `path` names a readable regular file.
pub fn resolve_source(path: &Path) -> Result<PathBuf, RefineError> {
    let meta = fs::metadata(path).map_err(|e| RefineError::from_read(path, e))?;
    if !meta.is_file() {
        return Err(RefineError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    debug!("Resolved local Markdown: {}", path.display());
    Ok(path.to_path_buf())
}

/// Read the whole source document as UTF-8.
pub fn read_markdown(path: &Path) -> Result<String, RefineError> {
    let path = resolve_source(path)?;
    fs::read_to_string(&path).map_err(|e| RefineError::from_read(&path, e))
}

/// Sibling path with `suffix` inserted before the extension.
///
/// `doc.md` → `doc_refined.md`, `notes` → `notes_refined`.
pub fn refined_path(source: &Path, suffix: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match source.extension() {
        Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}{suffix}"),
    };
    source.with_file_name(name)
}

/// Write `contents` to `dest` atomically (temp file + rename).
pub fn write_atomic(dest: &Path, contents: &str) -> Result<(), RefineError> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| RefineError::from_write(dest, e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| RefineError::from_write(dest, e))?;
    tmp.persist(dest)
        .map_err(|e| RefineError::from_write(dest, e.error))?;

    debug!("Wrote {} bytes to {}", contents.len(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn refined_path_inserts_suffix_before_extension() {
        assert_eq!(
            refined_path(Path::new("out/doc.md"), "_refined"),
            PathBuf::from("out/doc_refined.md")
        );
        assert_eq!(
            refined_path(Path::new("report.v2.markdown"), "_refined"),
            PathBuf::from("report.v2_refined.markdown")
        );
        assert_eq!(
            refined_path(Path::new("notes"), "-fig"),
            PathBuf::from("notes-fig")
        );
    }

    #[test]
    fn resolve_missing_file() {
        let err = resolve_source(Path::new("/definitely/not/here.md")).unwrap_err();
        assert!(matches!(err, RefineError::FileNotFound { .. }));
    }

    #[test]
    fn resolve_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let err = resolve_source(dir.path()).unwrap_err();
        assert!(matches!(err, RefineError::NotAFile { .. }));
    }

    #[test]
    fn read_rejects_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("bad.md");
        fs::write(&p, [0xff, 0xfe, 0x00, 0x41]).unwrap();
        let err = read_markdown(&p).unwrap_err();
        assert!(matches!(err, RefineError::ReadFailed { .. }), "{err:?}");
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("doc_refined.md");
        write_atomic(&dest, "hello\n").unwrap();
        write_atomic(&dest, "replaced\n").unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "replaced\n");
        let entries = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("nope").join("doc_refined.md");
        let err = write_atomic(&dest, "x").unwrap_err();
        assert!(matches!(err, RefineError::OutputWriteFailed { .. }), "{err:?}");
        assert!(!dest.exists());
    }
}

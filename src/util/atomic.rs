//! Atomic file writing via tempfile + rename.
//!
//! Output documents are written to a [`tempfile::NamedTempFile`] in the
//! target's directory and then persisted over the target, so a crash never
//! leaves a half-written `.docx` behind.

use std::io::Write;
use std::path::Path;

use crate::error::{ReplaceError, ReplaceResult};

/// Atomically write `content` to `path`.
///
/// # Errors
///
/// Returns [`ReplaceError::Io`] if the parent directory is missing, writing
/// fails, or the rename fails (e.g., cross-device).
pub fn atomic_write(path: &Path, content: &[u8]) -> ReplaceResult<()> {
    let io_err = |source| ReplaceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(content).map_err(io_err)?;
    tmp.flush().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_write_creates_and_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.txt");
        atomic_write(&path, b"first").expect("write");
        atomic_write(&path, b"second").expect("overwrite");
        assert_eq!(std::fs::read(&path).expect("read"), b"second");
    }

    #[test]
    fn test_atomic_write_missing_dir_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing/out.txt");
        let err = atomic_write(&path, b"x").expect_err("write into missing directory");
        assert!(matches!(err, ReplaceError::Io { .. }));
    }
}

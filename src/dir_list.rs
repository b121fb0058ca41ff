//! Non-recursive directory listing for the tree comparison walk.
//!
//! Only child names are collected here; classification and metadata are
//! handled per entry by [`crate::entry`]. Names come back in a `BTreeSet`
//! so the merged union of two listings is lexicographic and the report
//! order is deterministic.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
}

impl ListError {
    fn from_io(e: std::io::Error, path: &Path) -> Self {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            ListError::PermissionDenied(path.to_path_buf())
        } else {
            ListError::Io(e)
        }
    }
}

/// Lists the immediate child names of `dir`.
pub fn list_names(dir: &Path) -> Result<BTreeSet<OsString>, ListError> {
    let read_dir = std::fs::read_dir(dir).map_err(|e| ListError::from_io(e, dir))?;

    let mut names = BTreeSet::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| ListError::from_io(e, dir))?;
        names.insert(entry.file_name());
    }

    Ok(names)
}

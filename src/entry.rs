//! Classification of a single filesystem path for tree comparison.
//!
//! Classification never fails: a path that cannot be stat'd becomes an
//! entry with [`FileType::Error`] carrying the cause, so one unreadable
//! entry does not abort comparison of the rest of the tree. Symlinks are
//! detected with a non-dereferencing stat and are only followed when the
//! caller explicitly asks for it.

use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    /// FIFOs, sockets, device nodes and anything else exotic.
    Other,
    Nonexistent,
    Error,
}

impl FileType {
    pub fn describe(self) -> &'static str {
        match self {
            FileType::Regular => "file",
            FileType::Directory => "directory",
            FileType::Symlink => "symlink",
            FileType::Other => "special file",
            FileType::Nonexistent => "absent",
            FileType::Error => "unreadable",
        }
    }
}

/// Snapshot of one path at classification time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEntry {
    pub file_type: FileType,
    /// Size in bytes, regular files only.
    pub size: Option<u64>,
    /// Modification time in nanoseconds since the epoch, regular files only.
    pub mtime_nanos: Option<u64>,
    /// Link target, symlinks only.
    pub symlink_target: Option<PathBuf>,
    /// Stat failure message when `file_type` is `Error`.
    pub error: Option<String>,
}

impl ClassifiedEntry {
    fn of_type(file_type: FileType) -> Self {
        ClassifiedEntry {
            file_type,
            size: None,
            mtime_nanos: None,
            symlink_target: None,
            error: None,
        }
    }

    pub fn nonexistent() -> Self {
        Self::of_type(FileType::Nonexistent)
    }

    fn stat_error(message: String) -> Self {
        ClassifiedEntry {
            error: Some(message),
            ..Self::of_type(FileType::Error)
        }
    }

    fn regular(metadata: &std::fs::Metadata) -> Self {
        ClassifiedEntry {
            size: Some(metadata.len()),
            mtime_nanos: mtime_nanos(metadata),
            ..Self::of_type(FileType::Regular)
        }
    }
}

fn mtime_nanos(metadata: &std::fs::Metadata) -> Option<u64> {
    let mtime = metadata.modified().ok()?;
    let since_epoch = mtime.duration_since(UNIX_EPOCH).ok()?;
    u64::try_from(since_epoch.as_nanos()).ok()
}

/// Classifies `path` without following symlinks unless `follow_symlinks`
/// is set.
///
/// With `follow_symlinks`, a link is dereferenced exactly once and
/// classified as whatever it points at; a broken link stays `Symlink`.
pub fn classify(path: &Path, follow_symlinks: bool) -> ClassifiedEntry {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return ClassifiedEntry::nonexistent(),
        Err(e) => return ClassifiedEntry::stat_error(e.to_string()),
    };

    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        let target = std::fs::read_link(path).ok();

        if follow_symlinks {
            match std::fs::metadata(path) {
                Ok(resolved) => return classify_resolved(&resolved, target),
                // Broken link: nothing to dereference into.
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return ClassifiedEntry::stat_error(e.to_string()),
            }
        }

        return ClassifiedEntry {
            symlink_target: target,
            ..ClassifiedEntry::of_type(FileType::Symlink)
        };
    }

    if file_type.is_dir() {
        ClassifiedEntry::of_type(FileType::Directory)
    } else if file_type.is_file() {
        ClassifiedEntry::regular(&metadata)
    } else {
        ClassifiedEntry::of_type(FileType::Other)
    }
}

fn classify_resolved(metadata: &std::fs::Metadata, target: Option<PathBuf>) -> ClassifiedEntry {
    let mut entry = if metadata.is_dir() {
        ClassifiedEntry::of_type(FileType::Directory)
    } else if metadata.is_file() {
        ClassifiedEntry::regular(metadata)
    } else {
        ClassifiedEntry::of_type(FileType::Other)
    };
    entry.symlink_target = target;
    entry
}

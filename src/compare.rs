//! Per-entry comparison: the decision table that maps a pair of
//! classifications (plus metadata) to a [`FileStatus`].
//!
//! The outcome is a pure function of the two classifications and their
//! metadata, never of traversal order. The only I/O happens in content
//! mode, where both files are checksummed.

use crate::checksum::checksum_file;
use crate::entry::{ClassifiedEntry, FileType};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Identical,
    Different,
    OnlyInFirst,
    OnlyInSecond,
    TypeMismatch,
    ComparisonError,
}

/// Knobs for one tree comparison.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Compare symlinks by dereferencing them instead of by target path.
    pub follow_symlinks: bool,
    /// Require byte-for-byte equality (via SHA-256) instead of the
    /// size + mtime heuristic.
    pub content_compare: bool,
    /// Slack allowed between modification times before two same-size
    /// files count as different. Absorbs filesystem timestamp
    /// granularity differences.
    pub time_tolerance: Duration,
    /// Inventory the contents of directories present on only one side
    /// instead of stopping at the directory's own entry.
    pub expand_unique: bool,
    /// Cooperative cancellation, checked once per directory entry.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for CompareOptions {
    fn default() -> Self {
        CompareOptions {
            follow_symlinks: false,
            content_compare: false,
            time_tolerance: Duration::from_secs(2),
            expand_unique: false,
            cancel: None,
        }
    }
}

impl CompareOptions {
    pub fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Result of comparing one entry pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub status: FileStatus,
    /// Human-readable cause, populated for `ComparisonError`.
    pub cause: Option<String>,
}

impl Comparison {
    fn of(status: FileStatus) -> Self {
        Comparison {
            status,
            cause: None,
        }
    }

    fn error(cause: String) -> Self {
        Comparison {
            status: FileStatus::ComparisonError,
            cause: Some(cause),
        }
    }
}

/// Compares one same-named entry across the two trees.
///
/// `first_path`/`second_path` are only touched in content mode, to read
/// the file bytes for checksumming.
pub fn compare_entries(
    first: &ClassifiedEntry,
    second: &ClassifiedEntry,
    first_path: &Path,
    second_path: &Path,
    options: &CompareOptions,
) -> Comparison {
    match (first.file_type, second.file_type) {
        (FileType::Nonexistent, FileType::Nonexistent) => {
            // Listed by one side but gone by the time it was stat'd.
            Comparison::error("entry no longer exists in either tree".to_string())
        }
        (_, FileType::Nonexistent) => Comparison::of(FileStatus::OnlyInFirst),
        (FileType::Nonexistent, _) => Comparison::of(FileStatus::OnlyInSecond),
        (FileType::Error, _) | (_, FileType::Error) => {
            Comparison::error(stat_failure_cause(first, second))
        }
        (first_type, second_type) if first_type != second_type => {
            Comparison::of(FileStatus::TypeMismatch)
        }
        // Directory contents are compared by recursion, not here.
        (FileType::Directory, _) => Comparison::of(FileStatus::Identical),
        (FileType::Symlink, _) => compare_symlinks(first, second),
        (FileType::Regular, _) => {
            compare_regular_files(first, second, first_path, second_path, options)
        }
        // Specials compare by presence only.
        (FileType::Other, _) => Comparison::of(FileStatus::Identical),
    }
}

fn stat_failure_cause(first: &ClassifiedEntry, second: &ClassifiedEntry) -> String {
    match (&first.error, &second.error) {
        (Some(e1), Some(e2)) => format!("first tree: {e1}; second tree: {e2}"),
        (Some(e1), None) => format!("first tree: {e1}"),
        (None, Some(e2)) => format!("second tree: {e2}"),
        (None, None) => "entry could not be classified".to_string(),
    }
}

fn compare_symlinks(first: &ClassifiedEntry, second: &ClassifiedEntry) -> Comparison {
    match (&first.symlink_target, &second.symlink_target) {
        (Some(t1), Some(t2)) if t1 == t2 => Comparison::of(FileStatus::Identical),
        (Some(_), Some(_)) => Comparison::of(FileStatus::Different),
        _ => Comparison::error("symlink target could not be read".to_string()),
    }
}

fn compare_regular_files(
    first: &ClassifiedEntry,
    second: &ClassifiedEntry,
    first_path: &Path,
    second_path: &Path,
    options: &CompareOptions,
) -> Comparison {
    // Size inequality is cheap and authoritative.
    if first.size != second.size {
        return Comparison::of(FileStatus::Different);
    }

    if options.content_compare {
        let first_sum = match checksum_file(first_path) {
            Ok(sum) => sum,
            Err(e) => return Comparison::error(format!("first tree: {e}")),
        };
        let second_sum = match checksum_file(second_path) {
            Ok(sum) => sum,
            Err(e) => return Comparison::error(format!("second tree: {e}")),
        };

        return if first_sum == second_sum {
            Comparison::of(FileStatus::Identical)
        } else {
            Comparison::of(FileStatus::Different)
        };
    }

    match (first.mtime_nanos, second.mtime_nanos) {
        (Some(m1), Some(m2)) => {
            let tolerance = u64::try_from(options.time_tolerance.as_nanos()).unwrap_or(u64::MAX);
            if m1.abs_diff(m2) <= tolerance {
                Comparison::of(FileStatus::Identical)
            } else {
                Comparison::of(FileStatus::Different)
            }
        }
        // Without a usable mtime equality cannot be confirmed.
        _ => Comparison::of(FileStatus::Different),
    }
}

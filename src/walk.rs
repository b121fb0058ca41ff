//! Paired recursive traversal of two directory trees.
//!
//! Both trees are walked in lockstep: the child names of each directory
//! pair are merged into one sorted union, every name is classified and
//! compared, and directory pairs are descended into under the protection
//! of one [`TraversalGuard`] per side. Per-entry failures (unreadable
//! entries, unlistable directories, symlink cycles) become
//! `ComparisonError` entries in the report; only pre-traversal validation
//! and cancellation abort the call.

use crate::compare::{CompareOptions, FileStatus, compare_entries};
use crate::dir_list::list_names;
use crate::entry::{ClassifiedEntry, FileType, classify};
use crate::guard::TraversalGuard;
use crate::report::{ComparisonEntry, ComparisonReport};
use std::collections::BTreeSet;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error("{0} is not the path to an existing directory")]
    RootNotFound(PathBuf),
    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),
    #[error("the two roots resolve to the same directory: {0}")]
    SameTree(PathBuf),
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("comparison cancelled")]
    Cancelled,
}

/// Compares the trees rooted at `first_root` and `second_root`.
///
/// Fatal errors (missing root, non-directory root, both roots resolving
/// to the same directory, cancellation) are returned as `Err`; everything
/// else is recorded inside the report. The report is in deterministic
/// preorder and owned by the caller.
pub fn compare_trees(
    first_root: &Path,
    second_root: &Path,
    options: &CompareOptions,
) -> Result<ComparisonReport, CompareError> {
    validate_root(first_root)?;
    validate_root(second_root)?;

    let first_canonical = first_root.canonicalize().map_err(CompareError::Io)?;
    let second_canonical = second_root.canonicalize().map_err(CompareError::Io)?;
    if first_canonical == second_canonical {
        return Err(CompareError::SameTree(first_canonical));
    }

    debug!(
        "Comparing {} against {}",
        first_root.display(),
        second_root.display()
    );

    let mut walker = Walker {
        first_root,
        second_root,
        options,
        first_guard: TraversalGuard::new(),
        second_guard: TraversalGuard::new(),
        report: ComparisonReport::new(),
    };

    // Seed the guards with the roots themselves so a symlink deeper in a
    // tree that points back at its root is caught as a loop.
    let first_token = walker
        .first_guard
        .enter(first_root)
        .map_err(guard_error_fatal)?;
    let second_token = walker
        .second_guard
        .enter(second_root)
        .map_err(guard_error_fatal)?;

    let result = walker.compare_root();

    walker.second_guard.leave(second_token);
    walker.first_guard.leave(first_token);
    result?;

    Ok(walker.report)
}

fn validate_root(root: &Path) -> Result<(), CompareError> {
    match std::fs::metadata(root) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(CompareError::NotADirectory(root.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(CompareError::RootNotFound(root.to_path_buf()))
        }
        Err(e) => Err(CompareError::Io(e)),
    }
}

fn guard_error_fatal(e: crate::guard::GuardError) -> CompareError {
    // Entering a root onto an empty chain can only fail on identity
    // resolution.
    match e {
        crate::guard::GuardError::Identity { source, .. } => CompareError::Io(source),
        crate::guard::GuardError::Loop { .. } => {
            unreachable!("empty ancestor chain cannot contain the root")
        }
    }
}

struct Walker<'a> {
    first_root: &'a Path,
    second_root: &'a Path,
    options: &'a CompareOptions,
    first_guard: TraversalGuard,
    second_guard: TraversalGuard,
    report: ComparisonReport,
}

impl Walker<'_> {
    /// Compares the root directory pair.
    ///
    /// The root has no entry of its own, so a listing failure here is the
    /// one case that gets a separate record; subdirectories annotate their
    /// own entry before descent instead.
    fn compare_root(&mut self) -> Result<(), CompareError> {
        let rel = Path::new("");
        let (first_names, second_names, failure) =
            list_pair(self.first_root, self.second_root);

        if let Some(cause) = failure {
            self.report.push(listing_failure_entry(rel, cause));
        }

        self.walk_names(rel, self.first_root, self.second_root, &first_names, &second_names)
    }

    /// Compares every name in the merged union of the two listings.
    ///
    /// Only `Cancelled` propagates out of here.
    fn walk_names(
        &mut self,
        rel: &Path,
        first_dir: &Path,
        second_dir: &Path,
        first_names: &BTreeSet<OsString>,
        second_names: &BTreeSet<OsString>,
    ) -> Result<(), CompareError> {
        let merged: BTreeSet<_> = first_names.union(second_names).cloned().collect();

        for name in &merged {
            if self.options.cancelled() {
                return Err(CompareError::Cancelled);
            }
            self.compare_name(rel, first_dir, second_dir, name)?;
        }

        Ok(())
    }

    fn compare_name(
        &mut self,
        rel: &Path,
        first_dir: &Path,
        second_dir: &Path,
        name: &OsStr,
    ) -> Result<(), CompareError> {
        let first_path = first_dir.join(name);
        let second_path = second_dir.join(name);

        let first = classify(&first_path, self.options.follow_symlinks);
        let second = classify(&second_path, self.options.follow_symlinks);
        let comparison = compare_entries(
            &first,
            &second,
            &first_path,
            &second_path,
            self.options,
        );

        let rel_child = rel.join(name);
        let mut entry = build_entry(rel_child.clone(), &first, &second, comparison);

        let both_directories =
            first.file_type == FileType::Directory && second.file_type == FileType::Directory;
        if !both_directories {
            if self.options.expand_unique
                && let Some(from_first) = unique_directory_side(&first, &second, entry.status)
            {
                return self.expand_unique(rel_child, entry, from_first);
            }
            self.report.push(entry);
            return Ok(());
        }

        // Descend only when neither side's guard reports a cycle; a loop
        // turns the directory's own entry into a ComparisonError.
        let first_token = match self.first_guard.enter(&first_path) {
            Ok(token) => token,
            Err(e) => {
                warn!("Skipping descent into {}: {}", first_path.display(), e);
                entry.status = FileStatus::ComparisonError;
                entry.cause = Some(e.to_string());
                self.report.push(entry);
                return Ok(());
            }
        };
        let second_token = match self.second_guard.enter(&second_path) {
            Ok(token) => token,
            Err(e) => {
                warn!("Skipping descent into {}: {}", second_path.display(), e);
                self.first_guard.leave(first_token);
                entry.status = FileStatus::ComparisonError;
                entry.cause = Some(e.to_string());
                self.report.push(entry);
                return Ok(());
            }
        };

        // Listing happens before the entry is pushed so a failed read_dir
        // lands on the directory's own record instead of a duplicate.
        let (first_names, second_names, failure) = list_pair(&first_path, &second_path);
        if let Some(cause) = failure {
            entry.status = FileStatus::ComparisonError;
            entry.cause = Some(cause);
        }

        self.report.push(entry);
        let result =
            self.walk_names(&rel_child, &first_path, &second_path, &first_names, &second_names);
        self.second_guard.leave(second_token);
        self.first_guard.leave(first_token);
        result
    }

    /// Inventories a directory present on only one side: every nested
    /// entry is recorded with the parent's one-sided status. Descent is
    /// guard-protected on that side, like paired descent.
    fn expand_unique(
        &mut self,
        rel: PathBuf,
        mut entry: ComparisonEntry,
        from_first: bool,
    ) -> Result<(), CompareError> {
        let dir = if from_first {
            self.first_root.join(&rel)
        } else {
            self.second_root.join(&rel)
        };

        let guard = if from_first {
            &mut self.first_guard
        } else {
            &mut self.second_guard
        };
        let token = match guard.enter(&dir) {
            Ok(token) => token,
            Err(e) => {
                warn!("Skipping descent into {}: {}", dir.display(), e);
                entry.status = FileStatus::ComparisonError;
                entry.cause = Some(e.to_string());
                self.report.push(entry);
                return Ok(());
            }
        };

        let names = match list_names(&dir) {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list {}: {}", dir.display(), e);
                entry.status = FileStatus::ComparisonError;
                entry.cause = Some(format!("failed to list {} tree: {e}", side_name(from_first)));
                BTreeSet::new()
            }
        };
        self.report.push(entry);

        let mut result = Ok(());
        for name in &names {
            if self.options.cancelled() {
                result = Err(CompareError::Cancelled);
                break;
            }

            let child_path = dir.join(name);
            let present = classify(&child_path, self.options.follow_symlinks);
            let absent = ClassifiedEntry::nonexistent();
            let (first_side, second_side) = if from_first {
                (&present, &absent)
            } else {
                (&absent, &present)
            };
            let comparison =
                compare_entries(first_side, second_side, &child_path, &child_path, self.options);

            let child_rel = rel.join(name);
            let child_entry = build_entry(child_rel.clone(), first_side, second_side, comparison);

            if present.file_type == FileType::Directory {
                result = self.expand_unique(child_rel, child_entry, from_first);
                if result.is_err() {
                    break;
                }
            } else {
                self.report.push(child_entry);
            }
        }

        if from_first {
            self.first_guard.leave(token);
        } else {
            self.second_guard.leave(token);
        }
        result
    }
}

fn side_name(from_first: bool) -> &'static str {
    if from_first { "first" } else { "second" }
}

fn unique_directory_side(
    first: &ClassifiedEntry,
    second: &ClassifiedEntry,
    status: FileStatus,
) -> Option<bool> {
    match status {
        FileStatus::OnlyInFirst if first.file_type == FileType::Directory => Some(true),
        FileStatus::OnlyInSecond if second.file_type == FileType::Directory => Some(false),
        _ => None,
    }
}

/// Lists both sides of a directory pair. A failed listing contributes an
/// empty name set and a cause naming the side, so unique entries on the
/// readable side are still compared.
fn list_pair(
    first_dir: &Path,
    second_dir: &Path,
) -> (BTreeSet<OsString>, BTreeSet<OsString>, Option<String>) {
    let mut causes = Vec::new();
    let first_names = list_or_note(first_dir, "first", &mut causes);
    let second_names = list_or_note(second_dir, "second", &mut causes);

    let failure = if causes.is_empty() {
        None
    } else {
        Some(causes.join("; "))
    };
    (first_names, second_names, failure)
}

fn list_or_note(dir: &Path, side: &str, causes: &mut Vec<String>) -> BTreeSet<OsString> {
    match list_names(dir) {
        Ok(names) => names,
        Err(e) => {
            warn!("Could not list {}: {}", dir.display(), e);
            causes.push(format!("failed to list {side} tree: {e}"));
            BTreeSet::new()
        }
    }
}

fn build_entry(
    path: PathBuf,
    first: &ClassifiedEntry,
    second: &ClassifiedEntry,
    comparison: crate::compare::Comparison,
) -> ComparisonEntry {
    ComparisonEntry {
        path,
        first_type: first.file_type,
        second_type: second.file_type,
        status: comparison.status,
        first_size: first.size,
        second_size: second.size,
        first_mtime_nanos: first.mtime_nanos,
        second_mtime_nanos: second.mtime_nanos,
        first_target: first.symlink_target.clone(),
        second_target: second.symlink_target.clone(),
        cause: comparison.cause,
    }
}

fn listing_failure_entry(rel: &Path, cause: String) -> ComparisonEntry {
    ComparisonEntry {
        path: rel.to_path_buf(),
        first_type: FileType::Directory,
        second_type: FileType::Directory,
        status: FileStatus::ComparisonError,
        first_size: None,
        second_size: None,
        first_mtime_nanos: None,
        second_mtime_nanos: None,
        first_target: None,
        second_target: None,
        cause: Some(cause),
    }
}

#[cfg(test)]
mod tests;

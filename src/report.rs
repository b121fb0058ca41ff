//! The comparison report: one record per relative path visited, in
//! deterministic preorder, plus per-status counters and a digest for
//! comparing whole runs.

use crate::compare::FileStatus;
use crate::entry::FileType;
use crate::util::hashing::{hash_field, hash_opt_path_field, hash_opt_u64_field, hash_path_field};
use base64::Engine;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// One compared entry. `path` is relative to the comparison roots and is
/// the joining key between the two trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonEntry {
    pub path: PathBuf,
    pub first_type: FileType,
    pub second_type: FileType,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_mtime_nanos: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_mtime_nanos: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_target: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_target: Option<PathBuf>,
    /// Human-readable failure cause for `ComparisonError` entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ComparisonEntry {
    pub fn status_code(&self) -> &'static str {
        match self.status {
            FileStatus::Identical => ".",
            FileStatus::Different => "!",
            FileStatus::OnlyInFirst => "<",
            FileStatus::OnlyInSecond => ">",
            FileStatus::TypeMismatch => "T",
            FileStatus::ComparisonError => "E",
        }
    }
}

/// Per-status entry counts, kept in step with the entry list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub identical: u64,
    pub different: u64,
    pub only_in_first: u64,
    pub only_in_second: u64,
    pub type_mismatch: u64,
    pub comparison_error: u64,
}

impl StatusCounts {
    fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::Identical => self.identical += 1,
            FileStatus::Different => self.different += 1,
            FileStatus::OnlyInFirst => self.only_in_first += 1,
            FileStatus::OnlyInSecond => self.only_in_second += 1,
            FileStatus::TypeMismatch => self.type_mismatch += 1,
            FileStatus::ComparisonError => self.comparison_error += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.identical
            + self.different
            + self.only_in_first
            + self.only_in_second
            + self.type_mismatch
            + self.comparison_error
    }
}

/// Aggregate result of one `compare_trees` call.
///
/// Entry order is traversal order: lexicographic by name within a
/// directory, subtree entries spliced right after their directory's own
/// entry. Two runs over unmodified trees produce identical reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonReport {
    pub entries: Vec<ComparisonEntry>,
    pub counts: StatusCounts,
}

impl ComparisonReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ComparisonEntry) {
        self.counts.record(entry.status);
        self.entries.push(entry);
    }

    /// True when any entry is not `Identical`.
    pub fn has_differences(&self) -> bool {
        self.counts.total() != self.counts.identical
    }

    /// Base64-encoded SHA-256 over the canonical encoding of all entries.
    ///
    /// Equal digests mean byte-identical reports, ordering included, which
    /// is how idempotence across runs is checked.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();

        for entry in &self.entries {
            hash_path_field(&mut hasher, &entry.path);
            hash_field(&mut hasher, entry.status_code().as_bytes());
            hash_field(&mut hasher, entry.first_type.describe().as_bytes());
            hash_field(&mut hasher, entry.second_type.describe().as_bytes());
            hash_opt_u64_field(&mut hasher, entry.first_size);
            hash_opt_u64_field(&mut hasher, entry.second_size);
            hash_opt_u64_field(&mut hasher, entry.first_mtime_nanos);
            hash_opt_u64_field(&mut hasher, entry.second_mtime_nanos);
            hash_opt_path_field(&mut hasher, entry.first_target.as_deref());
            hash_opt_path_field(&mut hasher, entry.second_target.as_deref());
            match &entry.cause {
                Some(cause) => hash_field(&mut hasher, cause.as_bytes()),
                None => hash_field(&mut hasher, b""),
            }
        }

        base64::engine::general_purpose::STANDARD.encode(hasher.finalize())
    }
}

//! Canonical hashing helpers for the report digest.
//!
//! Fields are length-prefixed before hashing so that distinct reports can
//! never serialize to the same byte stream (embedded separators in paths
//! or causes would otherwise be ambiguous).

use sha2::{Digest, Sha256};
use std::path::Path;

/// Hashes a byte field with an explicit big-endian length prefix.
pub(crate) fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    let len = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    hasher.update(len.to_be_bytes());
    hasher.update(bytes);
}

/// Hashes an optional fixed-width integer, with a presence byte so that
/// `None` and `Some(0)` stay distinct.
pub(crate) fn hash_opt_u64_field(hasher: &mut Sha256, value: Option<u64>) {
    match value {
        Some(v) => {
            hasher.update([1u8]);
            hasher.update(v.to_be_bytes());
        }
        None => hasher.update([0u8]),
    }
}

/// Hashes a path while preserving platform identity semantics.
///
/// On Unix the raw OS bytes are hashed so distinct non-UTF-8 paths remain
/// distinct; elsewhere the lossy string form is used.
pub(crate) fn hash_path_field(hasher: &mut Sha256, path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        hash_field(hasher, path.as_os_str().as_bytes());
    }
    #[cfg(not(unix))]
    {
        hash_field(hasher, path.to_string_lossy().as_bytes());
    }
}

/// Hashes an optional path, with a presence byte so that `None` and
/// `Some("")` stay distinct.
pub(crate) fn hash_opt_path_field(hasher: &mut Sha256, path: Option<&Path>) {
    match path {
        Some(path) => {
            hasher.update([1u8]);
            hash_path_field(hasher, path);
        }
        None => hasher.update([0u8]),
    }
}

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ChecksumError {
    #[error("IO error: {0}")]
    Io(std::io::Error),
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),
    #[error("File modified during checksumming: {0}")]
    ConcurrentModification(PathBuf),
}

/// Computes the hex-encoded SHA-256 of a file's contents.
///
/// The modification time is sampled before and after reading; a change
/// between the two samples means the bytes that were hashed may not
/// correspond to any single consistent version of the file, which is
/// reported as `ConcurrentModification`. The absence of that error is not
/// a guarantee that no modification happened.
pub fn checksum_file(path: &Path) -> Result<String, ChecksumError> {
    debug!("Checksumming {}", path.display());

    let mtime_before = modified_time(path)?;

    let mut file = File::open(path).map_err(|e| map_io(e, path))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut buffer).map_err(ChecksumError::Io)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    let mtime_after = modified_time(path)?;
    if mtime_before != mtime_after {
        return Err(ChecksumError::ConcurrentModification(path.to_path_buf()));
    }

    Ok(format!("{:x}", hasher.finalize()))
}

fn modified_time(path: &Path) -> Result<std::time::SystemTime, ChecksumError> {
    let metadata = std::fs::metadata(path).map_err(|e| map_io(e, path))?;
    metadata.modified().map_err(ChecksumError::Io)
}

fn map_io(e: std::io::Error, path: &Path) -> ChecksumError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        ChecksumError::PermissionDenied(path.to_path_buf())
    } else {
        ChecksumError::Io(e)
    }
}

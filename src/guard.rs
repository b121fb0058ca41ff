//! Loop-safe descent tracking for recursive directory traversal.
//!
//! A [`TraversalGuard`] holds the chain of directories currently being
//! descended into, keyed by canonical identity (device+inode on Unix,
//! canonicalized path elsewhere). Entering a directory whose identity is
//! already on the chain means a symlink cycle: the walk must not recurse
//! or it would never terminate.
//!
//! The chain follows stack discipline. An identity is removed again when
//! its subtree is done, so sibling subtrees may legitimately share a
//! symlink target without tripping the guard.

use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("traversal loop detected: {path} cycles back to {ancestor}")]
    Loop { path: PathBuf, ancestor: PathBuf },
    #[error("cannot resolve identity of {path}: {source}")]
    Identity {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Canonical identity of a directory, stable across the paths that reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DirIdentity {
    #[cfg(unix)]
    DevInode { dev: u64, ino: u64 },
    #[cfg(not(unix))]
    Canonical(PathBuf),
}

impl DirIdentity {
    fn resolve(path: &Path) -> Result<Self, std::io::Error> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            // Follows symlinks, so a link and its target share an identity.
            let metadata = std::fs::metadata(path)?;
            Ok(DirIdentity::DevInode {
                dev: metadata.dev(),
                ino: metadata.ino(),
            })
        }
        #[cfg(not(unix))]
        {
            Ok(DirIdentity::Canonical(path.canonicalize()?))
        }
    }
}

/// Proof that a directory was entered; must be handed back to [`TraversalGuard::leave`].
#[derive(Debug)]
pub struct GuardToken {
    identity: DirIdentity,
}

/// Ancestor chain for one side of the comparison.
#[derive(Debug, Default)]
pub struct TraversalGuard {
    chain: Vec<(DirIdentity, PathBuf)>,
}

impl TraversalGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers descent into `path`.
    ///
    /// Fails with [`GuardError::Loop`] when the directory's identity is
    /// already on the chain, naming the ancestor it cycles back to. The
    /// identity is resolved exactly once, here.
    pub fn enter(&mut self, path: &Path) -> Result<GuardToken, GuardError> {
        let identity = DirIdentity::resolve(path).map_err(|source| GuardError::Identity {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some((_, ancestor)) = self.chain.iter().find(|(id, _)| *id == identity) {
            return Err(GuardError::Loop {
                path: path.to_path_buf(),
                ancestor: ancestor.clone(),
            });
        }

        self.chain.push((identity.clone(), path.to_path_buf()));
        Ok(GuardToken { identity })
    }

    /// Unregisters the most recent descent. Tokens must be returned in
    /// reverse order of [`enter`](Self::enter).
    pub fn leave(&mut self, token: GuardToken) {
        let popped = self.chain.pop();
        debug_assert_eq!(
            popped.map(|(id, _)| id),
            Some(token.identity),
            "guard tokens returned out of order"
        );
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.chain.len()
    }
}

//! engine::workdir
//!
//! Working tree allocation and lifecycle tracking.
//!
//! A [`WorkTree`] is created once per resolution and handed to the caller
//! when resolution ends, whether it succeeded or not. Nothing here deletes
//! it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from preparing a working tree.
#[derive(Debug, Error)]
pub enum WorkdirError {
    /// A temporary directory could not be created.
    #[error("failed to create temporary working tree: {source}")]
    Create {
        #[source]
        source: io::Error,
    },

    /// The requested destination already has content.
    #[error("destination '{path}' is not empty")]
    NotEmpty {
        /// The destination
        path: PathBuf,
    },

    /// The requested destination exists but is not a directory.
    #[error("destination '{path}' is not a directory")]
    NotADirectory {
        /// The destination
        path: PathBuf,
    },

    /// Filesystem error on the destination.
    #[error("cannot prepare '{path}': {source}")]
    Io {
        /// The path being prepared
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Lifecycle of a working tree, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TreeState {
    Empty,
    Initialized,
    RemoteRegistered,
    Fetched,
    CheckedOut,
    /// Resolution narrowed the context to a subdirectory.
    Narrowed,
}

impl fmt::Display for TreeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeState::Empty => "empty",
            TreeState::Initialized => "initialized",
            TreeState::RemoteRegistered => "remote-registered",
            TreeState::Fetched => "fetched",
            TreeState::CheckedOut => "checked-out",
            TreeState::Narrowed => "narrowed",
        };
        f.write_str(name)
    }
}

/// A directory owned by one resolution.
#[derive(Debug)]
pub struct WorkTree {
    root: PathBuf,
    state: TreeState,
}

impl WorkTree {
    /// Allocate a fresh, uniquely named directory under the system temp dir.
    pub fn allocate(prefix: &str) -> Result<Self, WorkdirError> {
        Self::allocate_in(&std::env::temp_dir(), prefix)
    }

    /// Allocate a fresh, uniquely named directory under `parent`.
    pub fn allocate_in(parent: &Path, prefix: &str) -> Result<Self, WorkdirError> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)
            .map_err(|source| WorkdirError::Create { source })?;

        // Ownership passes to the caller; the directory outlives this value.
        let kept = dir.keep();
        let root = fs::canonicalize(&kept).map_err(|source| WorkdirError::Io {
            path: kept.clone(),
            source,
        })?;

        debug!(root = %root.display(), "allocated working tree");
        Ok(Self::at(root))
    }

    /// Use `dest` as the working tree, creating it if needed.
    ///
    /// An existing `dest` must be an empty directory.
    pub fn prepare(dest: &Path) -> Result<Self, WorkdirError> {
        let io_err = |source| WorkdirError::Io {
            path: dest.to_path_buf(),
            source,
        };

        match fs::metadata(dest) {
            Ok(meta) if !meta.is_dir() => {
                return Err(WorkdirError::NotADirectory {
                    path: dest.to_path_buf(),
                })
            }
            Ok(_) => {
                if fs::read_dir(dest).map_err(io_err)?.next().is_some() {
                    return Err(WorkdirError::NotEmpty {
                        path: dest.to_path_buf(),
                    });
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(dest).map_err(io_err)?;
            }
            Err(e) => return Err(io_err(e)),
        }

        let root = fs::canonicalize(dest).map_err(io_err)?;
        debug!(root = %root.display(), "prepared working tree");
        Ok(Self::at(root))
    }

    fn at(root: PathBuf) -> Self {
        Self {
            root,
            state: TreeState::Empty,
        }
    }

    /// Absolute, canonical root of the tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> TreeState {
        self.state
    }

    /// Record a lifecycle transition.
    pub(crate) fn advance(&mut self, to: TreeState) {
        debug_assert!(to > self.state, "{} -> {} goes backwards", self.state, to);
        debug!(root = %self.root.display(), from = %self.state, to = %to, "working tree state");
        self.state = to;
    }

    /// Give up the tree, leaving the directory on disk.
    pub fn into_path(self) -> PathBuf {
        self.root
    }
}

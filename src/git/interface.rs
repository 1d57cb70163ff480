//! git::interface
//!
//! Error types and the read-only `git2` view of a working tree.
//!
//! Mutations (init, remote add, fetch, checkout) go through the git CLI via
//! [`crate::git::GitRunner`], because fetch and checkout behaviour must match
//! what the user's own git does (credential helpers, submodules, protocol
//! negotiation). Inspecting the result afterwards needs no process spawn,
//! so [`Repo`] reads it directly with `git2`.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::Spawn`]: The git program could not be started
//! - [`GitError::NotARepo`]: No repository at the given path
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//!
//! # Example
//!
//! ```ignore
//! use gitctx::git::Repo;
//! use std::path::Path;
//!
//! let repo = Repo::open(Path::new("/tmp/gitctx-abc"))?;
//! let head = repo.head()?;
//! println!("checked out {}", head.oid.short(7));
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::core::types::{Oid, TypeError};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// The git program could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// The program that failed to start
        program: String,
        source: std::io::Error,
    },

    /// No repository at the given path.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Requested ref does not exist (or HEAD is unborn).
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with the ref being read.
    fn from_git2(err: git2::Error, refname: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::UnbornBranch => GitError::RefNotFound {
                refname: refname.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", refname, err.message()),
            },
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidOid {
            oid: err.to_string(),
        }
    }
}

/// The checked-out state of a working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadInfo {
    /// Commit HEAD resolves to
    pub oid: Oid,
    /// Branch HEAD points at, `None` when detached
    pub branch: Option<String>,
    /// Whether the repository has truncated (shallow) history
    pub shallow: bool,
}

/// Read-only view of a repository through `git2`.
pub struct Repo {
    repo: git2::Repository,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Repo {
    /// Open the repository whose working tree is exactly `path`.
    ///
    /// Unlike discovery, this never walks up to a parent repository, so a
    /// working tree allocated inside another checkout is not confused with
    /// its parent.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Describe HEAD: commit, branch (if symbolic) and shallowness.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (nothing checked out)
    pub fn head(&self) -> Result<HeadInfo, GitError> {
        let head = self
            .repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;

        let oid = head
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .id();

        let branch = if head.is_branch() {
            head.shorthand().map(String::from)
        } else {
            None
        };

        Ok(HeadInfo {
            oid: Oid::new(oid.to_string())?,
            branch,
            shallow: self.repo.is_shallow(),
        })
    }
}

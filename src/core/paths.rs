//! core::paths
//!
//! Path routing for working trees and confinement of user-supplied
//! subdirectories.
//!
//! # Working tree layout
//!
//! Every git invocation against a working tree is scoped explicitly with
//! `--work-tree <root> --git-dir <root>/.git`, so the layout is computed in
//! one place: [`WorkTreePaths`].
//!
//! # Confinement
//!
//! [`resolve_in_scope`] is the only way a subdirectory taken from a locator
//! becomes a filesystem path. It follows symlinks and then requires the
//! result to still be under the canonical root. A fetched tree is attacker
//! controlled, so a symlink such as `docs -> /etc` must never be handed back
//! as a build context.
//!
//! # Example
//!
//! ```
//! use gitctx::core::paths::WorkTreePaths;
//! use std::path::PathBuf;
//!
//! let paths = WorkTreePaths::new(PathBuf::from("/tmp/gitctx-abc"));
//! assert_eq!(paths.git_dir(), PathBuf::from("/tmp/gitctx-abc/.git"));
//! ```

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Name of the metadata directory inside a working tree.
pub const METADATA_DIR: &str = ".git";

/// Errors from scoped path resolution.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The relative path contained a root, drive prefix or was otherwise absolute.
    #[error("'{path}' is not a relative path")]
    NotRelative {
        /// The rejected path
        path: PathBuf,
    },

    /// The path resolved to a location outside the root.
    #[error("'{resolved}' is outside of '{root}'")]
    Escapes {
        /// The fully resolved path
        resolved: PathBuf,
        /// The canonical root
        root: PathBuf,
    },

    /// The path (or the root) could not be resolved.
    #[error("cannot resolve '{path}': {source}")]
    Unresolvable {
        /// The path that failed to resolve
        path: PathBuf,
        source: io::Error,
    },
}

/// Computed locations inside a working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkTreePaths {
    root: PathBuf,
}

impl WorkTreePaths {
    /// Create paths for the working tree rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The working tree root (`--work-tree`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The metadata directory (`--git-dir`).
    pub fn git_dir(&self) -> PathBuf {
        self.root.join(METADATA_DIR)
    }
}

/// Resolve `relative` inside `root`, following symlinks.
///
/// Returns the canonical path if and only if it lies within the canonical
/// `root`. The target must exist.
///
/// # Errors
///
/// - [`ScopeError::NotRelative`] if `relative` has a root or prefix component
/// - [`ScopeError::Unresolvable`] if `root` or the target cannot be canonicalized
/// - [`ScopeError::Escapes`] if the resolved target is outside `root`
pub fn resolve_in_scope(root: &Path, relative: &Path) -> Result<PathBuf, ScopeError> {
    if relative
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_)))
    {
        return Err(ScopeError::NotRelative {
            path: relative.to_path_buf(),
        });
    }

    let canonical_root = fs::canonicalize(root).map_err(|source| ScopeError::Unresolvable {
        path: root.to_path_buf(),
        source,
    })?;

    let candidate = canonical_root.join(relative);
    let resolved = fs::canonicalize(&candidate).map_err(|source| ScopeError::Unresolvable {
        path: candidate.clone(),
        source,
    })?;

    if !resolved.starts_with(&canonical_root) {
        return Err(ScopeError::Escapes {
            resolved,
            root: canonical_root,
        });
    }

    Ok(resolved)
}

//! engine::checkout
//!
//! Check out the fetched ref and narrow the result to a subdirectory.
//!
//! Checking out by name works for branches and leaves HEAD symbolic on the
//! branch. Tags and other refs a plain `fetch` does not store locally fail
//! that, so the fetched commit is checked out through `FETCH_HEAD` instead.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::workdir::{TreeState, WorkTree};
use crate::core::paths::{resolve_in_scope, ScopeError};
use crate::git::{GitError, GitOutput, GitRunner, WorkTreeGit};

/// Errors from checkout and subdirectory narrowing.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Every strategy failed. Reports the named ref's failure.
    #[error("error checking out {git_ref}: {output}")]
    Failed {
        /// The ref that was asked for
        git_ref: String,
        /// Output of `checkout <ref>`
        output: GitOutput,
        /// Output of `checkout FETCH_HEAD`
        fallback_output: GitOutput,
    },

    /// git could not be run at all.
    #[error("git checkout could not run")]
    Git(#[source] GitError),

    /// The subdirectory escapes the tree or cannot be resolved.
    #[error("error setting git context, '{subdir}' not within git root")]
    Subdir {
        subdir: String,
        #[source]
        source: ScopeError,
    },

    /// The subdirectory resolved to something other than a directory.
    #[error("error setting git context, not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// The resolved subdirectory could not be stat'ed.
    #[error("error setting git context: {}", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ways to check out the fetched content, tried in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStrategy {
    /// The ref by name.
    Named(String),
    /// Whatever the last fetch retrieved.
    FetchHead,
}

impl CheckoutStrategy {
    /// Strategies for `git_ref`, most specific first.
    pub fn for_ref(git_ref: &str) -> [CheckoutStrategy; 2] {
        [
            CheckoutStrategy::Named(git_ref.to_string()),
            CheckoutStrategy::FetchHead,
        ]
    }

    /// The argument handed to `git checkout`.
    pub fn target(&self) -> &str {
        match self {
            CheckoutStrategy::Named(name) => name,
            CheckoutStrategy::FetchHead => "FETCH_HEAD",
        }
    }
}

/// Check out `git_ref` in `tree`, then narrow to `subdir` if non-empty.
///
/// Returns the absolute directory a build should use as its root.
pub fn checkout<R: GitRunner + ?Sized>(
    runner: &R,
    tree: &mut WorkTree,
    git_ref: &str,
    subdir: &str,
) -> Result<PathBuf, CheckoutError> {
    let git = WorkTreeGit::new(runner, tree.root());

    let strategies = CheckoutStrategy::for_ref(git_ref);
    let mut failures = Vec::with_capacity(strategies.len());
    for strategy in &strategies {
        let output = git
            .run(["checkout", strategy.target()])
            .map_err(CheckoutError::Git)?;
        if output.success() {
            debug!(checkout = strategy.target(), "checked out");
            break;
        }
        debug!(checkout = strategy.target(), %output, "checkout failed");
        failures.push(output);
    }

    if failures.len() == strategies.len() {
        let mut failures = failures.into_iter();
        if let (Some(output), Some(fallback_output)) = (failures.next(), failures.next()) {
            return Err(CheckoutError::Failed {
                git_ref: git_ref.to_string(),
                output,
                fallback_output,
            });
        }
    }
    tree.advance(TreeState::CheckedOut);

    if subdir.is_empty() {
        return Ok(tree.root().to_path_buf());
    }

    let context = narrow(tree.root(), subdir)?;
    tree.advance(TreeState::Narrowed);
    Ok(context)
}

fn narrow(root: &Path, subdir: &str) -> Result<PathBuf, CheckoutError> {
    let resolved =
        resolve_in_scope(root, Path::new(subdir)).map_err(|source| CheckoutError::Subdir {
            subdir: subdir.to_string(),
            source,
        })?;

    ensure_dir(resolved)
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, CheckoutError> {
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => Ok(path),
        Ok(_) => Err(CheckoutError::NotADirectory { path }),
        Err(source) => Err(CheckoutError::Stat { path, source }),
    }
}

//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **only doorway** to Git. No other module spawns a
//! git process or imports `git2`.
//!
//! - [`GitRunner`] / [`SystemGit`] run the git CLI with an argument vector
//!   and return exit code plus combined output
//! - [`WorkTreeGit`] scopes a runner to one working tree
//!   (`--work-tree <dir> --git-dir <dir>/.git`)
//! - [`Repo`] reads the resulting repository through `git2`
//!
//! # Invariants
//!
//! - Every mutating invocation is scoped to an explicit working tree
//! - A non-zero exit is reported with its full output, never swallowed
//!
//! # Example
//!
//! ```ignore
//! use gitctx::git::{SystemGit, WorkTreeGit};
//! use std::path::Path;
//!
//! let system = SystemGit::default();
//! let git = WorkTreeGit::new(&system, Path::new("/tmp/gitctx-abc"));
//! let out = git.run(["init"])?;
//! assert!(out.success());
//! ```

mod interface;
mod runner;

pub use interface::{GitError, HeadInfo, Repo};
pub use runner::{GitOutput, GitRunner, SystemGit, WorkTreeGit};

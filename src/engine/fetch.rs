//! engine::fetch
//!
//! Populate a fresh working tree from a remote.
//!
//! The sequence is `init`, `remote add`, `fetch`. The first two form the
//! register phase, whose only product is a [`RegisteredRemote`]; the fetch
//! consumes it. Both phases run inside [`fetch`], so a caller can never
//! fetch into a tree without a remote or register a remote twice.

use std::ffi::OsString;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::workdir::{TreeState, WorkTree};
use crate::core::locator::RepoDescriptor;
use crate::core::types::RemoteName;
use crate::git::{GitError, GitOutput, GitRunner, WorkTreeGit};

/// Step of the fetch sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Init,
    RemoteAdd,
    Fetch,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FetchPhase::Init => "init",
            FetchPhase::RemoteAdd => "remote add",
            FetchPhase::Fetch => "fetch",
        })
    }
}

/// Errors from populating a working tree.
#[derive(Debug, Error)]
pub enum FetchError {
    /// git ran and exited non-zero.
    #[error("git {phase} failed ({output})")]
    Failed {
        /// The failing step
        phase: FetchPhase,
        /// Exit status and combined output, verbatim
        output: GitOutput,
    },

    /// git could not be run at all.
    #[error("git {phase} could not run")]
    Git {
        /// The step being attempted
        phase: FetchPhase,
        #[source]
        source: GitError,
    },
}

impl FetchError {
    /// The step that failed.
    pub fn phase(&self) -> FetchPhase {
        match self {
            FetchError::Failed { phase, .. } | FetchError::Git { phase, .. } => *phase,
        }
    }

    /// Tool output, when git ran.
    pub fn output(&self) -> Option<&GitOutput> {
        match self {
            FetchError::Failed { output, .. } => Some(output),
            FetchError::Git { .. } => None,
        }
    }
}

/// Arguments for the fetch step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPlan<'a> {
    pub remote_name: &'a RemoteName,
    pub git_ref: &'a str,
    pub shallow: bool,
}

impl FetchPlan<'_> {
    /// `fetch --recurse-submodules=yes [--depth 1] <remote> -- <ref>`
    ///
    /// The `--` keeps a ref beginning with `-` from being read as an option.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["fetch".into(), "--recurse-submodules=yes".into()];
        if self.shallow {
            args.push("--depth".into());
            args.push("1".into());
        }
        args.push(self.remote_name.as_str().into());
        args.push("--".into());
        args.push(self.git_ref.into());
        args
    }
}

/// Proof that a working tree has a repository and a registered remote.
#[must_use]
#[derive(Debug)]
pub struct RegisteredRemote {
    name: RemoteName,
}

fn run_phase<R: GitRunner + ?Sized>(
    git: &WorkTreeGit<'_, R>,
    phase: FetchPhase,
    args: Vec<OsString>,
) -> Result<GitOutput, FetchError> {
    let output = git
        .run(args)
        .map_err(|source| FetchError::Git { phase, source })?;
    if !output.success() {
        return Err(FetchError::Failed { phase, output });
    }
    Ok(output)
}

fn register_remote<R: GitRunner + ?Sized>(
    git: &WorkTreeGit<'_, R>,
    tree: &mut WorkTree,
    remote: &str,
    name: &RemoteName,
) -> Result<RegisteredRemote, FetchError> {
    run_phase(git, FetchPhase::Init, vec!["init".into()])?;
    tree.advance(TreeState::Initialized);

    run_phase(
        git,
        FetchPhase::RemoteAdd,
        vec!["remote".into(), "add".into(), name.as_str().into(), remote.into()],
    )?;
    tree.advance(TreeState::RemoteRegistered);

    Ok(RegisteredRemote { name: name.clone() })
}

fn fetch_into<R: GitRunner + ?Sized>(
    git: &WorkTreeGit<'_, R>,
    tree: &mut WorkTree,
    remote: RegisteredRemote,
    git_ref: &str,
    shallow: bool,
) -> Result<(), FetchError> {
    let plan = FetchPlan {
        remote_name: &remote.name,
        git_ref,
        shallow,
    };
    let output = run_phase(git, FetchPhase::Fetch, plan.args())?;
    debug!(git_ref, shallow, output = %output.output.trim_end(), "fetched");
    tree.advance(TreeState::Fetched);
    Ok(())
}

/// Initialize `tree`, register `descriptor`'s remote as `remote_name`,
/// and fetch its ref (with `--depth 1` when `shallow`).
pub fn fetch<R: GitRunner + ?Sized>(
    runner: &R,
    tree: &mut WorkTree,
    descriptor: &RepoDescriptor,
    remote_name: &RemoteName,
    shallow: bool,
) -> Result<(), FetchError> {
    let git = WorkTreeGit::new(runner, tree.root());
    let registered = register_remote(&git, tree, descriptor.remote(), remote_name)?;
    fetch_into(&git, tree, registered, descriptor.git_ref(), shallow)
}

//! git::runner
//!
//! Process execution for git commands.
//!
//! [`GitRunner`] is the seam between orchestration and the git program:
//! it takes an argument vector and returns the exit code together with the
//! combined output. [`SystemGit`] runs a real process; tests substitute a
//! recording fake.
//!
//! [`WorkTreeGit`] binds a runner to one working tree and prefixes every
//! invocation with `--work-tree <root> --git-dir <root>/.git`, so commands
//! never depend on the process working directory or on a repository found
//! by discovery.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use super::GitError;
use crate::core::paths::WorkTreePaths;

/// Result of a finished git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    /// stdout followed by stderr, lossily decoded
    pub output: String,
}

impl GitOutput {
    /// Build an output record from an exit code and text.
    pub fn new(code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            code,
            output: output.into(),
        }
    }

    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl fmt::Display for GitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {}", code)?,
            None => write!(f, "terminated by signal")?,
        }
        let trimmed = self.output.trim_end();
        if !trimmed.is_empty() {
            write!(f, ": {}", trimmed)?;
        }
        Ok(())
    }
}

/// Runs git with an argument vector.
///
/// A non-zero exit is *not* an error at this level; only failing to run
/// the program at all is. Callers decide what a non-zero exit means.
pub trait GitRunner {
    fn run(&self, args: &[OsString]) -> Result<GitOutput, GitError>;
}

impl<T: GitRunner + ?Sized> GitRunner for &T {
    fn run(&self, args: &[OsString]) -> Result<GitOutput, GitError> {
        (**self).run(args)
    }
}

/// Runs the system git program.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: OsString,
}

impl SystemGit {
    /// Run `program` (e.g. `git` or `/usr/local/bin/git`).
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemGit {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitRunner for SystemGit {
    fn run(&self, args: &[OsString]) -> Result<GitOutput, GitError> {
        debug!(program = ?self.program, ?args, "running git");

        // Credential prompts would block forever without a terminal.
        let output = Command::new(&self.program)
            .args(args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .map_err(|source| GitError::Spawn {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        let result = GitOutput::new(output.status.code(), combined);
        debug!(code = ?result.code, "git finished");
        Ok(result)
    }
}

/// A runner bound to one working tree.
pub struct WorkTreeGit<'a, R: GitRunner + ?Sized> {
    runner: &'a R,
    paths: WorkTreePaths,
}

impl<'a, R: GitRunner + ?Sized> WorkTreeGit<'a, R> {
    pub fn new(runner: &'a R, root: &Path) -> Self {
        Self {
            runner,
            paths: WorkTreePaths::new(root.to_path_buf()),
        }
    }

    /// Full argument vector for `args`, including the scoping prefix.
    pub fn scoped_args<I, S>(&self, args: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut full: Vec<OsString> = vec![
            "--work-tree".into(),
            self.paths.root().as_os_str().to_owned(),
            "--git-dir".into(),
            self.paths.git_dir().into_os_string(),
        ];
        full.extend(args.into_iter().map(|a| a.as_ref().to_owned()));
        full
    }

    /// Run git scoped to this working tree.
    pub fn run<I, S>(&self, args: I) -> Result<GitOutput, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.runner.run(&self.scoped_args(args))
    }
}

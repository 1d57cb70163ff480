//! Fake git runner for engine unit tests.

use std::cell::RefCell;
use std::ffi::OsString;

use crate::git::{GitError, GitOutput, GitRunner};

/// Number of scoping arguments `WorkTreeGit` prepends.
const SCOPE_PREFIX: usize = 4;

type Responder = Box<dyn Fn(&[String]) -> GitOutput>;

/// Records every invocation and answers from a closure over the
/// unscoped arguments (`["fetch", ...]`, `["checkout", "main"]`).
pub struct FakeGit {
    respond: Responder,
    calls: RefCell<Vec<Vec<String>>>,
}

impl FakeGit {
    pub fn new(respond: impl Fn(&[String]) -> GitOutput + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Every command succeeds with no output.
    pub fn ok() -> Self {
        Self::new(|_| GitOutput::new(Some(0), ""))
    }

    /// Unscoped arguments of each call, in order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().clone()
    }

    /// First argument (the subcommand) of each call.
    pub fn subcommands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| c.into_iter().next())
            .collect()
    }
}

impl GitRunner for FakeGit {
    fn run(&self, args: &[OsString]) -> Result<GitOutput, GitError> {
        assert_eq!(
            args.first().map(|a| a.to_string_lossy()).as_deref(),
            Some("--work-tree")
        );
        let unscoped: Vec<String> = args
            .iter()
            .skip(SCOPE_PREFIX)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        self.calls.borrow_mut().push(unscoped.clone());
        Ok((self.respond)(&unscoped))
    }
}

pub fn ok() -> GitOutput {
    GitOutput::new(Some(0), "")
}

pub fn fail(text: &str) -> GitOutput {
    GitOutput::new(Some(1), text)
}

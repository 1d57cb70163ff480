//! engine
//!
//! Turns a locator into a checked-out build context.
//!
//! # Pipeline
//!
//! ```text
//! Parse -> Classify -> Allocate -> Fetch -> Checkout
//! ```
//!
//! Each step short-circuits on failure. [`Resolver`] composes them over
//! two seams: a [`GitRunner`] for every git invocation and an
//! [`HttpProbe`] for transport classification.
//!
//! # Invariants
//!
//! - The working tree is never deleted here, on success or failure
//! - Every error raised after allocation carries the working tree path
//! - The returned context directory is inside the working tree
//!
//! # Example
//!
//! ```ignore
//! use gitctx::engine::{ResolveOptions, Resolver};
//! use gitctx::git::SystemGit;
//! use gitctx::transport::ReqwestProbe;
//!
//! let resolver = Resolver::new(
//!     SystemGit::default(),
//!     ReqwestProbe::new()?,
//!     ResolveOptions::default(),
//! );
//! let ctx = resolver.resolve("github.com/org/repo#v1.0:tools/build")?;
//! println!("{}", ctx.context_dir.display());
//! ```

pub mod checkout;
pub mod fetch;
pub mod workdir;

#[cfg(test)]
pub(crate) mod testing;

pub use checkout::{checkout, CheckoutError, CheckoutStrategy};
pub use fetch::{fetch, FetchError, FetchPhase, FetchPlan, RegisteredRemote};
pub use workdir::{TreeState, WorkTree, WorkdirError};

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::config::{Config, ShallowPolicy, DEFAULT_TEMP_PREFIX};
use crate::core::locator::{self, ParseError, RepoDescriptor};
use crate::core::types::{BranchName, RemoteName};
use crate::git::{GitRunner, HeadInfo, Repo, SystemGit};
use crate::transport::{self, HttpProbe, ProbeError, ReqwestProbe};

/// Errors from [`Resolver::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No working tree could be set up.
    #[error(transparent)]
    Workdir(#[from] WorkdirError),

    #[error("failed to fetch into {}", work_tree.display())]
    Fetch {
        /// The working tree left behind
        work_tree: PathBuf,
        #[source]
        source: FetchError,
    },

    #[error("failed to check out in {}", work_tree.display())]
    Checkout {
        /// The working tree left behind
        work_tree: PathBuf,
        #[source]
        source: CheckoutError,
    },
}

impl ResolveError {
    /// The working tree left on disk, if one was allocated.
    pub fn work_tree(&self) -> Option<&Path> {
        match self {
            ResolveError::Parse(_) | ResolveError::Workdir(_) => None,
            ResolveError::Fetch { work_tree, .. } | ResolveError::Checkout { work_tree, .. } => {
                Some(work_tree)
            }
        }
    }
}

/// Settings for a resolution. Built from [`Config`] and then overridden by
/// CLI flags.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Ref used when the locator names none
    pub default_ref: BranchName,
    /// Name the remote is registered under
    pub remote_name: RemoteName,
    pub shallow: ShallowPolicy,
    /// Prefix for allocated temporary directories
    pub temp_prefix: String,
    /// Use this (empty or missing) directory instead of a temporary one
    pub destination: Option<PathBuf>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            default_ref: BranchName::default_primary(),
            remote_name: RemoteName::default(),
            shallow: ShallowPolicy::default(),
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            destination: None,
        }
    }
}

impl ResolveOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_ref: config.default_ref(),
            remote_name: config.remote_name(),
            shallow: config.shallow_policy(),
            temp_prefix: config.temp_prefix().to_string(),
            destination: None,
        }
    }
}

/// A checked-out build context.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedContext {
    /// Root of the working tree (owned by the caller)
    pub root: PathBuf,
    /// Directory to use as the build root; `root` or a directory inside it
    pub context_dir: PathBuf,
    /// The parsed locator
    pub repo: RepoDescriptor,
    /// Whether the fetch used `--depth 1`
    pub shallow: bool,
    /// Checked-out HEAD, when it could be read
    pub head: Option<HeadInfo>,
}

/// Resolves locators to build contexts.
pub struct Resolver<R, P> {
    git: R,
    probe: P,
    options: ResolveOptions,
}

impl Resolver<SystemGit, ReqwestProbe> {
    /// A resolver using the configured git program and probe settings.
    pub fn from_config(config: &Config) -> Result<Self, ProbeError> {
        let probe = ReqwestProbe::with_options(config.probe_timeout(), config.probe_user_agent())?;
        Ok(Self::new(
            SystemGit::new(config.git_program()),
            probe,
            ResolveOptions::from_config(config),
        ))
    }
}

impl<R: GitRunner, P: HttpProbe> Resolver<R, P> {
    pub fn new(git: R, probe: P, options: ResolveOptions) -> Self {
        Self {
            git,
            probe,
            options,
        }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ResolveOptions {
        &mut self.options
    }

    /// Parse `locator` with the configured default ref.
    pub fn parse(&self, locator: &str) -> Result<RepoDescriptor, ParseError> {
        locator::parse_with_default(locator, &self.options.default_ref)
    }

    /// Whether a fetch from `remote` will be shallow under the current policy.
    pub fn classify(&self, remote: &str) -> bool {
        match self.options.shallow {
            ShallowPolicy::Never => false,
            ShallowPolicy::Auto => transport::supports_shallow(remote, &self.probe),
        }
    }

    /// Resolve `locator` into a checked-out directory.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::Parse`] for a malformed locator (nothing allocated)
    /// - [`ResolveError::Workdir`] if no working tree could be set up
    /// - [`ResolveError::Fetch`] / [`ResolveError::Checkout`] otherwise,
    ///   carrying the working tree left on disk
    pub fn resolve(&self, locator: &str) -> Result<ResolvedContext, ResolveError> {
        let repo = self.parse(locator)?;
        debug!(
            remote = repo.remote(),
            git_ref = repo.git_ref(),
            subdir = repo.subdir(),
            "parsed locator"
        );

        let shallow = self.classify(repo.remote());

        let mut tree = match &self.options.destination {
            Some(dest) => WorkTree::prepare(dest)?,
            None => WorkTree::allocate(&self.options.temp_prefix)?,
        };

        if let Err(source) = fetch(
            &self.git,
            &mut tree,
            &repo,
            &self.options.remote_name,
            shallow,
        ) {
            return Err(ResolveError::Fetch {
                work_tree: tree.into_path(),
                source,
            });
        }

        let context_dir = match checkout(&self.git, &mut tree, repo.git_ref(), repo.subdir()) {
            Ok(dir) => dir,
            Err(source) => {
                return Err(ResolveError::Checkout {
                    work_tree: tree.into_path(),
                    source,
                })
            }
        };

        let head = match Repo::open(tree.root()).and_then(|r| r.head()) {
            Ok(head) => Some(head),
            Err(err) => {
                warn!(
                    root = %tree.root().display(),
                    error = %err,
                    "could not read checked-out HEAD"
                );
                None
            }
        };

        info!(
            repo = %repo,
            shallow,
            context = %context_dir.display(),
            commit = head.as_ref().map(|h| h.oid.short(12)),
            "resolved build context"
        );

        Ok(ResolvedContext {
            root: tree.into_path(),
            context_dir,
            repo,
            shallow,
            head,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::GitOutput;
    use crate::transport::{ProbeMethod, ProbeResponse, SMART_CONTENT_TYPE};
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;
    use super::testing::{fail, ok, FakeGit};

    /// Answers every probe with a fixed content type and counts requests.
    struct FixedProbe {
        content_type: Option<&'static str>,
        requests: Cell<usize>,
    }

    impl FixedProbe {
        fn smart() -> Self {
            Self {
                content_type: Some(SMART_CONTENT_TYPE),
                requests: Cell::new(0),
            }
        }

        fn dumb() -> Self {
            Self {
                content_type: Some("text/plain"),
                requests: Cell::new(0),
            }
        }
    }

    impl HttpProbe for FixedProbe {
        fn request(&self, _: ProbeMethod, _: &str) -> Result<ProbeResponse, ProbeError> {
            self.requests.set(self.requests.get() + 1);
            Ok(ProbeResponse {
                status: 200,
                content_type: self.content_type.map(String::from),
            })
        }
    }

    fn into(dest: &Path) -> ResolveOptions {
        ResolveOptions {
            destination: Some(dest.to_path_buf()),
            ..ResolveOptions::default()
        }
    }

    fn fetch_args(git: &FakeGit) -> Vec<String> {
        git.calls()
            .into_iter()
            .find(|c| c[0] == "fetch")
            .unwrap_or_default()
    }

    #[test]
    fn parse_error_allocates_nothing() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("ctx");
        let git = FakeGit::ok();
        let resolver = Resolver::new(&git, FixedProbe::smart(), into(&dest));

        let err = resolver.resolve("http://[::1/repo").unwrap_err();

        assert!(matches!(err, ResolveError::Parse(_)));
        assert!(err.work_tree().is_none());
        assert!(!dest.exists());
        assert!(git.calls().is_empty());
    }

    #[test]
    fn smart_http_remote_fetches_shallow() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::ok();
        let probe = FixedProbe::smart();
        let resolver = Resolver::new(&git, &probe, into(dir.path()));

        let ctx = resolver.resolve("https://host/org/repo.git#dev").unwrap();

        assert!(ctx.shallow);
        assert_eq!(probe.requests.get(), 1);
        assert!(fetch_args(&git).contains(&"--depth".to_string()));
        assert_eq!(ctx.context_dir, ctx.root);
        assert_eq!(ctx.repo.git_ref(), "dev");
        assert_eq!(git.subcommands(), ["init", "remote", "fetch", "checkout"]);
    }

    #[test]
    fn dumb_http_remote_fetches_full_history() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::ok();
        let resolver = Resolver::new(&git, FixedProbe::dumb(), into(dir.path()));

        let ctx = resolver.resolve("http://host/repo.git").unwrap();

        assert!(!ctx.shallow);
        assert!(!fetch_args(&git).contains(&"--depth".to_string()));
    }

    #[test]
    fn never_policy_skips_probe() {
        let dir = TempDir::new().unwrap();
        let probe = FixedProbe::smart();
        let mut options = into(dir.path());
        options.shallow = ShallowPolicy::Never;
        let resolver = Resolver::new(FakeGit::ok(), &probe, options);

        let ctx = resolver.resolve("https://host/repo.git").unwrap();

        assert!(!ctx.shallow);
        assert_eq!(probe.requests.get(), 0);
    }

    #[test]
    fn configured_default_ref_and_remote_name_apply() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::ok();
        let mut options = into(dir.path());
        options.default_ref = BranchName::new("main").unwrap();
        options.remote_name = RemoteName::new("upstream").unwrap();
        let resolver = Resolver::new(&git, FixedProbe::smart(), options);

        let ctx = resolver.resolve("git@host:org/repo.git").unwrap();

        assert_eq!(ctx.repo.git_ref(), "main");
        let calls = git.calls();
        assert_eq!(calls[1], ["remote", "add", "upstream", "git@host:org/repo.git"]);
        assert_eq!(calls[3], ["checkout", "main"]);
    }

    #[test]
    fn fetch_failure_reports_work_tree() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::new(|args| match args[0].as_str() {
            "fetch" => fail("fatal: couldn't find remote ref nope"),
            _ => ok(),
        });
        let resolver = Resolver::new(&git, FixedProbe::smart(), into(dir.path()));

        let err = resolver.resolve("git@host:repo.git#nope").unwrap_err();

        assert!(matches!(err, ResolveError::Fetch { .. }));
        assert_eq!(err.work_tree(), Some(fs::canonicalize(dir.path()).unwrap().as_path()));
        assert!(!git.subcommands().contains(&"checkout".to_string()));
    }

    #[test]
    fn checkout_failure_reports_work_tree() {
        let dir = TempDir::new().unwrap();
        let git = FakeGit::new(|args| match args[0].as_str() {
            "checkout" => GitOutput::new(Some(1), "error: pathspec"),
            _ => ok(),
        });
        let resolver = Resolver::new(&git, FixedProbe::smart(), into(dir.path()));

        let err = resolver.resolve("git@host:repo.git#gone").unwrap_err();

        assert!(matches!(
            err,
            ResolveError::Checkout {
                source: CheckoutError::Failed { .. },
                ..
            }
        ));
        assert!(err.work_tree().is_some());
    }

    #[test]
    fn non_empty_destination_is_refused() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("occupied"), "").unwrap();
        let git = FakeGit::ok();
        let resolver = Resolver::new(&git, FixedProbe::smart(), into(dir.path()));

        let err = resolver.resolve("git@host:repo.git").unwrap_err();

        assert!(matches!(err, ResolveError::Workdir(WorkdirError::NotEmpty { .. })));
        assert!(git.calls().is_empty());
    }

    #[test]
    fn unreadable_head_is_not_fatal() {
        // The fake runner never creates a repository, so HEAD cannot be read.
        let dir = TempDir::new().unwrap();
        let resolver = Resolver::new(FakeGit::ok(), FixedProbe::smart(), into(dir.path()));

        let ctx = resolver.resolve("git@host:repo.git").unwrap();
        assert!(ctx.head.is_none());
    }

    #[test]
    fn options_from_config() {
        let mut config = Config::default();
        config.set("default_ref", "trunk").unwrap();
        config.set("fetch.shallow", "never").unwrap();
        config.set("temp_prefix", "ctx-").unwrap();

        let options = ResolveOptions::from_config(&config);
        assert_eq!(options.default_ref.as_str(), "trunk");
        assert_eq!(options.shallow, ShallowPolicy::Never);
        assert_eq!(options.temp_prefix, "ctx-");
        assert!(options.destination.is_none());
    }
}

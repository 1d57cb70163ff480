//! core::locator
//!
//! Git locator parsing.
//!
//! A locator is a remote address with an optional `#ref[:subdir]` fragment:
//!
//! ```text
//! https://host/org/repo.git#feature:docs
//! git@host:org/repo.git#main
//! host/org/repo#:path/to/sub
//! ```
//!
//! # Transport qualification
//!
//! A locator is already qualified when it carries a known scheme
//! ([`KNOWN_SCHEMES`]) or uses the scp-like `user@host:path` form.
//! Anything else is assumed to be an HTTPS remote and gets `https://`
//! prepended.
//!
//! scp-like addresses are not URLs, so their fragment is split off
//! textually and kept verbatim. Every other locator goes through
//! [`url::Url`], which also normalizes the remote (lowercased scheme and
//! host, percent-encoding). The URL fragment comes back percent-encoded and
//! is decoded before it is split, so `#main:my dir` and `#main:my%20dir`
//! both name the subdirectory `my dir`.
//!
//! # Example
//!
//! ```
//! use gitctx::core::locator::parse;
//!
//! let repo = parse("github.com/org/repo#v1.0:tools/build").unwrap();
//! assert_eq!(repo.remote(), "https://github.com/org/repo");
//! assert_eq!(repo.git_ref(), "v1.0");
//! assert_eq!(repo.subdir(), "tools/build");
//! ```

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::core::types::BranchName;

/// URL schemes git understands natively.
pub const KNOWN_SCHEMES: &[&str] = &["http", "https", "git", "ssh", "git+ssh", "ssh+git", "file"];

/// Errors from locator parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The locator took the URL path and the URL was malformed.
    #[error("invalid git locator '{locator}': {source}")]
    InvalidUrl {
        /// The locator as given by the user
        locator: String,
        /// The underlying URL syntax error
        #[source]
        source: url::ParseError,
    },

    /// The fragment decoded to bytes that are not UTF-8.
    #[error("invalid git locator '{locator}': fragment is not valid UTF-8")]
    InvalidFragment {
        /// The locator as given by the user
        locator: String,
    },
}

/// A parsed git locator.
///
/// Immutable once parsed. Fields are exposed through accessors so the
/// invariants established by [`parse_with_default`] hold for the lifetime
/// of the value:
///
/// - `git_ref` is never empty
/// - `subdir` is empty or relative (no leading `/`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoDescriptor {
    remote: String,
    #[serde(rename = "ref")]
    git_ref: String,
    subdir: String,
}

impl RepoDescriptor {
    /// The fetchable remote address, without fragment.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Branch, tag or commit-ish to check out.
    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    /// Relative directory inside the checkout, possibly empty.
    pub fn subdir(&self) -> &str {
        &self.subdir
    }

    /// Whether the locator asked for a subdirectory.
    pub fn has_subdir(&self) -> bool {
        !self.subdir.is_empty()
    }
}

impl fmt::Display for RepoDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.remote, self.git_ref)?;
        if self.has_subdir() {
            write!(f, ":{}", self.subdir)?;
        }
        Ok(())
    }
}

/// Parse a locator, defaulting the ref to [`BranchName::default_primary`].
pub fn parse(locator: &str) -> Result<RepoDescriptor, ParseError> {
    parse_with_default(locator, &BranchName::default_primary())
}

/// Parse a locator, using `default_ref` when the fragment names no ref.
///
/// # Errors
///
/// - [`ParseError::InvalidUrl`] when a non-scp locator is not a
///   syntactically valid URL
/// - [`ParseError::InvalidFragment`] when its fragment percent-decodes to
///   invalid UTF-8
///
/// No other validation happens here; whether the ref exists or the subdir
/// is usable is decided by git and the checkout.
pub fn parse_with_default(
    locator: &str,
    default_ref: &BranchName,
) -> Result<RepoDescriptor, ParseError> {
    let qualified: Cow<'_, str> = if is_git_transport(locator) {
        Cow::Borrowed(locator)
    } else {
        Cow::Owned(format!("https://{locator}"))
    };

    let (remote, fragment) = if is_scp_like(&qualified) {
        match qualified.split_once('#') {
            Some((remote, fragment)) => (remote.to_string(), fragment.to_string()),
            None => (qualified.into_owned(), String::new()),
        }
    } else {
        let mut url = Url::parse(&qualified).map_err(|source| ParseError::InvalidUrl {
            locator: locator.to_string(),
            source,
        })?;
        let fragment = percent_decode_str(url.fragment().unwrap_or_default())
            .decode_utf8()
            .map_err(|_| ParseError::InvalidFragment {
                locator: locator.to_string(),
            })?
            .into_owned();
        url.set_fragment(None);
        (String::from(url), fragment)
    };

    let (git_ref, subdir) = split_fragment(&fragment, default_ref.as_str());
    Ok(RepoDescriptor {
        remote,
        git_ref,
        subdir,
    })
}

/// Split a `ref[:subdir]` fragment.
///
/// Splits once on `:`. An empty ref segment becomes `default_ref`; leading
/// `/` characters are stripped from the subdir so it stays relative.
///
/// ```
/// use gitctx::core::locator::split_fragment;
///
/// assert_eq!(split_fragment("", "master"), ("master".into(), "".into()));
/// assert_eq!(split_fragment(":docs", "master"), ("master".into(), "docs".into()));
/// assert_eq!(split_fragment("v2:a:b", "master"), ("v2".into(), "a:b".into()));
/// ```
pub fn split_fragment(fragment: &str, default_ref: &str) -> (String, String) {
    let (git_ref, subdir) = fragment.split_once(':').unwrap_or((fragment, ""));
    let git_ref = if git_ref.is_empty() {
        default_ref
    } else {
        git_ref
    };
    (git_ref.to_string(), subdir.trim_start_matches('/').to_string())
}

/// Whether `s` starts with `<scheme>://` for one of [`KNOWN_SCHEMES`].
fn has_known_scheme(s: &str) -> bool {
    s.split_once("://").is_some_and(|(scheme, _)| {
        KNOWN_SCHEMES
            .iter()
            .any(|known| scheme.eq_ignore_ascii_case(known))
    })
}

/// Whether `s` is an HTTP(S) URL.
pub fn is_url(s: &str) -> bool {
    s.split_once("://").is_some_and(|(scheme, _)| {
        scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
    })
}

/// Whether `s` uses git's scp-like syntax, `[user@]host:path`, with a user.
///
/// ```
/// use gitctx::core::locator::is_scp_like;
///
/// assert!(is_scp_like("git@github.com:org/repo.git"));
/// assert!(is_scp_like("deploy@build-host:repos/app.git"));
/// assert!(!is_scp_like("ssh://git@github.com/org/repo.git"));
/// assert!(!is_scp_like("localhost:8080/repo"));
/// ```
pub fn is_scp_like(s: &str) -> bool {
    if s.starts_with("git@") {
        return true;
    }
    if s.contains("://") {
        return false;
    }
    let Some((head, _path)) = s.split_once(':') else {
        return false;
    };
    match head.split_once('@') {
        Some((user, host)) => !user.is_empty() && !host.is_empty() && !head.contains('/'),
        None => false,
    }
}

/// Whether `s` is already a transport-qualified git address.
pub fn is_git_transport(s: &str) -> bool {
    has_known_scheme(s) || is_scp_like(s)
}

//! core::types
//!
//! Strong types for values that end up on a git command line.
//!
//! # Types
//!
//! - [`BranchName`] - Validated branch name (used for the configurable default ref)
//! - [`RemoteName`] - Validated symbolic remote name (e.g. `origin`)
//! - [`Oid`] - Git object identifier (SHA)
//!
//! # Validation
//!
//! These types enforce validity at construction time. A value that reaches
//! a git argument vector through one of these types cannot start with `-`
//! and therefore cannot be mistaken for an option.
//!
//! Refs parsed out of a locator fragment are deliberately *not* wrapped:
//! they may name tags, commits or anything else git accepts, and their
//! plausibility is left to git itself.
//!
//! # Examples
//!
//! ```
//! use gitctx::core::types::{BranchName, Oid, RemoteName};
//!
//! let branch = BranchName::new("main").unwrap();
//! let remote = RemoteName::new("origin").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//!
//! assert!(BranchName::new("invalid..name").is_err());
//! assert!(RemoteName::new("--upload-pack=evil").is_err());
//! assert!(Oid::new("not-a-sha").is_err());
//! # let _ = (branch, remote, oid);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid remote name: {0}")]
    InvalidRemoteName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// Branch used when a locator names no ref and none is configured.
pub const DEFAULT_PRIMARY_BRANCH: &str = "master";

/// Characters git never allows in a ref name.
const FORBIDDEN_REF_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

/// Check `name` against git's refname rules (see `git check-ref-format`).
///
/// Returns a description of the first violated rule.
fn refname_violation(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("cannot be empty".into());
    }
    if name == "@" {
        return Some("cannot be '@' (reserved)".into());
    }
    if name.starts_with('-') {
        return Some("cannot start with '-'".into());
    }
    if name.ends_with('/') || name.ends_with('.') {
        return Some("cannot end with '/' or '.'".into());
    }
    for sequence in ["..", "@{", "//"] {
        if name.contains(sequence) {
            return Some(format!("cannot contain '{sequence}'"));
        }
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_REF_CHARS.contains(c)) {
        return Some(format!("cannot contain '{c}'"));
    }
    if name.chars().any(|c| c.is_ascii_control()) {
        return Some("cannot contain control characters".into());
    }
    name.split('/')
        .filter(|component| !component.is_empty())
        .find_map(|component| {
            if component.starts_with('.') {
                Some("path component cannot start with '.'".to_string())
            } else if component.ends_with(".lock") {
                Some("path component cannot end with '.lock'".to_string())
            } else {
                None
            }
        })
}

/// A validated Git branch name.
///
/// # Example
///
/// ```
/// use gitctx::core::types::BranchName;
///
/// let name = BranchName::new("release/2.x").unwrap();
/// assert_eq!(name.as_str(), "release/2.x");
///
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("-rf").is_err());
/// assert!(BranchName::new("branch.lock").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        match refname_violation(&name) {
            Some(reason) => Err(TypeError::InvalidBranchName(format!("'{name}' {reason}"))),
            None => Ok(Self(name)),
        }
    }

    /// The conventional primary branch, [`DEFAULT_PRIMARY_BRANCH`].
    pub fn default_primary() -> Self {
        Self(DEFAULT_PRIMARY_BRANCH.to_string())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated remote name.
///
/// Remote names share the refname rules (git stores them under
/// `refs/remotes/<name>/`) and additionally may not contain `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteName(String);

impl RemoteName {
    /// Create a new validated remote name.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.contains('/') {
            return Err(TypeError::InvalidRemoteName(format!(
                "'{name}' cannot contain '/'"
            )));
        }
        match refname_violation(&name) {
            Some(reason) => Err(TypeError::InvalidRemoteName(format!("'{name}' {reason}"))),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RemoteName {
    fn default() -> Self {
        Self("origin".to_string())
    }
}

/// A Git object identifier (SHA-1 or SHA-256).
///
/// OIDs are normalized to lowercase.
///
/// ```
/// use gitctx::core::types::Oid;
///
/// let oid = Oid::new("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.as_str(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short(7), "abc123d");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string is not 40 or 64 hex characters.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Get an abbreviated form of the OID.
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_newtype_impls {
    ($($ty:ident),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = TypeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $ty {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    )*};
}

string_newtype_impls!(BranchName, RemoteName, Oid);

//! core
//!
//! Domain types, locator parsing, configuration and path confinement.
//!
//! # Modules
//!
//! - [`locator`] - Git locator parsing into a [`locator::RepoDescriptor`]
//! - [`types`] - Strong types: BranchName, RemoteName, Oid
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Working tree layout and subdirectory confinement
//!
//! # Design Principles
//!
//! - Nothing in `core` performs network or process I/O
//! - Strong typing keeps option-like strings off git command lines

pub mod config;
pub mod locator;
pub mod paths;
pub mod types;

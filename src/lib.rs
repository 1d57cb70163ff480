//! gitctx - Resolve git locators into checked-out build contexts
//!
//! A git locator is a remote address optionally carrying a ref and a
//! subdirectory in its fragment, e.g. `https://host/org/repo.git#v1.0:docs`.
//! gitctx fetches the smallest history it can, checks the ref out into a
//! fresh working tree and returns the directory a build should treat as its
//! root.
//!
//! # Architecture
//!
//! The codebase is layered top-down:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Orchestrates Parse → Classify → Fetch → Checkout
//! - [`core`] - Locator parsing, strong types, configuration, path confinement
//! - [`transport`] - Transport classification and smart-HTTP probing
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. A resolved context directory never lies outside its working tree
//! 2. Shallow fetches are only requested when the transport supports them
//! 3. Working trees are never deleted by gitctx, even on failure
//! 4. Tool output is carried verbatim in every fetch and checkout error

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod transport;
pub mod ui;

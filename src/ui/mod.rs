//! ui
//!
//! User-facing output.
//!
//! Diagnostics go through `tracing`; everything a user is meant to read
//! (results, warnings, errors) goes through [`output`] so the quiet flag and
//! the JSON mode are honored in one place.

pub mod output;

//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Results go to stdout, everything else to stderr. Quiet mode suppresses
//! all but results and errors. With `--json`, results are printed as one
//! pretty JSON document.

use std::fmt::Display;

use serde::Serialize;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - results and errors only
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags. `quiet` wins over `debug`.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default `tracing` filter directive for this level.
    pub fn log_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "off",
            Verbosity::Normal => "gitctx=warn",
            Verbosity::Debug => "gitctx=debug",
        }
    }
}

/// Print a result line. Always shown; results are what `--quiet` keeps.
pub fn result(message: impl Display) {
    println!("{}", message);
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Print a value as pretty JSON on stdout.
pub fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

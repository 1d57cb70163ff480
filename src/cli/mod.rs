//! cli
//!
//! Command-line interface layer for gitctx.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, merges flags over
//! the loaded configuration and hands off to [`crate::engine`]. It never
//! runs git or makes HTTP requests itself.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::ui::output::Verbosity;

/// Flags shared by every command.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub verbosity: Verbosity,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let ctx = Context {
        verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
    };
    init_tracing(ctx.verbosity);

    commands::dispatch(cli.command, &ctx)
}

/// Log to stderr. `RUST_LOG` overrides the flag-derived level.
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.log_directive()));

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

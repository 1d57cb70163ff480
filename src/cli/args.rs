//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Results and errors only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gitctx - Resolve git locators into checked-out build contexts
#[derive(Parser, Debug)]
#[command(name = "gitctx")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Results and errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and check out a locator, printing the build context path
    #[command(
        long_about = "Fetch and check out a git locator, printing the build context path.\n\n\
            A locator is a remote address with an optional #ref[:subdir] fragment. \
            The ref defaults to the configured default branch. When a subdirectory \
            is given, the printed path is that directory, which must stay inside \
            the checkout.\n\n\
            The working tree is left on disk, also when resolution fails; \
            removing it is up to the caller.",
        after_help = "\
EXAMPLES:
    # Default branch of a GitHub repository
    gitctx resolve github.com/org/repo

    # A tag, narrowed to a subdirectory
    gitctx resolve https://github.com/org/repo.git#v1.0:tools/build

    # scp-style address, into a chosen directory
    gitctx resolve git@github.com:org/repo.git#main --dest ./ctx"
    )]
    Resolve {
        /// Git locator: <remote>[#<ref>[:<subdir>]]
        locator: String,

        /// Check out into this empty (or missing) directory instead of a temporary one
        #[arg(long, value_name = "DIR")]
        dest: Option<PathBuf>,

        /// Ref to use when the locator names none
        #[arg(long, value_name = "REF")]
        default_ref: Option<String>,

        /// Name to register the remote under
        #[arg(long, value_name = "NAME")]
        remote_name: Option<String>,

        /// Always fetch full history
        #[arg(long)]
        no_shallow: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how a locator is parsed, without touching the network
    Parse {
        /// Git locator: <remote>[#<ref>[:<subdir>]]
        locator: String,

        /// Ref to use when the locator names none
        #[arg(long, value_name = "REF")]
        default_ref: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report whether a remote supports shallow fetches
    Probe {
        /// Remote address (no fragment)
        remote: String,
    },

    /// Get, set, or list configuration values
    #[command(after_help = "\
EXAMPLES:
    gitctx config list
    gitctx config get default_ref
    gitctx config set fetch.shallow never")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
        }
    }
}

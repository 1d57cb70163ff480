//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Loads configuration and applies command-line overrides
//! 2. Calls into the engine or transport layer
//! 3. Formats and displays output
//!
//! Handlers return `anyhow::Result`; library errors are wrapped with
//! context describing what the user asked for.

mod completion;
mod config_cmd;
mod parse;
mod probe;
mod resolve;

pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, set as config_set};
pub use parse::parse;
pub use probe::probe;
pub use resolve::resolve;

use anyhow::{Context as _, Result};

use super::args::{Command, ConfigAction};
use super::Context;
use crate::core::config::Config;
use crate::core::types::BranchName;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Resolve {
            locator,
            dest,
            default_ref,
            remote_name,
            no_shallow,
            json,
        } => resolve::resolve(
            ctx,
            &locator,
            resolve::Overrides {
                dest,
                default_ref,
                remote_name,
                no_shallow,
            },
            json,
        ),
        Command::Parse {
            locator,
            default_ref,
            json,
        } => parse::parse(ctx, &locator, default_ref.as_deref(), json),
        Command::Probe { remote } => probe::probe(ctx, &remote),
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Load configuration from the default locations.
fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// The default ref: `--default-ref` if given, else the configured one.
fn default_ref(config: &Config, flag: Option<&str>) -> Result<BranchName> {
    match flag {
        Some(name) => BranchName::new(name).context("Invalid --default-ref"),
        None => Ok(config.default_ref()),
    }
}

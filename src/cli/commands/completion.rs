//! completion command - Generate shell completion scripts

use std::io;

use anyhow::Result;
use clap::CommandFactory;
use clap_complete::generate;

use crate::cli::args::{Cli, Shell};

/// Write the completion script for `shell` to stdout.
pub fn completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(clap_complete::Shell::from(shell), &mut cmd, bin, &mut io::stdout());
    Ok(())
}

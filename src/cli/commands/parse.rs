//! parse command - Show how a locator is decomposed

use anyhow::{Context as _, Result};

use super::{default_ref, load_config};
use crate::cli::Context;
use crate::core::locator;
use crate::ui::output;

/// Print the remote, ref and subdirectory a locator resolves to.
pub fn parse(
    _ctx: &Context,
    locator: &str,
    default_ref_flag: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load_config()?;
    let default_ref = default_ref(&config, default_ref_flag)?;

    let repo = locator::parse_with_default(locator, &default_ref)
        .with_context(|| format!("Failed to parse '{}'", locator))?;

    if json {
        output::json(&repo)?;
    } else {
        output::result(format!("remote: {}", repo.remote()));
        output::result(format!("ref:    {}", repo.git_ref()));
        output::result(format!("subdir: {}", repo.subdir()));
    }
    Ok(())
}

//! resolve command - Fetch and check out a locator

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{default_ref, load_config};
use crate::cli::Context;
use crate::core::config::ShallowPolicy;
use crate::core::types::RemoteName;
use crate::engine::Resolver;
use crate::ui::output;

/// Command-line settings that win over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub dest: Option<PathBuf>,
    pub default_ref: Option<String>,
    pub remote_name: Option<String>,
    pub no_shallow: bool,
}

/// Resolve `locator` and print the context directory.
pub fn resolve(ctx: &Context, locator: &str, overrides: Overrides, json: bool) -> Result<()> {
    let config = load_config()?;
    let mut resolver = Resolver::from_config(&config).context("Failed to set up HTTP client")?;

    let options = resolver.options_mut();
    options.default_ref = default_ref(&config, overrides.default_ref.as_deref())?;
    if let Some(name) = overrides.remote_name {
        options.remote_name = RemoteName::new(name).context("Invalid --remote-name")?;
    }
    if overrides.no_shallow {
        options.shallow = ShallowPolicy::Never;
    }
    options.destination = overrides.dest;

    let resolved = match resolver.resolve(locator) {
        Ok(resolved) => resolved,
        Err(err) => {
            if let Some(tree) = err.work_tree() {
                output::warn(
                    format!("working tree left at {}", tree.display()),
                    ctx.verbosity,
                );
            }
            return Err(err).with_context(|| format!("Failed to resolve '{}'", locator));
        }
    };

    if json {
        output::json(&resolved)?;
        return Ok(());
    }

    if let Some(head) = &resolved.head {
        let at = head.branch.as_deref().unwrap_or("detached");
        output::print(
            format!("Checked out {} ({})", head.oid.short(12), at),
            ctx.verbosity,
        );
    }
    output::result(resolved.context_dir.display());
    Ok(())
}

//! config command - Get, set, or list configuration values

use anyhow::{Context as _, Result};

use super::load_config;
use crate::cli::Context;
use crate::core::config::{Config, KEYS};
use crate::ui::output;

/// Print the effective value of `key`.
///
/// Unset optional keys print nothing.
pub fn get(_ctx: &Context, key: &str) -> Result<()> {
    let config = load_config()?;
    let value = config.get(key)?;
    if !value.is_empty() {
        output::result(value);
    }
    Ok(())
}

/// Set `key` to `value` and write the file back.
///
/// Writes to the file the configuration was loaded from, or to the
/// canonical location when none exists yet.
pub fn set(ctx: &Context, key: &str, value: &str) -> Result<()> {
    let mut config = load_config()?;
    config
        .set(key, value)
        .with_context(|| format!("Cannot set {}", key))?;

    let path = match config.loaded_from() {
        Some(path) => path.to_path_buf(),
        None => Config::canonical_path()?,
    };
    Config::write(&path, &config.global).context("Failed to write config")?;

    output::print(
        format!("Set {} = {} in {}", key, value, path.display()),
        ctx.verbosity,
    );
    Ok(())
}

/// Print every key with its effective value.
pub fn list(ctx: &Context) -> Result<()> {
    let config = load_config()?;

    let source = config
        .loaded_from()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    output::print(format!("# Configuration ({})", source), ctx.verbosity);

    for key in KEYS {
        let value = config.get(key)?;
        if value.is_empty() {
            output::result(format!("{} = (not set)", key));
        } else {
            output::result(format!("{} = {}", key, value));
        }
    }
    Ok(())
}

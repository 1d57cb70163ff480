//! probe command - Report whether a remote supports shallow fetches

use anyhow::{Context as _, Result};
use tracing::debug;

use super::load_config;
use crate::cli::Context;
use crate::transport::{self, ReqwestProbe};
use crate::ui::output;

/// Print `shallow` or `full` for `remote`.
pub fn probe(ctx: &Context, remote: &str) -> Result<()> {
    let config = load_config()?;
    let probe = ReqwestProbe::with_options(config.probe_timeout(), config.probe_user_agent())
        .context("Failed to set up HTTP client")?;

    if remote.contains('#') {
        output::warn(
            "remote contains a fragment; probe the remote without #ref",
            ctx.verbosity,
        );
    }

    let shallow = transport::supports_shallow(remote, &probe);
    debug!(remote, shallow, "probe finished");
    output::result(if shallow { "shallow" } else { "full" });
    Ok(())
}

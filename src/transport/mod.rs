//! transport
//!
//! Decides whether a remote can serve a shallow fetch.
//!
//! Only smart-HTTP servers understand `--depth`; a dumb HTTP server serves
//! static files and cannot negotiate a truncated history. Other transports
//! (ssh, git, file, scp-style) always speak the smart protocol.
//!
//! This is the only module that links `reqwest`; everything else talks to
//! the [`HttpProbe`] seam.

pub mod probe;

pub use probe::{
    probe_with_fallback, HttpProbe, ProbeError, ProbeMethod, ProbeResponse, ReqwestProbe,
    DEFAULT_USER_AGENT,
};

use tracing::debug;

use crate::core::locator::is_url;

/// Service name advertised by smart-HTTP servers.
pub const UPLOAD_PACK_SERVICE: &str = "git-upload-pack";

/// Content type of a smart-HTTP ref advertisement.
pub const SMART_CONTENT_TYPE: &str = "application/x-git-upload-pack-advertisement";

/// The ref-advertisement URL probed for `remote`.
pub fn service_url(remote: &str) -> String {
    format!(
        "{}/info/refs?service={}",
        remote.trim_end_matches('/'),
        UPLOAD_PACK_SERVICE
    )
}

/// Whether a shallow (`--depth 1`) fetch from `remote` is safe.
///
/// Non-HTTP(S) remotes are always shallow-capable. HTTP(S) remotes are
/// probed with HEAD, then GET, and qualify only when the accepted response
/// carries exactly [`SMART_CONTENT_TYPE`].
pub fn supports_shallow<P: HttpProbe + ?Sized>(remote: &str, probe: &P) -> bool {
    if !is_url(remote) {
        return true;
    }

    let url = service_url(remote);
    let verdict = probe_with_fallback(
        probe,
        &url,
        &[ProbeMethod::Head, ProbeMethod::Get],
        ProbeResponse::is_success,
    )
    .map(|response| response.content_type.as_deref() == Some(SMART_CONTENT_TYPE))
    .unwrap_or(false);

    debug!(url = %url, shallow = verdict, "classified remote");
    verdict
}

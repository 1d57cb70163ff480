//! transport::probe
//!
//! HTTP probing behind the [`HttpProbe`] seam.
//!
//! The probe only needs a status code and a `Content-Type` header, so the
//! seam exposes exactly that. [`ReqwestProbe`] implements it with
//! `reqwest`'s blocking client; the body of a GET is never read.
//!
//! [`probe_with_fallback`] is a small retry policy: try each method in
//! order and stop at the first response the caller accepts.

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tracing::debug;

/// Default User-Agent for probe requests.
pub const DEFAULT_USER_AGENT: &str = concat!("gitctx/", env!("CARGO_PKG_VERSION"));

/// HTTP methods used for probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

impl fmt::Display for ProbeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeMethod::Head => f.write_str("HEAD"),
            ProbeMethod::Get => f.write_str("GET"),
        }
    }
}

/// The parts of an HTTP response a probe looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// HTTP status code
    pub status: u16,
    /// Value of the `Content-Type` header, if present and valid UTF-8
    pub content_type: Option<String>,
}

impl ProbeResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors from probe requests.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request could not be completed (DNS, connect, TLS, timeout).
    #[error("{method} {url} failed: {message}")]
    Network {
        method: ProbeMethod,
        url: String,
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Issues a single HTTP request and reports status and content type.
pub trait HttpProbe {
    fn request(&self, method: ProbeMethod, url: &str) -> Result<ProbeResponse, ProbeError>;
}

impl<T: HttpProbe + ?Sized> HttpProbe for &T {
    fn request(&self, method: ProbeMethod, url: &str) -> Result<ProbeResponse, ProbeError> {
        (**self).request(method, url)
    }
}

/// Try `methods` in order against `url`, returning the first response
/// `accept` approves.
///
/// Network errors and rejected responses both move on to the next method.
/// Returns `None` when every attempt failed or was rejected.
pub fn probe_with_fallback<P, F>(
    probe: &P,
    url: &str,
    methods: &[ProbeMethod],
    accept: F,
) -> Option<ProbeResponse>
where
    P: HttpProbe + ?Sized,
    F: Fn(&ProbeResponse) -> bool,
{
    for &method in methods {
        match probe.request(method, url) {
            Ok(response) if accept(&response) => return Some(response),
            Ok(response) => {
                debug!(%method, url, status = response.status, "probe response rejected")
            }
            Err(err) => debug!(%method, url, error = %err, "probe request failed"),
        }
    }
    None
}

/// [`HttpProbe`] backed by `reqwest::blocking`.
///
/// Must not be called from inside an async runtime worker; wrap calls in
/// `spawn_blocking` there.
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: reqwest::blocking::Client,
}

impl ReqwestProbe {
    /// Build a probe with the client's default timeout.
    pub fn new() -> Result<Self, ProbeError> {
        Self::with_options(None, None)
    }

    /// Build a probe with an explicit timeout and User-Agent.
    pub fn with_options(
        timeout: Option<Duration>,
        user_agent: Option<&str>,
    ) -> Result<Self, ProbeError> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpProbe for ReqwestProbe {
    fn request(&self, method: ProbeMethod, url: &str) -> Result<ProbeResponse, ProbeError> {
        let request = match method {
            ProbeMethod::Head => self.client.head(url),
            ProbeMethod::Get => self.client.get(url),
        };

        let response = request.send().map_err(|e| ProbeError::Network {
            method,
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(ProbeResponse {
            status: response.status().as_u16(),
            content_type,
        })
    }
}

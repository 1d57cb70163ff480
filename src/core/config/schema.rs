//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad value fails at
//! load time rather than halfway through a resolution (e.g. `default_ref`
//! must be a valid branch name, `fetch.remote_name` a valid remote name).

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{BranchName, RemoteName};

/// User configuration.
///
/// # Example
///
/// ```toml
/// default_ref = "main"
/// git_program = "/usr/bin/git"
/// temp_prefix = "build-ctx-"
///
/// [fetch]
/// remote_name = "origin"
/// shallow = "auto"
///
/// [probe]
/// timeout_secs = 10
/// user_agent = "git/2.43.0"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Ref used when a locator fragment names none
    pub default_ref: Option<String>,

    /// Program invoked for git operations
    pub git_program: Option<String>,

    /// Prefix for allocated working tree directories
    pub temp_prefix: Option<String>,

    /// Fetch settings
    pub fetch: Option<FetchConfig>,

    /// Smart-HTTP probe settings
    pub probe: Option<ProbeConfig>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(default_ref) = &self.default_ref {
            BranchName::new(default_ref.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid default_ref: {}", e))
            })?;
        }

        if let Some(program) = &self.git_program {
            if program.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "git_program cannot be empty".to_string(),
                ));
            }
        }

        if let Some(prefix) = &self.temp_prefix {
            if prefix.contains(std::path::is_separator) {
                return Err(ConfigError::InvalidValue(format!(
                    "temp_prefix '{}' cannot contain a path separator",
                    prefix
                )));
            }
        }

        if let Some(fetch) = &self.fetch {
            fetch.validate()?;
        }

        if let Some(probe) = &self.probe {
            probe.validate()?;
        }

        Ok(())
    }
}

/// Whether shallow fetches may be attempted.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ShallowPolicy {
    /// Shallow when the transport supports it (probing HTTP servers)
    #[default]
    Auto,
    /// Always fetch full history
    Never,
}

impl ShallowPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShallowPolicy::Auto => "auto",
            ShallowPolicy::Never => "never",
        }
    }
}

impl std::str::FromStr for ShallowPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ShallowPolicy::Auto),
            "never" => Ok(ShallowPolicy::Never),
            other => Err(ConfigError::InvalidValue(format!(
                "invalid shallow policy '{}', must be one of: auto, never",
                other
            ))),
        }
    }
}

/// Fetch settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Name the remote is registered under (default: "origin")
    pub remote_name: Option<String>,

    /// Shallow fetch policy
    pub shallow: Option<ShallowPolicy>,
}

impl FetchConfig {
    /// Validate the fetch configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(remote) = &self.remote_name {
            RemoteName::new(remote.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid fetch.remote_name: {}", e))
            })?;
        }
        Ok(())
    }
}

/// Smart-HTTP probe settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Request timeout in seconds (HTTP client default when unset)
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with probe requests
    pub user_agent: Option<String>,
}

impl ProbeConfig {
    /// Validate the probe configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "probe.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

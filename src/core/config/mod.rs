//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first hit wins:
//! 1. `$GITCTX_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/gitctx/config.toml`
//! 3. `~/.gitctx/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use gitctx::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Default ref: {}", config.default_ref());
//! println!("Remote: {}", config.remote_name());
//! ```

pub mod schema;

pub use schema::{FetchConfig, GlobalConfig, ProbeConfig, ShallowPolicy};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::types::{BranchName, RemoteName};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "GITCTX_CONFIG";

/// Default prefix for allocated working trees.
pub const DEFAULT_TEMP_PREFIX: &str = "gitctx-";

/// Keys understood by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "default_ref",
    "git_program",
    "temp_prefix",
    "fetch.remote_name",
    "fetch.shallow",
    "probe.timeout_secs",
    "probe.user_agent",
];

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration.
///
/// Accessor methods apply defaults, so callers never see an unset value.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// The parsed file contents
    pub global: GlobalConfig,
    /// Path the configuration was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation. A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        Ok(Self {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("gitctx/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".gitctx/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `$GITCTX_CONFIG` when set, otherwise `~/.gitctx/config.toml`.
    pub fn canonical_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".gitctx/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed, writes to a sibling temp file
    /// and renames it into place.
    pub fn write(path: &Path, config: &GlobalConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Ref used when a locator names none.
    ///
    /// Defaults to [`BranchName::default_primary`].
    pub fn default_ref(&self) -> BranchName {
        self.global
            .default_ref
            .as_deref()
            .and_then(|name| BranchName::new(name).ok())
            .unwrap_or_else(BranchName::default_primary)
    }

    /// Program invoked for git operations. Defaults to `git`.
    pub fn git_program(&self) -> &str {
        self.global.git_program.as_deref().unwrap_or("git")
    }

    /// Prefix for allocated working trees. Defaults to [`DEFAULT_TEMP_PREFIX`].
    pub fn temp_prefix(&self) -> &str {
        self.global
            .temp_prefix
            .as_deref()
            .unwrap_or(DEFAULT_TEMP_PREFIX)
    }

    /// Name the remote is registered under. Defaults to `origin`.
    pub fn remote_name(&self) -> RemoteName {
        self.global
            .fetch
            .as_ref()
            .and_then(|f| f.remote_name.as_deref())
            .and_then(|name| RemoteName::new(name).ok())
            .unwrap_or_default()
    }

    /// Shallow fetch policy. Defaults to [`ShallowPolicy::Auto`].
    pub fn shallow_policy(&self) -> ShallowPolicy {
        self.global
            .fetch
            .as_ref()
            .and_then(|f| f.shallow)
            .unwrap_or_default()
    }

    /// Probe request timeout, if configured.
    pub fn probe_timeout(&self) -> Option<Duration> {
        self.global
            .probe
            .as_ref()
            .and_then(|p| p.timeout_secs)
            .map(Duration::from_secs)
    }

    /// Probe User-Agent, if configured.
    pub fn probe_user_agent(&self) -> Option<&str> {
        self.global
            .probe
            .as_ref()
            .and_then(|p| p.user_agent.as_deref())
    }

    /// Get the path the configuration was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Key-based access (config command)
    // =========================================================================

    /// Get the effective value of `key` as a string.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "default_ref" => self.default_ref().to_string(),
            "git_program" => self.git_program().to_string(),
            "temp_prefix" => self.temp_prefix().to_string(),
            "fetch.remote_name" => self.remote_name().to_string(),
            "fetch.shallow" => self.shallow_policy().as_str().to_string(),
            "probe.timeout_secs" => self
                .probe_timeout()
                .map(|t| t.as_secs().to_string())
                .unwrap_or_default(),
            "probe.user_agent" => self.probe_user_agent().unwrap_or_default().to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Set `key` to `value` in the file-level configuration.
    ///
    /// The value is validated before it is stored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut updated = self.global.clone();
        match key {
            "default_ref" => updated.default_ref = Some(value.to_string()),
            "git_program" => updated.git_program = Some(value.to_string()),
            "temp_prefix" => updated.temp_prefix = Some(value.to_string()),
            "fetch.remote_name" => {
                updated.fetch.get_or_insert_with(Default::default).remote_name =
                    Some(value.to_string())
            }
            "fetch.shallow" => {
                updated.fetch.get_or_insert_with(Default::default).shallow = Some(value.parse()?)
            }
            "probe.timeout_secs" => {
                let secs = value.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(format!(
                        "probe.timeout_secs must be a number of seconds, got '{}'",
                        value
                    ))
                })?;
                updated.probe.get_or_insert_with(Default::default).timeout_secs = Some(secs)
            }
            "probe.user_agent" => {
                updated.probe.get_or_insert_with(Default::default).user_agent =
                    Some(value.to_string())
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        updated.validate()?;
        self.global = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_file() {
        let config = Config::default();

        assert_eq!(config.default_ref().as_str(), "master");
        assert_eq!(config.git_program(), "git");
        assert_eq!(config.temp_prefix(), DEFAULT_TEMP_PREFIX);
        assert_eq!(config.remote_name().as_str(), "origin");
        assert_eq!(config.shallow_policy(), ShallowPolicy::Auto);
        assert!(config.probe_timeout().is_none());
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            default_ref = "main"

            [fetch]
            shallow = "never"

            [probe]
            timeout_secs = 5
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_ref().as_str(), "main");
        assert_eq!(config.shallow_policy(), ShallowPolicy::Never);
        assert_eq!(config.probe_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "default_ref = \"main\"\nunknown_field = true\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_values_rejected_at_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "default_ref = \"-main\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let err = Config::load_from(&temp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn write_then_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");

        let mut config = Config::default();
        config.set("default_ref", "trunk").unwrap();
        config.set("fetch.remote_name", "upstream").unwrap();
        config.set("probe.timeout_secs", "30").unwrap();
        Config::write(&path, &config.global).unwrap();

        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.get("default_ref").unwrap(), "trunk");
        assert_eq!(loaded.get("fetch.remote_name").unwrap(), "upstream");
        assert_eq!(loaded.get("probe.timeout_secs").unwrap(), "30");
    }

    #[test]
    fn set_rejects_invalid_without_mutating() {
        let mut config = Config::default();
        assert!(config.set("default_ref", "a..b").is_err());
        assert!(config.set("probe.timeout_secs", "soon").is_err());
        assert!(config.set("fetch.shallow", "sometimes").is_err());
        assert_eq!(config.global, GlobalConfig::default());
    }

    #[test]
    fn unknown_keys_rejected() {
        let mut config = Config::default();
        assert!(matches!(
            config.get("nope"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.set("nope", "x"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn every_key_is_readable() {
        let config = Config::default();
        for key in KEYS {
            assert!(config.get(key).is_ok(), "key {} should be readable", key);
        }
    }
}

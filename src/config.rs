//! Launcher configuration.
//!
//! Supports TOML files and environment variables with per-field defaults.
//! The defaults reproduce the launcher's fixed constants, so a plugin
//! built with `LauncherConfig::default()` behaves identically to one with
//! no configuration at all.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default values for configuration
mod defaults {
    pub fn frontend() -> String {
        "gui".to_string()
    }

    pub fn launch_wait_timeout_secs() -> u64 {
        crate::launch::LAUNCH_WAIT_TIMEOUT.as_secs()
    }

    pub fn icon_path() -> String {
        "icon.png".to_string()
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable or file field holds an unusable value.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Plugin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Process type passed to the hypervisor's launch call.
    #[serde(default = "defaults::frontend")]
    pub frontend: String,

    /// Bound on the background startup wait, in seconds.
    #[serde(default = "defaults::launch_wait_timeout_secs")]
    pub launch_wait_timeout_secs: u64,

    /// Static icon reference attached to every search result.
    #[serde(default = "defaults::icon_path")]
    pub icon_path: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            frontend: defaults::frontend(),
            launch_wait_timeout_secs: defaults::launch_wait_timeout_secs(),
            icon_path: defaults::icon_path(),
        }
    }
}

impl LauncherConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn load() -> Result<Self, ConfigError> {
        let launch_wait_timeout_secs = match std::env::var("QUICKVM_LAUNCH_WAIT_TIMEOUT") {
            Ok(value) => value.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: "QUICKVM_LAUNCH_WAIT_TIMEOUT".to_string(),
                value: value.clone(),
                reason: format!("must be a whole number of seconds: {}", e),
            })?,
            Err(_) => defaults::launch_wait_timeout_secs(),
        };

        Ok(Self {
            frontend: std::env::var("QUICKVM_FRONTEND").unwrap_or_else(|_| defaults::frontend()),
            launch_wait_timeout_secs,
            icon_path: std::env::var("QUICKVM_ICON_PATH")
                .unwrap_or_else(|_| defaults::icon_path()),
        })
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Startup wait bound as a [`Duration`].
    pub fn launch_wait_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_wait_timeout_secs)
    }
}

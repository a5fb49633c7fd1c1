//! Client configuration file loading.
//!
//! The file holds the RCon password and, optionally, the receive timeout.
//! Two formats are accepted:
//!
//! ```toml
//! password = "hunter2"
//! timeout_ms = 1000
//! ```
//!
//! or the legacy plain-text form, where the first whitespace-separated token
//! of the file is the password and nothing else is read:
//!
//! ```text
//! hunter2
//! ```
//!
//! A file that parses as a TOML table with a `password` key is read as TOML.
//! Anything else falls back to the legacy form, so legacy secrets such as
//! `[admin]` or `a=1` that happen to be valid TOML still work.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// File name looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rcon.cfg";

/// Receive timeout used when the file does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is TOML with a `password` key but does not match the schema.
    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file contains no password.
    #[error("no RCon password found in {path}")]
    MissingPassword { path: PathBuf },
}

/// Settings read from the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Shared RCon secret sent in the login packet.
    pub password: String,
    /// Per-datagram receive timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl ClientConfig {
    /// Reads and parses the config file at `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`ClientConfig::parse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents, path)
    }

    /// Parses config text; `path` is only used in error messages.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for a TOML table with a `password` key that does
    /// not fit the schema,
    /// [`ConfigError::MissingPassword`] if no password is present.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config = match contents.parse::<toml::Table>() {
            Ok(table) if table.contains_key("password") => {
                debug!(path = %path.display(), "reading TOML config");
                toml::Value::Table(table)
                    .try_into::<ClientConfig>()
                    .map_err(|source| ConfigError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?
            }
            _ => {
                debug!(path = %path.display(), "reading legacy plain-text config");
                let password = contents.split_whitespace().next().unwrap_or_default();
                ClientConfig {
                    password: password.to_string(),
                    timeout_ms: DEFAULT_TIMEOUT_MS,
                }
            }
        };

        if config.password.is_empty() {
            return Err(ConfigError::MissingPassword {
                path: path.to_path_buf(),
            });
        }
        Ok(config)
    }

    /// The receive timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

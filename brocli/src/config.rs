//! File-based driver configuration.
//!
//! ```toml
//! host = "10.24.84.10"
//! username = "admin"
//! password = "password"
//! platform = "brocade_nos"
//! timeout_secs = 60
//!
//! [relay]
//! host = "10.24.84.5"
//! username = "ops"
//! password = "ops-password"
//! export_dir = "/srv/export"
//! remote_dir = "tmp"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

use crate::error::{ConfigError, Result};
use crate::platform::Platform;
use crate::transport::HostKeyVerification;

/// Connection settings for one switch.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub username: String,

    #[serde(default, deserialize_with = "secret_opt")]
    pub password: Option<SecretString>,

    /// Private key used instead of the password.
    #[serde(default)]
    pub private_key: Option<PathBuf>,

    #[serde(default)]
    pub platform: Platform,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub host_key_verification: HostKeyVerification,

    #[serde(default)]
    pub known_hosts_path: Option<PathBuf>,

    #[serde(default)]
    pub relay: Option<RelayConfig>,
}

/// Relay host used to hand candidate files to the device.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    pub host: String,

    pub username: String,

    #[serde(deserialize_with = "secret")]
    pub password: SecretString,

    /// Local path of the directory the relay host exports.
    pub export_dir: PathBuf,

    /// The same directory as seen on the relay host.
    #[serde(default = "default_remote_dir")]
    pub remote_dir: String,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("export_dir", &self.export_dir)
            .field("remote_dir", &self.remote_dir)
            .finish()
    }
}

fn default_port() -> u16 {
    22
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_remote_dir() -> String {
    "tmp".to_string()
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn secret_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl DriverConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: DriverConfig = toml::from_str(text).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(invalid("host", "must not be empty"));
        }
        if self.username.trim().is_empty() {
            return Err(invalid("username", "must not be empty"));
        }
        if self.port == 0 {
            return Err(invalid("port", "must not be 0"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be at least 1"));
        }
        if self.password.is_some() && self.private_key.is_some() {
            return Err(invalid("password", "set either password or private_key, not both"));
        }
        if let Some(relay) = &self.relay {
            if relay.host.trim().is_empty() {
                return Err(invalid("relay.host", "must not be empty"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::Validation {
        field,
        reason: reason.to_string(),
    }
    .into()
}

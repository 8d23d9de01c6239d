//! Builder for creating switch drivers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::Driver;
use super::relay::LocalExportRelay;
use super::session::Session;
use crate::channel::{RemoteChannel, SshChannel};
use crate::config::{DriverConfig, RelayConfig};
use crate::error::{Error, Result};
use crate::platform::Platform;
use crate::transport::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for constructing drivers.
///
/// # Example
///
/// ```rust,no_run
/// use brocli::{DriverBuilder, Platform};
///
/// # async fn example() -> Result<(), brocli::Error> {
/// let mut driver = DriverBuilder::new("10.24.84.10")
///     .username("admin")
///     .password("password")
///     .platform(Platform::BrocadeNos)
///     .build()?;
///
/// driver.open().await?;
/// let facts = driver.get_facts().await?;
/// println!("{:?}", facts.os_version);
/// driver.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    platform: Platform,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    relay: Option<RelayConfig>,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            platform: Platform::default(),
            timeout: Duration::from_secs(60),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            relay: None,
        }
    }

    /// Start from a loaded configuration file.
    pub fn from_config(config: DriverConfig) -> Self {
        let timeout = config.timeout();
        let mut builder = Self::new(config.host)
            .port(config.port)
            .username(config.username)
            .platform(config.platform)
            .timeout(timeout)
            .host_key_verification(config.host_key_verification);

        builder.known_hosts_path = config.known_hosts_path;
        builder.relay = config.relay;
        if let Some(password) = config.password {
            builder.auth = AuthMethod::Password(password);
        }
        if let Some(path) = config.private_key {
            builder = builder.private_key(path);
        }
        builder
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase.
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the switch dialect (default: [`Platform::BrocadeNos`]).
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the connect and per-command timeout (default: 60s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a known_hosts file other than the user's.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Set the relay host used by `load_candidate`.
    pub fn relay(mut self, relay: RelayConfig) -> Self {
        self.relay = Some(relay);
        self
    }

    /// Build an SSH driver.
    ///
    /// This creates the driver but does not connect. Call `open()` on the
    /// returned driver to establish the connection.
    pub fn build(mut self) -> Result<Driver<SshChannel>> {
        let username = self.username.take().ok_or_else(|| Error::InvalidArgument {
            message: "username is required".to_string(),
        })?;
        let definition = self.platform.definition();

        let ssh_config = SshConfig {
            host: self.host.clone(),
            port: self.port,
            username,
            auth: std::mem::replace(&mut self.auth, AuthMethod::None),
            timeout: self.timeout,
            terminal_width: definition.terminal_width,
            terminal_height: definition.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path.take(),
        };
        let channel = SshChannel::new(
            ssh_config,
            definition.prompt.clone(),
            definition.on_open_commands.clone(),
        );

        Ok(self.build_with_channel(channel))
    }

    /// Build a driver over any [`RemoteChannel`].
    ///
    /// Authentication settings are ignored; the channel brings its own.
    pub fn build_with_channel<C: RemoteChannel>(self, channel: C) -> Driver<C> {
        let definition = self.platform.definition();
        let session = Session::new(
            channel,
            self.host,
            self.port,
            self.timeout,
            definition.failed_when_contains.clone(),
        );
        Driver::new(definition, session, self.relay.map(LocalExportRelay::new))
    }
}

//! Side channel for getting local files onto the device.
//!
//! The switch can only pull files with its own `copy` command, so a
//! candidate is first placed on a relay host both sides can reach. The
//! driver then hands the device a URL pointing at it.

use std::future::Future;
use std::path::{Path, PathBuf};

use log::debug;
use secrecy::ExposeSecret;

use crate::config::RelayConfig;
use crate::error::{Error, Result};

/// A file made reachable for the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// URL the device copies from. May contain credentials.
    pub url: String,
    /// `url` with the password masked, for logs and errors.
    pub redacted_url: String,
}

/// Capability to stage local files where the device can fetch them.
pub trait FileRelay: Send + Sync {
    /// Make `local` available and return where the device can find it.
    fn stage(&self, local: &Path) -> impl Future<Output = Result<StagedFile>> + Send;
}

/// Relay whose export directory is mounted locally.
///
/// Files are copied into `export_dir`; the device fetches them over scp
/// from `remote_dir` on the relay host, which is the same directory seen
/// from the relay's side.
#[derive(Debug)]
pub struct LocalExportRelay {
    config: RelayConfig,
}

impl LocalExportRelay {
    pub fn new(config: RelayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    fn url(&self, file_name: &str, password: &str) -> String {
        format!(
            "scp://{}:{}@{}/{}/{}",
            self.config.username,
            password,
            self.config.host,
            self.config.remote_dir.trim_matches('/'),
            file_name
        )
    }
}

impl FileRelay for LocalExportRelay {
    async fn stage(&self, local: &Path) -> Result<StagedFile> {
        let file_name = local
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::InvalidArgument {
                message: format!("{} has no usable file name", local.display()),
            })?;

        let destination: PathBuf = self.config.export_dir.join(file_name);
        debug!("Staging {} at {}", local.display(), destination.display());
        tokio::fs::copy(local, &destination)
            .await
            .map_err(|source| Error::Relay {
                path: local.to_path_buf(),
                source,
            })?;

        Ok(StagedFile {
            url: self.url(file_name, self.config.password.expose_secret()),
            redacted_url: self.url(file_name, "***"),
        })
    }
}

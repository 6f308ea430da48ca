//! Install-state reconciliation.
//!
//! The manager compares the version the installed binary reports against
//! the desired state and performs the one action that converges them:
//! install (which covers fresh install, upgrade, and downgrade), uninstall,
//! or nothing. Re-running with the same desired state is a no-op.

use std::io;
use std::path::PathBuf;

use shub_client::SecretClient;
use shub_core::paths::InstallDir;
use shub_core::platform::Platform;
use shub_core::{Error, Result};
use tracing::{debug, info};

use crate::archive;
use crate::release::ReleaseServer;

/// Sentinel version meaning "resolve via the release server".
pub const LATEST: &str = "latest";

/// Desired install state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    /// The binary should exist at the target version.
    Present,
    /// The binary should not exist.
    Absent,
}

/// The minimal action that converges observed state onto desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Fetch and install `version`.
    Install {
        /// The concrete version to install.
        version: String,
    },
    /// Remove the installed binary.
    Uninstall,
    /// Already converged.
    None,
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Whether any action was performed.
    pub changed: bool,
    /// The version installed after reconciliation, if any.
    pub version: Option<String>,
    /// Where the binary lives (or would live).
    pub bin_path: PathBuf,
    /// The install directory.
    pub install_dir: PathBuf,
}

/// Installs, upgrades, and removes the SecretHub CLI.
pub struct InstallManager {
    install_dir: InstallDir,
    platform: Platform,
    server: ReleaseServer,
    client: Box<dyn SecretClient>,
}

impl InstallManager {
    /// Create a manager over an install directory, probing versions
    /// through `client`.
    #[must_use]
    pub fn new(
        install_dir: InstallDir,
        platform: Platform,
        server: ReleaseServer,
        client: Box<dyn SecretClient>,
    ) -> Self {
        Self {
            install_dir,
            platform,
            server,
            client,
        }
    }

    /// Where the binary lives inside the install directory.
    #[must_use]
    pub fn bin_path(&self) -> PathBuf {
        self.install_dir.bin_path(&self.platform)
    }

    /// Decide which action converges `current` onto the desired state.
    ///
    /// Pure: the whole reconciliation table lives here, testable without
    /// any I/O.
    #[must_use]
    pub fn plan(current: Option<&str>, state: DesiredState, target: &str) -> Action {
        match state {
            DesiredState::Present if current == Some(target) => Action::None,
            DesiredState::Present => Action::Install {
                version: target.to_string(),
            },
            DesiredState::Absent if current.is_some() => Action::Uninstall,
            DesiredState::Absent => Action::None,
        }
    }

    /// Resolve the requested version: `latest` goes through the release
    /// server, anything else is taken as-is.
    pub async fn target_version(&self, requested: &str) -> Result<String> {
        if requested == LATEST {
            self.server.latest().await
        } else {
            Ok(requested.to_string())
        }
    }

    /// Converge the installed binary onto the desired state.
    pub async fn reconcile(&self, state: DesiredState, requested: &str) -> Result<Report> {
        let current = self.client.current_version().await?;
        debug!(?current, ?state, requested, "reconciling install state");

        let action = match state {
            DesiredState::Present => {
                let target = self.target_version(requested).await?;
                Self::plan(current.as_deref(), state, &target)
            }
            DesiredState::Absent => Self::plan(current.as_deref(), state, requested),
        };

        let changed = match action {
            Action::Install { ref version } => {
                self.install(version).await?;
                true
            }
            Action::Uninstall => {
                self.uninstall().await?;
                true
            }
            Action::None => false,
        };

        let version = if changed {
            self.client.current_version().await?
        } else {
            current
        };

        Ok(Report {
            changed,
            version,
            bin_path: self.bin_path(),
            install_dir: self.install_dir.path().to_path_buf(),
        })
    }

    /// Download and install `version` into the install directory.
    ///
    /// The download lands in a temporary directory that is removed on
    /// every exit path, success or failure; the install directory is only
    /// touched once the archive has fully extracted.
    pub async fn install(&self, version: &str) -> Result<()> {
        let scratch =
            tempfile::tempdir().map_err(|e| Error::filesystem(std::env::temp_dir(), e))?;

        let bytes = self.server.download(version, &self.platform).await?;
        let archive_path = scratch
            .path()
            .join(ReleaseServer::archive_name(version, &self.platform));
        tokio::fs::write(&archive_path, &bytes)
            .await
            .map_err(|e| Error::filesystem(&archive_path, e))?;

        archive::extract(&archive_path, self.install_dir.path())?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let bin = self.bin_path();
            tokio::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o711))
                .await
                .map_err(|e| Error::filesystem(&bin, e))?;
        }

        info!(version, bin_path = %self.bin_path().display(), "installed the SecretHub CLI");
        Ok(())
    }

    /// Remove the installed binary.
    ///
    /// The reconciler only calls this when a version was observed, but a
    /// binary that vanished in between is tolerated; only a denied
    /// deletion is fatal.
    pub async fn uninstall(&self) -> Result<()> {
        let bin = self.bin_path();
        match tokio::fs::remove_file(&bin).await {
            Ok(()) => {
                info!(bin_path = %bin.display(), "removed the SecretHub CLI");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::filesystem(bin, e)),
        }
    }
}

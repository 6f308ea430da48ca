//! Error types shared across the shub workspace.
//!
//! The CLI-inaccessible class (`BinaryNotFound`, `BinaryNotPermitted`) is
//! raised at the command runner and crosses every other layer unchanged, so
//! the whole taxonomy lives in this one enum.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for shub operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while installing or driving the SecretHub CLI.
#[derive(Error, Debug)]
pub enum Error {
    /// No binary exists at the configured path.
    #[error("cannot find the SecretHub CLI at: {path}")]
    BinaryNotFound {
        /// The path that was probed.
        path: PathBuf,
    },

    /// A binary exists but the current user may not execute it.
    #[error("cannot access the SecretHub CLI at: {path}: permission denied")]
    BinaryNotPermitted {
        /// The path that was probed.
        path: PathBuf,
    },

    /// The CLI reported a failure while reading a secret.
    #[error("{message}")]
    Read {
        /// The CLI's stderr text, verbatim.
        message: String,
    },

    /// The CLI reported a failure while writing a secret.
    #[error("{message}")]
    Write {
        /// The CLI's stderr text, verbatim.
        message: String,
    },

    /// The CLI reported a failure while generating a secret.
    #[error("{message}")]
    Generate {
        /// The CLI's stderr text, verbatim.
        message: String,
    },

    /// A release-server request failed.
    #[error("failed to fetch {url}: {message}")]
    Network {
        /// The URL that was requested.
        url: String,
        /// Transport error or HTTP status description.
        message: String,
    },

    /// A filesystem operation on the install tree failed.
    #[error("filesystem operation failed on {path}: {source}")]
    Filesystem {
        /// The path the operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A downloaded archive could not be unpacked.
    #[error("failed to unpack archive: {message}")]
    Archive {
        /// What went wrong while reading the archive.
        message: String,
    },

    /// Spawning or waiting on the CLI failed for a reason other than
    /// not-found or permission-denied.
    #[error("failed to run the SecretHub CLI: {source}")]
    Command {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create a binary-not-found error.
    #[must_use]
    pub fn binary_not_found(path: impl Into<PathBuf>) -> Self {
        Self::BinaryNotFound { path: path.into() }
    }

    /// Create a binary-not-permitted error.
    #[must_use]
    pub fn binary_not_permitted(path: impl Into<PathBuf>) -> Self {
        Self::BinaryNotPermitted { path: path.into() }
    }

    /// Create a read error carrying the CLI's stderr text.
    #[must_use]
    pub fn read(message: impl Into<String>) -> Self {
        Self::Read {
            message: message.into(),
        }
    }

    /// Create a write error carrying the CLI's stderr text.
    #[must_use]
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }

    /// Create a generate error carrying the CLI's stderr text.
    #[must_use]
    pub fn generate(message: impl Into<String>) -> Self {
        Self::Generate {
            message: message.into(),
        }
    }

    /// Create a network error for a failed fetch.
    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a filesystem error for a failed operation on `path`.
    #[must_use]
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Create an archive error.
    #[must_use]
    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    /// Whether this error means the CLI binary itself is inaccessible.
    #[must_use]
    pub fn is_cli_inaccessible(&self) -> bool {
        matches!(
            self,
            Self::BinaryNotFound { .. } | Self::BinaryNotPermitted { .. }
        )
    }
}

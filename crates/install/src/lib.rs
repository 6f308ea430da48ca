//! Installation and version reconciliation for the SecretHub CLI.
//!
//! [`ReleaseServer`] talks to the release host, [`archive`] unpacks the
//! downloaded artifact without ever leaving a partial result behind, and
//! [`InstallManager`] reconciles the observed install state against the
//! desired one.

pub mod archive;
pub mod manager;
pub mod release;

pub use manager::{Action, DesiredState, InstallManager, Report};
pub use release::ReleaseServer;

//! Shared foundations for the shub workspace.
//!
//! Everything the other crates agree on lives here: the error taxonomy,
//! the platform facts (OS, architecture, install defaults), the layered
//! option resolver, and the one place the binary path is derived from the
//! install directory.

pub mod config;
pub mod error;
pub mod paths;
pub mod platform;

pub use config::{ClientConfig, Resolver, SecureSecret, Source};
pub use error::{Error, Result};
pub use paths::InstallDir;
pub use platform::{Arch, Os, Platform};

//! Install-location derivation.
//!
//! The binary path is derived here and nowhere else: every component that
//! needs to know where the CLI lives goes through [`InstallDir::bin_path`].

use std::path::{Path, PathBuf};

use crate::platform::Platform;

/// The directory the SecretHub CLI is installed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallDir(PathBuf);

impl InstallDir {
    /// Resolve the install directory: the explicit override if supplied,
    /// otherwise the platform default.
    #[must_use]
    pub fn resolve(explicit: Option<PathBuf>, platform: &Platform) -> Self {
        Self(explicit.unwrap_or_else(|| PathBuf::from(platform.os.default_install_dir())))
    }

    /// The directory itself.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// The full path of the CLI binary inside this directory.
    #[must_use]
    pub fn bin_path(&self, platform: &Platform) -> PathBuf {
        self.0.join(platform.os.exe_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, Os};

    #[test]
    fn test_default_install_dir_on_linux() {
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        let dir = InstallDir::resolve(None, &platform);
        assert_eq!(dir.path(), Path::new("/usr/local/secrethub/"));
    }

    #[test]
    fn test_explicit_install_dir_overrides_default() {
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        let dir = InstallDir::resolve(Some(PathBuf::from("/opt/secrethub")), &platform);
        assert_eq!(dir.path(), Path::new("/opt/secrethub"));
    }

    #[test]
    fn test_bin_path_joins_executable_name() {
        let platform = Platform::new(Os::Linux, Arch::Amd64);
        let dir = InstallDir::resolve(None, &platform);
        assert_eq!(
            dir.bin_path(&platform),
            PathBuf::from("/usr/local/secrethub/secrethub")
        );
    }

    #[test]
    fn test_bin_path_uses_exe_suffix_on_windows() {
        let platform = Platform::new(Os::Windows, Arch::Amd64);
        let dir = InstallDir::resolve(Some(PathBuf::from(r"C:\SecretHub")), &platform);
        assert_eq!(
            dir.bin_path(&platform),
            PathBuf::from(r"C:\SecretHub").join("secrethub.exe")
        );
    }
}

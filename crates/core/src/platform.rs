//! Platform facts: operating system, architecture, and install defaults.
//!
//! Every OS or architecture branch in the workspace goes through these
//! enums; nothing else inspects `cfg` or inlines platform strings.

use std::path::PathBuf;

/// Platform identifier combining OS and architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Operating system.
    pub os: Os,
    /// Architecture bucket.
    pub arch: Arch,
}

impl Platform {
    /// Create a new platform.
    #[must_use]
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Get the current platform.
    #[must_use]
    pub fn current() -> Self {
        Self {
            os: Os::current(),
            arch: Arch::current(),
        }
    }

    /// Parse from a string like "linux-amd64".
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (os, arch) = s.split_once('-')?;
        Some(Self {
            os: Os::parse(os)?,
            arch: Arch::parse(arch)?,
        })
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Operating system, spelled the way release artifact names spell it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    /// Linux and other unix-likes that are not macOS.
    Linux,
    /// macOS.
    Darwin,
    /// Windows.
    Windows,
}

impl Os {
    /// Get the current OS.
    #[must_use]
    pub fn current() -> Self {
        #[cfg(target_os = "windows")]
        return Self::Windows;
        #[cfg(target_os = "macos")]
        return Self::Darwin;
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        return Self::Linux;
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "linux" => Some(Self::Linux),
            "darwin" | "macos" => Some(Self::Darwin),
            "windows" => Some(Self::Windows),
            _ => None,
        }
    }

    /// Name of the CLI executable on this OS.
    #[must_use]
    pub fn exe_name(self) -> &'static str {
        match self {
            Self::Windows => "secrethub.exe",
            Self::Linux | Self::Darwin => "secrethub",
        }
    }

    /// Directory the CLI is installed into when none is configured.
    #[must_use]
    pub fn default_install_dir(self) -> PathBuf {
        match self {
            Self::Windows => PathBuf::from(r"C:\Program Files\SecretHub\"),
            Self::Linux | Self::Darwin => PathBuf::from("/usr/local/secrethub/"),
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Darwin => write!(f, "darwin"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

/// Architecture bucket used in release artifact names.
///
/// The release server publishes exactly two flavors per OS: `amd64` for
/// every 64-bit target and `x86` for everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 64-bit.
    Amd64,
    /// 32-bit.
    X86,
}

impl Arch {
    /// Get the current architecture bucket.
    #[must_use]
    pub fn current() -> Self {
        #[cfg(target_pointer_width = "64")]
        return Self::Amd64;
        #[cfg(not(target_pointer_width = "64"))]
        return Self::X86;
    }

    /// Parse from string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "amd64" | "x86_64" | "x64" => Some(Self::Amd64),
            "x86" | "i386" | "i686" => Some(Self::X86),
            _ => None,
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Amd64 => write!(f, "amd64"),
            Self::X86 => write!(f, "x86"),
        }
    }
}

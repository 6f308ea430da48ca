//! Layered option resolution and the per-invocation client configuration.
//!
//! Options follow one chain everywhere: an explicitly supplied value wins,
//! otherwise the `SECRETHUB_<OPTION_NAME_UPPERCASED>` environment variable
//! is consulted, otherwise the option is unset. The chain is expressed as
//! an ordered list of named sources so it can be tested on its own instead
//! of living in scattered conditionals.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::trace;

use crate::paths::InstallDir;
use crate::platform::Platform;

/// Prefix of the environment variables the resolver consults.
pub const ENV_PREFIX: &str = "SECRETHUB_";

/// Option key for the CLI binary path.
pub const CLI_PATH: &str = "cli_path";
/// Option key for the CLI configuration directory.
pub const CONFIG_DIR: &str = "config_dir";
/// Option key for the account credential.
pub const CREDENTIAL: &str = "credential";
/// Option key for the credential passphrase.
pub const CREDENTIAL_PASSPHRASE: &str = "credential_passphrase";

/// A single named source of option values.
#[derive(Debug, Clone)]
pub enum Source {
    /// Explicitly supplied values (command-line flags).
    Explicit(HashMap<String, String>),
    /// Process environment, keyed by `<prefix><OPTION_NAME_UPPERCASED>`.
    Environment {
        /// Variable-name prefix, normally [`ENV_PREFIX`].
        prefix: String,
    },
}

impl Source {
    /// An explicit source over `pairs`, skipping unset values.
    #[must_use]
    pub fn explicit<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Option<String>)>,
    {
        Self::Explicit(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key.to_string(), v)))
                .collect(),
        )
    }

    /// The standard environment source.
    #[must_use]
    pub fn environment() -> Self {
        Self::Environment {
            prefix: ENV_PREFIX.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Explicit(_) => "explicit",
            Self::Environment { .. } => "environment",
        }
    }

    /// Empty values count as unset so the chain keeps walking.
    fn lookup(&self, key: &str) -> Option<String> {
        match self {
            Self::Explicit(values) => values.get(key).cloned(),
            Self::Environment { prefix } => {
                std::env::var(format!("{prefix}{}", key.to_uppercase())).ok()
            }
        }
        .filter(|value| !value.is_empty())
    }
}

/// Ordered walk over configuration sources; the first hit wins.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    sources: Vec<Source>,
}

impl Resolver {
    /// An empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source at the lowest precedence so far.
    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    /// The standard chain: explicit values, then the process environment.
    #[must_use]
    pub fn standard<I>(explicit: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Option<String>)>,
    {
        Self::new()
            .with_source(Source::explicit(explicit))
            .with_source(Source::environment())
    }

    /// Resolve `key` against the sources in order.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<String> {
        for source in &self.sources {
            if let Some(value) = source.lookup(key) {
                trace!(key, source = source.name(), "resolved option");
                return Some(value);
            }
        }
        trace!(key, "option unset");
        None
    }
}

/// A secret-valued option with redacted `Debug` and `Display`.
#[derive(Clone)]
pub struct SecureSecret {
    inner: SecretString,
}

impl SecureSecret {
    /// Move `value` into secure storage; it is zeroed on drop.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self {
            inner: SecretString::from(value),
        }
    }

    /// Expose the secret value for immediate use, e.g. setting a child
    /// process environment variable. The exposed value must not be logged.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }
}

impl From<String> for SecureSecret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Client options resolved once per invocation and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Override for the CLI binary path.
    pub cli_path: Option<PathBuf>,
    /// Configuration directory handed to the CLI via `--config-dir`.
    pub config_dir: Option<PathBuf>,
    /// Credential injected as `SECRETHUB_CREDENTIAL`.
    pub credential: Option<SecureSecret>,
    /// Passphrase injected as `SECRETHUB_CREDENTIAL_PASSPHRASE`.
    pub credential_passphrase: Option<SecureSecret>,
}

impl ClientConfig {
    /// Resolve all four client options through `resolver`.
    #[must_use]
    pub fn resolve(resolver: &Resolver) -> Self {
        Self {
            cli_path: resolver.resolve(CLI_PATH).map(PathBuf::from),
            config_dir: resolver.resolve(CONFIG_DIR).map(PathBuf::from),
            credential: resolver.resolve(CREDENTIAL).map(SecureSecret::new),
            credential_passphrase: resolver
                .resolve(CREDENTIAL_PASSPHRASE)
                .map(SecureSecret::new),
        }
    }

    /// The binary to invoke: the explicit override, or the binary the
    /// standard install location derives for this platform.
    #[must_use]
    pub fn binary_path(&self, platform: &Platform) -> PathBuf {
        self.cli_path
            .clone()
            .unwrap_or_else(|| InstallDir::resolve(None, platform).bin_path(platform))
    }
}

//! Execution of the external CLI binary.
//!
//! The runner owns everything about one invocation: argument-vector
//! assembly, the credential environment overlay, the optional stdin
//! payload, and whole-output capture. Spawn failures are mapped by
//! `io::ErrorKind` so a missing binary and an unexecutable binary stay
//! distinct all the way up the stack.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use shub_core::config::ClientConfig;
use shub_core::config::SecureSecret;
use shub_core::{Error, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Environment variable the CLI reads its credential from.
pub const CREDENTIAL_ENV: &str = "SECRETHUB_CREDENTIAL";
/// Environment variable the CLI reads its credential passphrase from.
pub const CREDENTIAL_PASSPHRASE_ENV: &str = "SECRETHUB_CREDENTIAL_PASSPHRASE";

/// Captured output of one finished CLI invocation.
///
/// The CLI signals failure through non-empty stderr text, not through its
/// exit code, so the exit status is deliberately not part of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Complete standard-output text, decoded lossily.
    pub stdout: String,
    /// Complete standard-error text, decoded lossily.
    pub stderr: String,
}

/// Runs the SecretHub CLI binary.
#[derive(Debug)]
pub struct CommandRunner {
    binary: PathBuf,
    config_dir: Option<PathBuf>,
    credential: Option<SecureSecret>,
    credential_passphrase: Option<SecureSecret>,
}

impl CommandRunner {
    /// Create a runner for `binary` using the options in `config`.
    #[must_use]
    pub fn new(binary: PathBuf, config: &ClientConfig) -> Self {
        Self {
            binary,
            config_dir: config.config_dir.clone(),
            credential: config.credential.clone(),
            credential_passphrase: config.credential_passphrase.clone(),
        }
    }

    /// The binary this runner invokes.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Invoke the CLI with `args`, feeding `stdin` to the child when given.
    ///
    /// The full argument vector is `[binary] [--config-dir=<dir>] <args..>`.
    /// The child inherits the ambient environment plus the credential
    /// overlay; the ambient environment itself is never touched. Output is
    /// collected whole after the child exits.
    pub async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<CommandOutput> {
        let mut command = Command::new(&self.binary);
        if let Some(dir) = &self.config_dir {
            command.arg(format!("--config-dir={}", dir.display()));
        }
        command.args(args);

        if let Some(credential) = &self.credential {
            command.env(CREDENTIAL_ENV, credential.expose());
        }
        if let Some(passphrase) = &self.credential_passphrase {
            command.env(CREDENTIAL_PASSPHRASE_ENV, passphrase.expose());
        }

        command.stdout(Stdio::piped()).stderr(Stdio::piped());
        debug!(binary = %self.binary.display(), ?args, "running the SecretHub CLI");

        let output = match stdin {
            Some(payload) => {
                command.stdin(Stdio::piped());
                let mut child = command.spawn().map_err(|e| self.map_spawn_error(e))?;
                if let Some(mut handle) = child.stdin.take() {
                    handle
                        .write_all(payload.as_bytes())
                        .await
                        .map_err(|source| Error::Command { source })?;
                    // Dropping the handle closes the pipe so the child sees
                    // end-of-input.
                    drop(handle);
                }
                child
                    .wait_with_output()
                    .await
                    .map_err(|source| Error::Command { source })?
            }
            None => {
                command.stdin(Stdio::null());
                command.output().await.map_err(|e| self.map_spawn_error(e))?
            }
        };

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn map_spawn_error(&self, source: io::Error) -> Error {
        match source.kind() {
            io::ErrorKind::NotFound => Error::binary_not_found(&self.binary),
            io::ErrorKind::PermissionDenied => Error::binary_not_permitted(&self.binary),
            _ => Error::Command { source },
        }
    }
}

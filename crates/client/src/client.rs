//! Secret operations over the SecretHub CLI.
//!
//! [`SecretClient`] is the substitution seam: exactly the operations the
//! rest of the workspace needs, so a native network client could replace
//! the subprocess-backed [`CliClient`] without touching the installer or
//! the command surface.

use async_trait::async_trait;
use shub_core::config::ClientConfig;
use shub_core::platform::Platform;
use shub_core::{Error, Result};
use tracing::debug;

use crate::runner::CommandRunner;

/// The secret operations this workspace performs.
#[async_trait]
pub trait SecretClient: Send + Sync {
    /// Read the secret at `path`.
    async fn read(&self, path: &str) -> Result<String>;

    /// Write `value` to the secret at `path`; echoes `value` back on
    /// success.
    async fn write(&self, path: &str, value: &str) -> Result<String>;

    /// Generate a random secret at `path` and return the generated value.
    async fn generate(&self, path: &str, length: u32, symbols: bool) -> Result<String>;

    /// The version of the installed CLI, or `None` when no binary exists.
    async fn current_version(&self) -> Result<Option<String>>;
}

/// [`SecretClient`] implementation that shells out to the SecretHub CLI.
///
/// The CLI's failure convention is textual: any non-empty stderr means the
/// operation failed, regardless of exit status or whatever landed on
/// stdout. Every method here applies that rule before looking at stdout.
#[derive(Debug)]
pub struct CliClient {
    runner: CommandRunner,
}

impl CliClient {
    /// Build a client from resolved options, deriving the binary path from
    /// the standard install location when no override is configured.
    #[must_use]
    pub fn new(config: &ClientConfig, platform: &Platform) -> Self {
        Self {
            runner: CommandRunner::new(config.binary_path(platform), config),
        }
    }

    /// Build a client over an existing runner.
    #[must_use]
    pub fn with_runner(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

/// Strip at most one trailing newline; the CLI terminates its output with
/// exactly one.
fn trim_one_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

#[async_trait]
impl SecretClient for CliClient {
    async fn read(&self, path: &str) -> Result<String> {
        let output = self.runner.run(&["read", path], None).await?;
        if !output.stderr.is_empty() {
            return Err(Error::read(output.stderr));
        }
        Ok(trim_one_newline(&output.stdout).to_string())
    }

    async fn write(&self, path: &str, value: &str) -> Result<String> {
        let output = self.runner.run(&["write", path], Some(value)).await?;
        if !output.stderr.is_empty() {
            return Err(Error::write(output.stderr));
        }
        // Pass-through echo, not a re-read.
        Ok(value.to_string())
    }

    async fn generate(&self, path: &str, length: u32, symbols: bool) -> Result<String> {
        let mut args = vec!["generate", "rand"];
        if symbols {
            args.push("--symbols");
        }
        args.push(path);
        let length_arg;
        if length > 0 {
            length_arg = length.to_string();
            args.push(&length_arg);
        }

        let output = self.runner.run(&args, None).await?;
        if !output.stderr.is_empty() {
            return Err(Error::generate(output.stderr));
        }

        // The CLI does not print the generated value; fetch it. A failure
        // here is a read failure, distinct from a generation failure.
        debug!(path, "generated secret, reading it back");
        self.read(path).await
    }

    async fn current_version(&self) -> Result<Option<String>> {
        match self.runner.run(&["--version"], None).await {
            // The CLI writes its version to stderr rather than stdout.
            // External quirk, preserved for compatibility and confined to
            // this method.
            Ok(output) => Ok(Some(trim_one_newline(&output.stderr).to_string())),
            // No binary at the path means "not installed", which the
            // reconciler treats as a state, not a failure. An unexecutable
            // binary stays fatal and distinct.
            Err(Error::BinaryNotFound { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A `/bin/sh` stand-in for the SecretHub CLI backed by a
    /// files-in-a-directory store. Speaks the same conventions: errors on
    /// stderr, version on stderr, secrets on stdout.
    fn fake_cli(dir: &TempDir) -> PathBuf {
        let store = dir.path().join("store");
        std::fs::create_dir_all(&store).unwrap();
        let body = format!(
            r#"#!/bin/sh
STORE="{store}"
case "$1" in
--version)
    printf 'secrethub 0.27.0\n' >&2
    ;;
read)
    if [ -f "$STORE/$2" ]; then
        cat "$STORE/$2"
        printf '\n'
    else
        printf 'read: secret not found: %s\n' "$2" >&2
    fi
    ;;
write)
    mkdir -p "$(dirname "$STORE/$2")"
    cat > "$STORE/$2"
    ;;
generate)
    shift
    if [ "$1" != rand ]; then
        printf 'generate: unknown subcommand\n' >&2
        exit 1
    fi
    shift
    CHARS='A-Za-z0-9'
    if [ "$1" = --symbols ]; then
        CHARS='A-Za-z0-9!@#$%'
        shift
    fi
    SECRET_PATH="$1"
    LEN="${{2:-22}}"
    mkdir -p "$(dirname "$STORE/$SECRET_PATH")"
    LC_ALL=C tr -dc "$CHARS" < /dev/urandom | head -c "$LEN" > "$STORE/$SECRET_PATH"
    ;;
*)
    printf 'unknown command: %s\n' "$1" >&2
    exit 1
    ;;
esac
"#,
            store = store.display()
        );
        let path = dir.path().join("secrethub");
        std::fs::write(&path, body).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path
    }

    fn client(binary: PathBuf) -> CliClient {
        let config = ClientConfig {
            cli_path: Some(binary),
            ..ClientConfig::default()
        };
        CliClient::new(&config, &Platform::current())
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let dir = TempDir::new().unwrap();
        let client = client(fake_cli(&dir));

        let echoed = client.write("company/app/db_pass", "secret-value").await.unwrap();
        assert_eq!(echoed, "secret-value");

        let value = client.read("company/app/db_pass").await.unwrap();
        assert_eq!(value, "secret-value");
    }

    #[tokio::test]
    async fn test_read_strips_exactly_one_trailing_newline() {
        let dir = TempDir::new().unwrap();
        let client = client(fake_cli(&dir));

        client.write("app/multiline", "line one\n").await.unwrap();
        // The store holds "line one\n" and the CLI appends its own newline;
        // only the CLI's newline is stripped.
        assert_eq!(client.read("app/multiline").await.unwrap(), "line one\n");
    }

    #[tokio::test]
    async fn test_read_of_missing_secret_is_a_read_error_with_cli_text() {
        let dir = TempDir::new().unwrap();
        let client = client(fake_cli(&dir));

        let err = client.read("app/absent").await.unwrap_err();
        match err {
            Error::Read { message } => {
                assert_eq!(message, "read: secret not found: app/absent\n");
            }
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_returns_value_of_requested_length() {
        let dir = TempDir::new().unwrap();
        let client = client(fake_cli(&dir));

        let value = client.generate("app/token", 16, false).await.unwrap();
        assert_eq!(value.len(), 16);
        assert!(value.chars().all(char::is_alphanumeric));

        // The follow-up read sees what generate stored.
        assert_eq!(client.read("app/token").await.unwrap(), value);
    }

    #[tokio::test]
    async fn test_generate_zero_length_uses_cli_default() {
        let dir = TempDir::new().unwrap();
        let client = client(fake_cli(&dir));

        let value = client.generate("app/default_len", 0, false).await.unwrap();
        assert_eq!(value.len(), 22);
    }

    #[tokio::test]
    async fn test_current_version_comes_from_stderr() {
        let dir = TempDir::new().unwrap();
        let client = client(fake_cli(&dir));

        let version = client.current_version().await.unwrap();
        assert_eq!(version.as_deref(), Some("secrethub 0.27.0"));
    }

    #[tokio::test]
    async fn test_current_version_of_missing_binary_is_none() {
        let dir = TempDir::new().unwrap();
        let client = client(dir.path().join("never-installed"));

        assert_eq!(client.current_version().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_current_version_of_unexecutable_binary_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("secrethub");
        std::fs::write(&path, "not a script").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o644);
        std::fs::set_permissions(&path, perms).unwrap();

        let err = client(path).current_version().await.unwrap_err();
        assert!(matches!(err, Error::BinaryNotPermitted { .. }));
    }

    #[tokio::test]
    async fn test_operations_surface_binary_not_found_unchanged() {
        let dir = TempDir::new().unwrap();
        let client = client(dir.path().join("missing"));

        assert!(matches!(
            client.read("a/b").await.unwrap_err(),
            Error::BinaryNotFound { .. }
        ));
        assert!(matches!(
            client.write("a/b", "v").await.unwrap_err(),
            Error::BinaryNotFound { .. }
        ));
        assert!(matches!(
            client.generate("a/b", 16, false).await.unwrap_err(),
            Error::BinaryNotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_stdout_content_never_rescues_a_stderr_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("noisy");
        std::fs::write(
            &path,
            "#!/bin/sh\nprintf 'plausible value\\n'\nprintf 'something went wrong\\n' >&2\n",
        )
        .unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        let client = client(path);
        let err = client.read("a/b").await.unwrap_err();
        assert!(matches!(err, Error::Read { message } if message == "something went wrong\n"));
    }

    #[tokio::test]
    async fn test_empty_streams_mean_success_with_empty_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("silent");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();

        let client = client(path);
        assert_eq!(client.read("a/b").await.unwrap(), "");
    }
}

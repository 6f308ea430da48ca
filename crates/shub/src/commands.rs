//! Dispatch from parsed arguments to the client and installer.

use serde::Serialize;
use shub_client::{CliClient, SecretClient};
use shub_core::config::{self, ClientConfig, Resolver};
use shub_core::paths::InstallDir;
use shub_core::platform::Platform;
use shub_core::Error;
use shub_install::manager::LATEST;
use shub_install::{DesiredState, InstallManager, ReleaseServer};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use crate::cli::{Cli, Commands};
use crate::error::CliError;

/// Resolver key for the install directory.
const INSTALL_DIR: &str = "install_dir";
/// Resolver key for the requested version.
const VERSION: &str = "version";

/// Result envelope reported for every invocation.
///
/// On failure the fields that were already known still appear alongside
/// the error.
#[derive(Debug, Default, Serialize)]
pub struct Report {
    /// Whether any state was changed.
    pub changed: bool,
    /// Installed version after the operation, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Where the binary lives (or would live).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_path: Option<PathBuf>,
    /// The install directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,
    /// The secret value for read, write, and generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// A report plus the failure that interrupted it, if any.
#[derive(Debug)]
pub struct Outcome {
    /// The partial or complete result envelope.
    pub report: Report,
    /// The failure, when the operation did not complete.
    pub error: Option<CliError>,
}

impl Outcome {
    fn ok(report: Report) -> Self {
        Self {
            report,
            error: None,
        }
    }

    fn failed(report: Report, error: impl Into<CliError>) -> Self {
        Self {
            report,
            error: Some(error.into()),
        }
    }
}

/// Execute one parsed invocation.
pub async fn execute(cli: Cli) -> Outcome {
    let platform = Platform::current();
    let Cli {
        command,
        cli_path,
        config_dir,
        credential,
        credential_passphrase,
        ..
    } = cli;

    let globals = [
        (config::CLI_PATH, cli_path),
        (config::CONFIG_DIR, config_dir),
        (config::CREDENTIAL, credential),
        (config::CREDENTIAL_PASSPHRASE, credential_passphrase),
    ];

    match command {
        Commands::Install {
            install_dir,
            version,
        } => {
            let resolver = resolver(globals, [(INSTALL_DIR, install_dir), (VERSION, version)]);
            reconcile(DesiredState::Present, &resolver, &platform).await
        }
        Commands::Uninstall { install_dir } => {
            let resolver = resolver(globals, [(INSTALL_DIR, install_dir)]);
            reconcile(DesiredState::Absent, &resolver, &platform).await
        }
        Commands::Read { path } => {
            let client = client(globals, &platform);
            match client.read(&path).await {
                Ok(value) => Outcome::ok(Report {
                    secret: Some(value),
                    ..Report::default()
                }),
                Err(err) => Outcome::failed(Report::default(), err),
            }
        }
        Commands::Write { path, value } => {
            let client = client(globals, &platform);
            let value = match value {
                Some(value) => value,
                None => match read_stdin().await {
                    Ok(value) => value,
                    Err(err) => return Outcome::failed(Report::default(), err),
                },
            };
            match client.write(&path, &value).await {
                Ok(echoed) => Outcome::ok(Report {
                    changed: true,
                    secret: Some(echoed),
                    ..Report::default()
                }),
                Err(err) => Outcome::failed(Report::default(), err),
            }
        }
        Commands::Generate {
            path,
            length,
            symbols,
        } => {
            let client = client(globals, &platform);
            match client.generate(&path, length, symbols).await {
                Ok(value) => Outcome::ok(Report {
                    changed: true,
                    secret: Some(value),
                    ..Report::default()
                }),
                // A read failure after a successful generation: the secret
                // was created, so the change stands even though the value
                // could not be returned.
                Err(err @ Error::Read { .. }) => Outcome::failed(
                    Report {
                        changed: true,
                        ..Report::default()
                    },
                    err,
                ),
                Err(err) => Outcome::failed(Report::default(), err),
            }
        }
    }
}

fn resolver<const N: usize, const M: usize>(
    globals: [(&'static str, Option<String>); N],
    locals: [(&'static str, Option<String>); M],
) -> Resolver {
    Resolver::standard(globals.into_iter().chain(locals))
}

fn client(globals: [(&'static str, Option<String>); 4], platform: &Platform) -> CliClient {
    let resolver = Resolver::standard(globals);
    let config = ClientConfig::resolve(&resolver);
    CliClient::new(&config, platform)
}

async fn reconcile(state: DesiredState, resolver: &Resolver, platform: &Platform) -> Outcome {
    let install_dir = InstallDir::resolve(
        resolver.resolve(INSTALL_DIR).map(PathBuf::from),
        platform,
    );
    let requested = resolver
        .resolve(VERSION)
        .unwrap_or_else(|| LATEST.to_string());

    // The version probe must target the binary inside the chosen install
    // directory unless an explicit override says otherwise.
    let mut client_config = ClientConfig::resolve(resolver);
    if client_config.cli_path.is_none() {
        client_config.cli_path = Some(install_dir.bin_path(platform));
    }
    let client = Box::new(CliClient::new(&client_config, platform));

    let report = Report {
        bin_path: Some(install_dir.bin_path(platform)),
        install_dir: Some(install_dir.path().to_path_buf()),
        ..Report::default()
    };

    let manager = InstallManager::new(install_dir, *platform, ReleaseServer::new(), client);
    match manager.reconcile(state, &requested).await {
        Ok(result) => Outcome::ok(Report {
            changed: result.changed,
            version: result.version,
            ..report
        }),
        Err(err) => Outcome::failed(report, err),
    }
}

async fn read_stdin() -> Result<String, CliError> {
    let mut value = String::new();
    tokio::io::stdin()
        .read_to_string(&mut value)
        .await
        .map_err(|e| CliError::usage(format!("failed to read the value from stdin: {e}")))?;
    Ok(value)
}

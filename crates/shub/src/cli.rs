//! Command-line surface.
//!
//! The four client options are declared here but resolved through the
//! layered resolver in `commands`, so the explicit-flag-then-environment
//! precedence lives in one testable place rather than in per-arg `env`
//! attributes.

use clap::{Parser, Subcommand};

use crate::tracing::{LogLevel, TracingFormat};

#[derive(Parser, Debug)]
#[command(name = "shub")]
#[command(about = "Install the SecretHub CLI and read, write, and generate secrets through it")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(
        long,
        global = true,
        help = "Path to the SecretHub CLI binary (falls back to SECRETHUB_CLI_PATH)"
    )]
    pub cli_path: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Configuration directory handed to the CLI (falls back to SECRETHUB_CONFIG_DIR)"
    )]
    pub config_dir: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Account credential (falls back to SECRETHUB_CREDENTIAL)"
    )]
    pub credential: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Passphrase unlocking the credential (falls back to SECRETHUB_CREDENTIAL_PASSPHRASE)"
    )]
    pub credential_passphrase: Option<String>,

    #[arg(long, global = true, help = "Emit the result as JSON on stdout")]
    pub json: bool,

    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Log output format",
        default_value = "compact",
        value_enum
    )]
    pub log_format: TracingFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Install or upgrade the SecretHub CLI")]
    Install {
        #[arg(
            long,
            help = "Directory to install into (falls back to SECRETHUB_INSTALL_DIR, then the platform default)"
        )]
        install_dir: Option<String>,
        #[arg(
            long,
            help = "Version to install, or \"latest\" (falls back to SECRETHUB_VERSION) [default: latest]"
        )]
        version: Option<String>,
    },
    #[command(about = "Remove the installed SecretHub CLI")]
    Uninstall {
        #[arg(
            long,
            help = "Directory the CLI was installed into (falls back to SECRETHUB_INSTALL_DIR)"
        )]
        install_dir: Option<String>,
    },
    #[command(about = "Read the secret at a path")]
    Read {
        #[arg(help = "Secret path, e.g. company/app/db_pass")]
        path: String,
    },
    #[command(about = "Write a secret")]
    Write {
        #[arg(help = "Secret path to write to")]
        path: String,
        #[arg(long, help = "Value to store; read from stdin when omitted")]
        value: Option<String>,
    },
    #[command(about = "Generate a random secret and print it")]
    Generate {
        #[arg(help = "Secret path to generate into")]
        path: String,
        #[arg(long, default_value_t = 22, help = "Length of the generated value")]
        length: u32,
        #[arg(long, help = "Include symbol characters")]
        symbols: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["shub", "read", "a/b"]).unwrap();
        assert!(matches!(cli.level, LogLevel::Warn));
        assert!(matches!(cli.log_format, TracingFormat::Compact));
        assert!(!cli.json);
        assert!(cli.cli_path.is_none());
    }

    #[test]
    fn test_install_defaults_leave_version_unset() {
        let cli = Cli::try_parse_from(["shub", "install"]).unwrap();
        match cli.command {
            Commands::Install {
                install_dir,
                version,
            } => {
                assert!(install_dir.is_none());
                assert!(version.is_none());
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_install_pinned_version() {
        let cli = Cli::try_parse_from(["shub", "install", "--version", "0.27.0"]).unwrap();
        match cli.command {
            Commands::Install { version, .. } => assert_eq!(version.as_deref(), Some("0.27.0")),
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["shub", "generate", "app/token"]).unwrap();
        match cli.command {
            Commands::Generate {
                path,
                length,
                symbols,
            } => {
                assert_eq!(path, "app/token");
                assert_eq!(length, 22);
                assert!(!symbols);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_with_length_and_symbols() {
        let cli =
            Cli::try_parse_from(["shub", "generate", "app/token", "--length", "16", "--symbols"])
                .unwrap();
        match cli.command {
            Commands::Generate {
                length, symbols, ..
            } => {
                assert_eq!(length, 16);
                assert!(symbols);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_global_client_options_apply_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "shub",
            "read",
            "a/b",
            "--cli-path",
            "/opt/secrethub",
            "--config-dir",
            "/etc/secrethub",
        ])
        .unwrap();
        assert_eq!(cli.cli_path.as_deref(), Some("/opt/secrethub"));
        assert_eq!(cli.config_dir.as_deref(), Some("/etc/secrethub"));
    }

    #[test]
    fn test_read_requires_a_path() {
        assert!(Cli::try_parse_from(["shub", "read"]).is_err());
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["shub"]).is_err());
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        assert!(Cli::try_parse_from(["shub", "--level", "loud", "read", "a/b"]).is_err());
    }
}

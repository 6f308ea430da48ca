//! CLI error type with exit-code mapping.

use miette::Diagnostic;
use shub_core::Error as CoreError;
use thiserror::Error;

/// Successful exit.
pub const EXIT_OK: i32 = 0;
/// Usage or configuration error exit code.
pub const EXIT_USAGE: i32 = 2;
/// Operation failure exit code.
pub const EXIT_OPERATION: i32 = 3;

/// Errors surfaced at the binary boundary.
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// The invocation itself was wrong (exit code 2).
    #[error("{message}")]
    #[diagnostic(code(shub::cli::usage))]
    Usage {
        /// The error message.
        message: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },

    /// The requested operation failed (exit code 3).
    #[error("{message}")]
    #[diagnostic(code(shub::cli::operation))]
    Operation {
        /// The error message.
        message: String,
        /// Optional help text.
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a usage error.
    #[must_use]
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
            help: None,
        }
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(message: impl Into<String>) -> Self {
        Self::Operation {
            message: message.into(),
            help: None,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let help = match &err {
            CoreError::BinaryNotFound { .. } => Some(
                "run `shub install`, or point --cli-path at an existing SecretHub CLI binary"
                    .to_string(),
            ),
            CoreError::BinaryNotPermitted { .. } => {
                Some("check the permissions on the CLI binary".to_string())
            }
            CoreError::Network { .. } => {
                Some("check connectivity to the release server and retry".to_string())
            }
            _ => None,
        };
        Self::Operation {
            message: err.to_string(),
            help,
        }
    }
}

/// Map an error to its process exit code.
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Usage { .. } => EXIT_USAGE,
        CliError::Operation { .. } => EXIT_OPERATION,
    }
}

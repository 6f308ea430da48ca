//! shub: installer and command-line client for the SecretHub CLI.

mod cli;
mod commands;
mod error;
mod tracing;

use crate::commands::{Outcome, Report};
use crate::error::exit_code_for;
use crate::tracing::{TracingConfig, TracingFormat};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("shub panicked: {panic_info}");
        eprintln!("run with RUST_LOG=debug for more detail");
    }));

    // Usage errors exit through clap with code 2.
    let cli = cli::parse();

    let format = if cli.json {
        TracingFormat::Json
    } else {
        cli.log_format
    };
    let tracing_config = TracingConfig {
        format,
        level: cli.level,
    };
    if let Err(report) = crate::tracing::init_tracing(&tracing_config) {
        eprintln!("{report:?}");
        std::process::exit(error::EXIT_OPERATION);
    }

    let json = cli.json;
    let Outcome { report, error } = commands::execute(cli).await;

    print_report(&report, json, error.is_some());

    if let Some(err) = error {
        let code = exit_code_for(&err);
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Print the result envelope: one JSON object in `--json` mode, otherwise
/// the secret itself or a one-line summary.
fn print_report(report: &Report, json: bool, failed: bool) {
    if json {
        // Partial fields still appear on failure.
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{text}"),
            Err(e) => eprintln!("failed to serialize the result: {e}"),
        }
        return;
    }
    if failed {
        return;
    }
    if let Some(secret) = &report.secret {
        println!("{secret}");
    } else if let (Some(version), Some(bin_path)) = (&report.version, &report.bin_path) {
        if report.changed {
            println!("installed secrethub {version} at {}", bin_path.display());
        } else {
            println!("secrethub {version} already installed at {}", bin_path.display());
        }
    } else if report.changed {
        println!("removed the installed secrethub binary");
    } else {
        println!("nothing to do");
    }
}

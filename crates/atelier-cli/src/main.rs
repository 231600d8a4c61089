//! `atelier` -- command-line caller for the evolution engine.
//!
//! Wraps each engine operation in a subcommand and reports the outcome as
//! JSON status lines, so schedulers and agent runtimes can drive the
//! engine and parse its answers.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration (`--config`, `atelier-config.yaml`, environment)
//! 3. Initialize structured logging on stderr
//! 4. Build the engine over the configured state and rules files
//! 5. Run the command and print the result
//!
//! Any failure prints an `error` status line on stderr and exits with
//! status 1.

mod commands;
mod config;
mod error;
mod output;

use std::process::ExitCode;

use atelier_evolution::EvolutionEngine;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;
use crate::config::AtelierConfig;
use crate::error::CliError;
use crate::output::StatusLine;

/// Application entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(&cli) {
        Ok(result) => {
            StatusLine::Success { result }.emit();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "command failed");
            StatusLine::Error {
                message: e.to_string(),
            }
            .emit();
            ExitCode::FAILURE
        }
    }
}

/// Load configuration, set up logging, and run the parsed command.
fn execute(cli: &Cli) -> Result<serde_json::Value, CliError> {
    let config = match AtelierConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&AtelierConfig::default());
            return Err(e.into());
        }
    };
    init_logging(&config);

    debug!(
        state_file = %config.paths.state_file.display(),
        rules_file = %config.paths.rules_file.display(),
        "configuration loaded"
    );

    let engine = EvolutionEngine::from_paths(&config.paths.state_file, &config.paths.rules_file);

    StatusLine::Running {
        message: cli.command.running_message().to_owned(),
    }
    .emit();

    commands::run(&engine, &cli.command)
}

/// Initialize structured logging on stderr.
///
/// `RUST_LOG` wins over the configured level; an unparsable level falls
/// back to `info`.
fn init_logging(config: &AtelierConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

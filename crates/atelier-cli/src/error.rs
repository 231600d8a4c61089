//! Error types for the `atelier` binary.
//!
//! [`CliError`] wraps every failure a command can report. `main` renders
//! it as a JSON error line and exits non-zero.

/// Top-level error for the `atelier` binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The evolution engine failed.
    #[error("{source}")]
    Evolution {
        /// The underlying engine error.
        #[from]
        source: atelier_evolution::EvolutionError,
    },

    /// `sync` evolved the agent and saved it, then failed to record the
    /// sales figures. The evolution stands.
    #[error(
        "evolved generation {} → {} but failed to record sales: {source}",
        .evolution.previous_generation,
        .evolution.new_generation
    )]
    SalesNotRecorded {
        /// The evolution that was saved before the failure.
        evolution: atelier_types::EvolutionResult,
        /// The stats-update failure.
        source: atelier_evolution::EvolutionError,
    },

    /// A command result could not be encoded as JSON.
    #[error("output encoding error: {0}")]
    Output(#[from] serde_json::Error),
}

//! Error types for the atelier-evolution crate.
//!
//! Read-path problems (missing or corrupt files) never surface as errors
//! from the engine; they degrade to defaults. The variants here cover the
//! write path and the few computations that can genuinely fail.

use std::path::PathBuf;

/// Errors returned by engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    /// The state could not be written to its store.
    #[error("failed to persist evolution state to {location}: {source}")]
    Persistence {
        /// Where the store was writing (file path or store label).
        location: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The state could not be serialized.
    #[error("failed to serialize evolution state: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A counter would overflow.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },

    /// Theme selection was asked to pick from an empty list.
    #[error("no themes unlocked")]
    EmptyThemes,
}

/// Errors from strict rules-file parsing.
///
/// Only [`crate::rules::EvolutionRules::from_file`] returns these;
/// [`crate::rules::load_rules`] logs them and falls back to defaults.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// Failed to read the rules file.
    #[error("failed to read rules file {path}: {source}")]
    Io {
        /// The rules file path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The rules file is not valid rules JSON.
    #[error("failed to parse rules file {path}: {source}")]
    Json {
        /// The rules file path.
        path: PathBuf,
        /// The underlying parse error.
        source: serde_json::Error,
    },
}

//! Command-line surface and command dispatch.
//!
//! Every subcommand maps onto one engine operation, except `sync`, which
//! runs the whole reporting flow: check the milestone, evolve if it was
//! crossed, then record the sales figures.

use std::path::PathBuf;

use atelier_evolution::{EvolutionEngine, EvolutionInput, StateStore};
use atelier_types::EvolutionResult;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::CliError;

/// Evolving-artist agent: evolution state, triggers, and pricing.
#[derive(Debug, Parser)]
#[command(name = "atelier", version, about)]
pub struct Cli {
    /// YAML configuration file (default: `atelier-config.yaml` if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Evolve the agent to its next generation.
    Evolve {
        /// Total sales proceeds, stored verbatim.
        #[arg(short, long)]
        proceeds: String,
        /// Current generation as the caller sees it.
        #[arg(short, long)]
        generation: u32,
        /// Reason for the evolution.
        #[arg(short, long)]
        trigger: String,
    },
    /// Record sales figures without evolving.
    UpdateStats {
        /// Total artworks minted.
        #[arg(long)]
        minted: u64,
        /// Total artworks sold.
        #[arg(long)]
        sold: u64,
        /// Total sales proceeds.
        #[arg(long)]
        proceeds: String,
    },
    /// Report whether a sales total warrants evolving.
    ShouldEvolve {
        /// Total artworks sold.
        #[arg(long)]
        sold: u64,
    },
    /// Pick a random unlocked theme for the next artwork.
    Theme,
    /// Show the current list price.
    Price,
    /// Show the full evolution state.
    Status,
    /// Record sales, evolving first if a milestone was crossed.
    Sync {
        /// Total artworks minted.
        #[arg(long)]
        minted: u64,
        /// Total artworks sold.
        #[arg(long)]
        sold: u64,
        /// Total sales proceeds.
        #[arg(long)]
        proceeds: String,
        /// Reason recorded if an evolution happens.
        #[arg(short, long)]
        trigger: Option<String>,
    },
}

impl Command {
    /// Message for the `running` status line.
    pub const fn running_message(&self) -> &'static str {
        match self {
            Self::Evolve { .. } => "Evolving agent...",
            Self::UpdateStats { .. } => "Updating stats...",
            Self::ShouldEvolve { .. } => "Checking evolution threshold...",
            Self::Theme => "Selecting theme...",
            Self::Price => "Calculating list price...",
            Self::Status => "Loading evolution state...",
            Self::Sync { .. } => "Syncing sales...",
        }
    }
}

/// Result of `sync`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Whether the milestone was crossed and the agent evolved.
    pub evolved: bool,
    /// The evolution summary, when one happened.
    pub evolution: Option<EvolutionResult>,
    /// Generation after the sync.
    pub generation: u32,
    /// List price after the sync.
    pub list_price: String,
}

/// Run `command` against `engine`, returning the JSON result.
///
/// # Errors
///
/// Returns [`CliError::Evolution`] if the engine fails, typically on a
/// state write.
pub fn run<S: StateStore>(
    engine: &EvolutionEngine<S>,
    command: &Command,
) -> Result<serde_json::Value, CliError> {
    match command {
        Command::Evolve {
            proceeds,
            generation,
            trigger,
        } => {
            let result = engine.evolve(&EvolutionInput::new(
                proceeds.as_str(),
                *generation,
                trigger.as_str(),
            ))?;
            Ok(serde_json::to_value(result)?)
        }
        Command::UpdateStats {
            minted,
            sold,
            proceeds,
        } => {
            engine.update_stats(*minted, *sold, proceeds)?;
            Ok(json!({ "minted": minted, "sold": sold, "proceeds": proceeds }))
        }
        Command::ShouldEvolve { sold } => {
            Ok(json!({ "sold": sold, "shouldEvolve": engine.should_evolve(*sold) }))
        }
        Command::Theme => {
            let theme = engine.select_theme(&mut rand::rng())?;
            Ok(json!({ "theme": theme }))
        }
        Command::Price => Ok(json!({ "listPrice": engine.calculate_list_price() })),
        Command::Status => Ok(serde_json::to_value(engine.load_state())?),
        Command::Sync {
            minted,
            sold,
            proceeds,
            trigger,
        } => {
            let outcome = sync(engine, *minted, *sold, proceeds, trigger.as_deref())?;
            Ok(serde_json::to_value(outcome)?)
        }
    }
}

/// Check the milestone, evolve if crossed, then record the sales figures.
///
/// The milestone is checked against the figures recorded before this
/// sync, so the stats update happens last.
///
/// # Errors
///
/// Propagates engine failures. If evolving fails, the stats are not
/// updated either. If evolving succeeds and the stats update then fails,
/// returns [`CliError::SalesNotRecorded`] carrying the saved evolution.
pub fn sync<S: StateStore>(
    engine: &EvolutionEngine<S>,
    minted: u64,
    sold: u64,
    proceeds: &str,
    trigger: Option<&str>,
) -> Result<SyncOutcome, CliError> {
    let evolution = if engine.should_evolve(sold) {
        let current = engine.load_state().generation;
        let trigger = trigger.map_or_else(|| format!("Sales milestone: {sold} sold"), str::to_owned);
        Some(engine.evolve(&EvolutionInput::new(proceeds, current, trigger))?)
    } else {
        None
    };

    if let Err(source) = engine.update_stats(minted, sold, proceeds) {
        return Err(match evolution {
            Some(evolution) => CliError::SalesNotRecorded { evolution, source },
            None => source.into(),
        });
    }

    let state = engine.load_state();
    info!(
        evolved = evolution.is_some(),
        generation = state.generation,
        sold,
        "sales synced"
    );
    Ok(SyncOutcome {
        evolved: evolution.is_some(),
        evolution,
        generation: state.generation,
        list_price: engine.calculate_list_price(),
    })
}

//! Core structs: the persisted evolution state and its audit trail.
//!
//! [`EvolutionState`] is the only durable record the agent keeps. It is
//! rewritten in full on every mutation and never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::ColorPalette;

/// Lower bound for [`EvolutionState::complexity_boost`].
pub const MIN_COMPLEXITY_BOOST: u32 = 1;

/// Upper bound for [`EvolutionState::complexity_boost`].
pub const MAX_COMPLEXITY_BOOST: u32 = 10;

/// Lower bound for [`EvolutionState::element_variety`].
pub const MIN_ELEMENT_VARIETY: u32 = 3;

/// Upper bound for [`EvolutionState::element_variety`].
pub const MAX_ELEMENT_VARIETY: u32 = 8;

/// Themes every agent starts with at generation 1.
pub const SEED_THEMES: [&str; 4] = [
    "cosmic nebula",
    "digital forest",
    "abstract emotion",
    "geometric dreams",
];

/// The agent's current generation, production parameters, and sales
/// bookkeeping.
///
/// Serialized with `snake_case` field names, matching the state file
/// layout:
///
/// ```json
/// {
///   "generation": 2,
///   "complexity_boost": 2,
///   "color_palette": "warm",
///   "element_variety": 4,
///   "themes_unlocked": ["cosmic nebula", "..."],
///   "total_proceeds": "0.05",
///   "total_minted": 10,
///   "total_sold": 6,
///   "last_evolved": "2026-10-16T12:00:00Z",
///   "evolution_history": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionState {
    /// Current generation, starting at 1. Advances by exactly one per
    /// evolution.
    pub generation: u32,
    /// Artwork complexity multiplier, within
    /// [`MIN_COMPLEXITY_BOOST`]..=[`MAX_COMPLEXITY_BOOST`].
    pub complexity_boost: u32,
    /// Palette for the current generation.
    pub color_palette: ColorPalette,
    /// Number of distinct element kinds per artwork, within
    /// [`MIN_ELEMENT_VARIETY`]..=[`MAX_ELEMENT_VARIETY`].
    pub element_variety: u32,
    /// Themes available for selection. Append-only, no duplicates.
    pub themes_unlocked: Vec<String>,
    /// Cumulative proceeds as reported by the caller, stored verbatim.
    pub total_proceeds: String,
    /// Cumulative artworks minted, as reported by the caller.
    pub total_minted: u64,
    /// Cumulative artworks sold, as reported by the caller.
    pub total_sold: u64,
    /// When the agent last evolved (genesis time until the first evolution).
    pub last_evolved: DateTime<Utc>,
    /// One entry per successful evolution, oldest first.
    pub evolution_history: Vec<EvolutionEvent>,
}

impl EvolutionState {
    /// The genesis state: generation 1, vibrant palette, the four seed
    /// themes, and zeroed sales bookkeeping.
    pub fn genesis(now: DateTime<Utc>) -> Self {
        Self {
            generation: 1,
            complexity_boost: MIN_COMPLEXITY_BOOST,
            color_palette: ColorPalette::Vibrant,
            element_variety: MIN_ELEMENT_VARIETY,
            themes_unlocked: seed_themes(),
            total_proceeds: String::from("0"),
            total_minted: 0,
            total_sold: 0,
            last_evolved: now,
            evolution_history: Vec::new(),
        }
    }

    /// Whether `theme` is already unlocked.
    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes_unlocked.iter().any(|t| t == theme)
    }
}

impl Default for EvolutionState {
    fn default() -> Self {
        Self::genesis(Utc::now())
    }
}

/// The seed themes as owned strings.
pub fn seed_themes() -> Vec<String> {
    SEED_THEMES.iter().map(|t| (*t).to_owned()).collect()
}

/// One audit-trail entry, appended for every evolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionEvent {
    /// The generation reached by this evolution.
    pub generation: u32,
    /// When the evolution happened.
    pub timestamp: DateTime<Utc>,
    /// Caller-supplied reason, recorded opaquely.
    pub trigger: String,
    /// Human-readable description of each parameter change.
    pub improvements: Vec<String>,
}

/// Summary of one evolution, returned to the caller.
///
/// Serialized in `camelCase` for the CLI's JSON status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionResult {
    /// Generation before the transition.
    pub previous_generation: u32,
    /// Generation after the transition (`previous_generation + 1`).
    pub new_generation: u32,
    /// One description per parameter that changed.
    pub improvements: Vec<String>,
    /// Newly unlocked themes, described for display.
    pub new_abilities: Vec<String>,
}

//! Tunable evolution rules: pricing coefficients, the theme-unlock table,
//! and the sales-threshold multiplier.
//!
//! Rules live in an optional JSON file (default
//! `config/evolution-rules.json`) with `camelCase` keys:
//!
//! ```json
//! {
//!   "basePrice": 0.005,
//!   "generationBonus": 0.001,
//!   "scarcityBonus": 0.002,
//!   "demandBonus": 0.003,
//!   "themes": { "2": "neon cityscape", "3": "organic flow" },
//!   "salesThresholdMultiplier": 3
//! }
//! ```
//!
//! Each key falls back to its built-in default when absent. Theme entries
//! whose key is not a generation number or whose value is not a string are
//! skipped with a warning; the rest of the file still applies. The
//! multiplier may be fractional. A missing file yields the full default
//! rule set silently; an unreadable or malformed file yields it with a
//! warning. Rules are read-only to the engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::RulesError;

/// Default rules file location, relative to the project root.
pub const DEFAULT_RULES_PATH: &str = "config/evolution-rules.json";

/// Immutable configuration for one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionRules {
    /// List price floor before any bonus.
    #[serde(default = "default_base_price")]
    pub base_price: Decimal,

    /// Added to the price once per generation.
    #[serde(default = "default_generation_bonus")]
    pub generation_bonus: Decimal,

    /// Added once more than 5 artworks have sold.
    #[serde(default = "default_scarcity_bonus")]
    pub scarcity_bonus: Decimal,

    /// Added once more than 10 artworks have sold.
    #[serde(default = "default_demand_bonus")]
    pub demand_bonus: Decimal,

    /// Theme unlocked on reaching each generation.
    #[serde(default = "default_themes", deserialize_with = "deserialize_themes")]
    pub themes: BTreeMap<u32, String>,

    /// Sales needed per generation before the next evolution. The
    /// threshold is rounded up to whole sales.
    #[serde(default = "default_sales_threshold_multiplier")]
    pub sales_threshold_multiplier: Decimal,
}

impl Default for EvolutionRules {
    fn default() -> Self {
        Self {
            base_price: default_base_price(),
            generation_bonus: default_generation_bonus(),
            scarcity_bonus: default_scarcity_bonus(),
            demand_bonus: default_demand_bonus(),
            themes: default_themes(),
            sales_threshold_multiplier: default_sales_threshold_multiplier(),
        }
    }
}

impl EvolutionRules {
    /// Read and parse a rules file.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Io`] if the file cannot be read, or
    /// [`RulesError::Json`] if it is not a valid rules object.
    pub fn from_file(path: &Path) -> Result<Self, RulesError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| RulesError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse rules from a JSON string.
    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Theme unlocked on reaching `generation`, if any.
    pub fn theme_for(&self, generation: u32) -> Option<&str> {
        self.themes.get(&generation).map(String::as_str)
    }
}

/// Load rules from `path`, degrading to defaults on any failure.
///
/// Never fails the caller: a missing file is expected and silent, a
/// corrupt one is logged at `warn`.
pub fn load_rules(path: &Path) -> EvolutionRules {
    if !path.exists() {
        debug!(path = %path.display(), "rules file not found, using defaults");
        return EvolutionRules::default();
    }
    match EvolutionRules::from_file(path) {
        Ok(rules) => rules,
        Err(e) => {
            warn!(error = %e, "error reading evolution rules, using defaults");
            EvolutionRules::default()
        }
    }
}

/// Where the engine obtains its rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    /// Re-read from a JSON file on every operation.
    File(PathBuf),
    /// A fixed rule set (tests, embedders).
    Fixed(EvolutionRules),
}

impl RulesSource {
    /// Resolve the rules for one operation.
    pub fn load(&self) -> EvolutionRules {
        match self {
            Self::File(path) => load_rules(path),
            Self::Fixed(rules) => rules.clone(),
        }
    }
}

impl Default for RulesSource {
    fn default() -> Self {
        Self::File(PathBuf::from(DEFAULT_RULES_PATH))
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_base_price() -> Decimal {
    Decimal::from_parts(5, 0, 0, false, 3)
}

const fn default_generation_bonus() -> Decimal {
    Decimal::from_parts(1, 0, 0, false, 3)
}

const fn default_scarcity_bonus() -> Decimal {
    Decimal::from_parts(2, 0, 0, false, 3)
}

const fn default_demand_bonus() -> Decimal {
    Decimal::from_parts(3, 0, 0, false, 3)
}

const fn default_sales_threshold_multiplier() -> Decimal {
    Decimal::from_parts(3, 0, 0, false, 0)
}

fn default_themes() -> BTreeMap<u32, String> {
    [
        (2, "neon cityscape"),
        (3, "organic flow"),
        (4, "fractal universe"),
        (5, "minimalist zen"),
        (6, "quantum fields"),
        (7, "ancient futures"),
        (8, "void whispers"),
        (9, "crystalline dreams"),
        (10, "infinite recursion"),
    ]
    .into_iter()
    .map(|(generation, theme)| (generation, theme.to_owned()))
    .collect()
}

/// Read the theme-unlock table, skipping entries that do not fit.
///
/// A value that is not an object at all leaves the built-in table in place.
fn deserialize_themes<'de, D>(deserializer: D) -> Result<BTreeMap<u32, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        warn!("rules themes is not an object, using built-in theme table");
        return Ok(default_themes());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match (key.trim().parse::<u32>(), value) {
            (Ok(generation), Value::String(theme)) => Some((generation, theme)),
            (_, value) => {
                warn!(key = %key, value = %value, "ignoring malformed theme-unlock entry");
                None
            }
        })
        .collect())
}

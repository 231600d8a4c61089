//! Loading and saving the evolution state record.
//!
//! The stored record is read as a JSON object and each field is extracted
//! on its own into a [`PersistedState`], then merged onto the genesis state.
//! A field that is missing, `null`, or malformed falls back to its default
//! without affecting the others; malformed fields are logged at `warn`.
//! Default-fill rules:
//!
//! | Field | Missing, `null`, or malformed | Normalization |
//! |---|---|---|
//! | `generation` | latest generation in the history, else 1 | 0 becomes 1; above `u32::MAX` saturates |
//! | `complexity_boost` | 1 | clamped to 1..=10 |
//! | `color_palette` | `vibrant` | -- |
//! | `element_variety` | 3 | clamped to 3..=8 |
//! | `themes_unlocked` | seed themes | non-string entries and duplicates dropped, empty list becomes seed themes |
//! | `total_proceeds` | `"0"` | a bare number is kept as its text |
//! | `total_minted`, `total_sold` | 0 | numeric strings accepted |
//! | `last_evolved` | load time | a bare `YYYY-MM-DD` date means midnight UTC |
//! | `evolution_history` | empty | malformed entries dropped, the rest kept in order |
//!
//! Counters also accept numeric strings. Unknown fields are ignored. Only a
//! record that is unreadable, not JSON, or not a JSON object is replaced
//! by the genesis state; the read path never fails. Saving, by contrast,
//! propagates every failure.

use std::fmt::Display;

use atelier_types::{
    ColorPalette, EvolutionEvent, EvolutionState, MAX_COMPLEXITY_BOOST, MAX_ELEMENT_VARIETY,
    MIN_COMPLEXITY_BOOST, MIN_ELEMENT_VARIETY,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::EvolutionError;
use crate::store::StateStore;

/// A stored state record as found on disk, before default-fill.
///
/// Deserializes from any JSON object; fields that are absent or cannot be
/// read are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct PersistedState {
    /// Stored generation.
    pub generation: Option<u32>,
    /// Stored complexity boost.
    pub complexity_boost: Option<u32>,
    /// Stored palette.
    pub color_palette: Option<ColorPalette>,
    /// Stored element variety.
    pub element_variety: Option<u32>,
    /// Stored theme list.
    pub themes_unlocked: Option<Vec<String>>,
    /// Stored proceeds string.
    pub total_proceeds: Option<String>,
    /// Stored minted counter.
    pub total_minted: Option<u64>,
    /// Stored sold counter.
    pub total_sold: Option<u64>,
    /// Stored last-evolution time.
    pub last_evolved: Option<DateTime<Utc>>,
    /// Stored audit trail.
    pub evolution_history: Option<Vec<EvolutionEvent>>,
}

impl From<Map<String, Value>> for PersistedState {
    fn from(mut record: Map<String, Value>) -> Self {
        Self {
            generation: take_counter(&mut record, "generation").map(saturate_u32),
            complexity_boost: take_counter(&mut record, "complexity_boost").map(saturate_u32),
            color_palette: take_field(&mut record, "color_palette"),
            element_variety: take_counter(&mut record, "element_variety").map(saturate_u32),
            themes_unlocked: take_list(&mut record, "themes_unlocked"),
            total_proceeds: take_proceeds(&mut record, "total_proceeds"),
            total_minted: take_counter(&mut record, "total_minted"),
            total_sold: take_counter(&mut record, "total_sold"),
            last_evolved: take_timestamp(&mut record, "last_evolved"),
            evolution_history: take_list(&mut record, "evolution_history"),
        }
    }
}

impl PersistedState {
    /// Merge this record onto `defaults`, applying the default-fill and
    /// normalization rules from the module documentation.
    pub fn merge_onto(self, defaults: EvolutionState) -> EvolutionState {
        let recorded_generation = self
            .evolution_history
            .as_ref()
            .and_then(|history| history.iter().map(|event| event.generation).max());
        let themes_unlocked = self
            .themes_unlocked
            .map(dedup_preserving_order)
            .filter(|themes| !themes.is_empty())
            .unwrap_or(defaults.themes_unlocked);

        EvolutionState {
            generation: self
                .generation
                .or(recorded_generation)
                .unwrap_or(defaults.generation)
                .max(1),
            complexity_boost: self
                .complexity_boost
                .unwrap_or(defaults.complexity_boost)
                .clamp(MIN_COMPLEXITY_BOOST, MAX_COMPLEXITY_BOOST),
            color_palette: self.color_palette.unwrap_or(defaults.color_palette),
            element_variety: self
                .element_variety
                .unwrap_or(defaults.element_variety)
                .clamp(MIN_ELEMENT_VARIETY, MAX_ELEMENT_VARIETY),
            themes_unlocked,
            total_proceeds: self.total_proceeds.unwrap_or(defaults.total_proceeds),
            total_minted: self.total_minted.unwrap_or(defaults.total_minted),
            total_sold: self.total_sold.unwrap_or(defaults.total_sold),
            last_evolved: self.last_evolved.unwrap_or(defaults.last_evolved),
            evolution_history: self
                .evolution_history
                .unwrap_or(defaults.evolution_history),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-field extraction
// ---------------------------------------------------------------------------

/// Remove `key` from the record, treating `null` as absent.
fn take(record: &mut Map<String, Value>, key: &str) -> Option<Value> {
    record.remove(key).filter(|value| !value.is_null())
}

fn reject<T>(key: &str, value: &Value, reason: &dyn Display) -> Option<T> {
    warn!(
        field = key,
        value = %value,
        error = %reason,
        "malformed evolution state field, using default"
    );
    None
}

fn take_field<T: DeserializeOwned>(record: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = take(record, key)?;
    match T::deserialize(&value) {
        Ok(parsed) => Some(parsed),
        Err(e) => reject(key, &value, &e),
    }
}

fn take_counter(record: &mut Map<String, Value>, key: &str) -> Option<u64> {
    let value = take(record, key)?;
    let parsed = match &value {
        Value::String(text) => text.trim().parse::<u64>().ok(),
        other => other.as_u64(),
    };
    parsed.or_else(|| reject(key, &value, &"expected a non-negative integer"))
}

fn take_proceeds(record: &mut Map<String, Value>, key: &str) -> Option<String> {
    match take(record, key)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        other => reject(key, &other, &"expected a decimal string"),
    }
}

fn take_timestamp(record: &mut Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let value = take(record, key)?;
    let parsed = value.as_str().and_then(|text| {
        DateTime::parse_from_rfc3339(text)
            .map(|timestamp| timestamp.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .map(|midnight| midnight.and_utc())
            })
    });
    parsed.or_else(|| reject(key, &value, &"expected an RFC 3339 timestamp or a date"))
}

/// Extract a list, dropping entries that do not parse.
fn take_list<T: DeserializeOwned>(record: &mut Map<String, Value>, key: &str) -> Option<Vec<T>> {
    match take(record, key)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .enumerate()
                .filter_map(|(index, item)| match T::deserialize(&item) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        warn!(
                            field = key,
                            index,
                            error = %e,
                            "malformed evolution state list entry dropped"
                        );
                        None
                    }
                })
                .collect(),
        ),
        other => reject(key, &other, &"expected a list"),
    }
}

fn saturate_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn dedup_preserving_order(themes: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(themes.len());
    for theme in themes {
        if !unique.contains(&theme) {
            unique.push(theme);
        }
    }
    unique
}

/// Parse a stored record and fill it against the genesis state at `now`.
pub fn parse_state(contents: &str, now: DateTime<Utc>) -> Result<EvolutionState, serde_json::Error> {
    let persisted: PersistedState = serde_json::from_str(contents)?;
    Ok(persisted.merge_onto(EvolutionState::genesis(now)))
}

/// Load the state from `store`, falling back to the genesis state when
/// nothing is stored or the record cannot be read.
///
/// The returned value is fully owned; mutating it never touches the
/// stored record until it is passed to [`save_state`].
pub fn load_state<S: StateStore + ?Sized>(store: &S) -> EvolutionState {
    let now = Utc::now();
    match store.read() {
        Ok(Some(contents)) => match parse_state(&contents, now) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    location = %store.location(),
                    error = %e,
                    "error parsing evolution state, using defaults"
                );
                EvolutionState::genesis(now)
            }
        },
        Ok(None) => {
            debug!(location = %store.location(), "no evolution state stored, using defaults");
            EvolutionState::genesis(now)
        }
        Err(e) => {
            warn!(
                location = %store.location(),
                error = %e,
                "error reading evolution state, using defaults"
            );
            EvolutionState::genesis(now)
        }
    }
}

/// Serialize `state` as pretty-printed JSON and persist it in full.
///
/// # Errors
///
/// Returns [`EvolutionError::Serialize`] if the state cannot be encoded,
/// or [`EvolutionError::Persistence`] if the store rejects the write.
pub fn save_state<S: StateStore + ?Sized>(
    store: &S,
    state: &EvolutionState,
) -> Result<(), EvolutionError> {
    let contents = serde_json::to_string_pretty(state)?;
    store
        .write(&contents)
        .map_err(|source| EvolutionError::Persistence {
            location: store.location(),
            source,
        })?;
    debug!(
        location = %store.location(),
        generation = state.generation,
        "evolution state saved"
    );
    Ok(())
}

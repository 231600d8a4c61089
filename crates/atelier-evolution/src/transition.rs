//! The evolution transition.
//!
//! One call advances the agent by exactly one generation:
//!
//! 1. `generation += 1`
//! 2. `complexity_boost = min(10, complexity_boost + 1)`
//! 3. `color_palette = PALETTE_CYCLE[generation mod 4]`
//! 4. `element_variety = min(8, element_variety + 1)`
//! 5. unlock the rules' theme for the new generation, unless already held
//! 6. append an [`EvolutionEvent`], stamp `last_evolved`, store proceeds
//!
//! The next generation always comes from the state's own counter. The
//! caller's generation hint in [`EvolutionInput`] is logged and otherwise
//! ignored, so a caller that has drifted cannot skip or repeat a
//! generation.

use atelier_types::{
    ColorPalette, EvolutionEvent, EvolutionResult, EvolutionState, MAX_COMPLEXITY_BOOST,
    MAX_ELEMENT_VARIETY,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EvolutionError;
use crate::rules::EvolutionRules;

/// Caller-supplied arguments for one evolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionInput {
    /// Cumulative proceeds, stored verbatim as `total_proceeds`.
    pub proceeds: String,
    /// The generation the caller believes is current. Not consulted.
    pub generation: u32,
    /// Free-text reason recorded in the history.
    pub trigger: String,
}

impl EvolutionInput {
    /// Bundle the three caller arguments.
    pub fn new(proceeds: impl Into<String>, generation: u32, trigger: impl Into<String>) -> Self {
        Self {
            proceeds: proceeds.into(),
            generation,
            trigger: trigger.into(),
        }
    }
}

/// Apply one evolution to `state` in place.
///
/// `state` is modified only on success. Persisting it is the caller's job.
///
/// # Errors
///
/// Returns [`EvolutionError::ArithmeticOverflow`] if the generation counter
/// is already at `u32::MAX`.
pub fn apply_evolution(
    state: &mut EvolutionState,
    rules: &EvolutionRules,
    input: &EvolutionInput,
    now: DateTime<Utc>,
) -> Result<EvolutionResult, EvolutionError> {
    let previous_generation = state.generation;
    let new_generation =
        previous_generation
            .checked_add(1)
            .ok_or_else(|| EvolutionError::ArithmeticOverflow {
                context: String::from("generation increment overflow"),
            })?;

    info!(
        generation = previous_generation,
        trigger = %input.trigger,
        proceeds = %input.proceeds,
        "evolution triggered"
    );
    if input.generation != previous_generation {
        debug!(
            claimed = input.generation,
            stored = previous_generation,
            "caller generation differs from stored generation; using stored"
        );
    }

    let mut improvements = Vec::with_capacity(4);
    let mut new_abilities = Vec::new();

    state.generation = new_generation;
    improvements.push(format!("Generation {previous_generation} → {new_generation}"));

    state.complexity_boost = state
        .complexity_boost
        .saturating_add(1)
        .min(MAX_COMPLEXITY_BOOST);
    improvements.push(format!("Complexity boost: {}", state.complexity_boost));

    state.color_palette = ColorPalette::for_generation(new_generation);
    improvements.push(format!("New color palette: {}", state.color_palette));

    state.element_variety = state
        .element_variety
        .saturating_add(1)
        .min(MAX_ELEMENT_VARIETY);
    improvements.push(format!("Element variety: {}", state.element_variety));

    if let Some(theme) = rules
        .theme_for(new_generation)
        .filter(|theme| !state.has_theme(theme))
    {
        state.themes_unlocked.push(theme.to_owned());
        new_abilities.push(format!("New theme unlocked: \"{theme}\""));
    }

    state.evolution_history.push(EvolutionEvent {
        generation: new_generation,
        timestamp: now,
        trigger: input.trigger.clone(),
        improvements: improvements.clone(),
    });
    state.last_evolved = now;
    state.total_proceeds.clone_from(&input.proceeds);

    Ok(EvolutionResult {
        previous_generation,
        new_generation,
        improvements,
        new_abilities,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn input() -> EvolutionInput {
        EvolutionInput::new("0.05", 1, "sales milestone")
    }

    #[test]
    fn first_evolution_from_genesis() {
        let mut state = EvolutionState::default();
        let now = Utc::now();
        let result = apply_evolution(&mut state, &EvolutionRules::default(), &input(), now);
        assert!(result.is_ok());

        if let Ok(result) = result {
            assert_eq!(result.previous_generation, 1);
            assert_eq!(result.new_generation, 2);
            assert_eq!(
                result.improvements,
                vec![
                    "Generation 1 → 2",
                    "Complexity boost: 2",
                    "New color palette: warm",
                    "Element variety: 4",
                ]
            );
            assert_eq!(
                result.new_abilities,
                vec!["New theme unlocked: \"neon cityscape\""]
            );
        }

        assert_eq!(state.generation, 2);
        assert_eq!(state.complexity_boost, 2);
        assert_eq!(state.color_palette, ColorPalette::Warm);
        assert_eq!(state.element_variety, 4);
        assert_eq!(state.themes_unlocked.len(), 5);
        assert_eq!(state.total_proceeds, "0.05");
        assert_eq!(state.last_evolved, now);
        assert_eq!(state.evolution_history.len(), 1);
    }

    #[test]
    fn history_entry_records_trigger_and_improvements() {
        let mut state = EvolutionState::default();
        let now = Utc::now();
        let result = apply_evolution(&mut state, &EvolutionRules::default(), &input(), now);

        let entry = state.evolution_history.first();
        assert!(entry.is_some());
        if let (Some(entry), Ok(result)) = (entry, result) {
            assert_eq!(entry.generation, 2);
            assert_eq!(entry.timestamp, now);
            assert_eq!(entry.trigger, "sales milestone");
            assert_eq!(entry.improvements, result.improvements);
        }
    }

    #[test]
    fn caller_generation_hint_is_ignored() {
        let mut state = EvolutionState {
            generation: 5,
            ..EvolutionState::default()
        };
        let drifted = EvolutionInput::new("1.0", 42, "drifted caller");
        let result = apply_evolution(&mut state, &EvolutionRules::default(), &drifted, Utc::now());

        assert!(result.is_ok());
        if let Ok(result) = result {
            assert_eq!(result.previous_generation, 5);
            assert_eq!(result.new_generation, 6);
        }
        assert_eq!(state.generation, 6);
    }

    #[test]
    fn parameters_stop_at_caps() {
        let mut state = EvolutionState {
            generation: 9,
            complexity_boost: 10,
            element_variety: 8,
            ..EvolutionState::default()
        };
        let result = apply_evolution(&mut state, &EvolutionRules::default(), &input(), Utc::now());

        assert!(result.is_ok());
        assert_eq!(state.complexity_boost, 10);
        assert_eq!(state.element_variety, 8);
        if let Ok(result) = result {
            assert!(result.improvements.contains(&String::from("Complexity boost: 10")));
            assert!(result.improvements.contains(&String::from("Element variety: 8")));
        }
    }

    #[test]
    fn already_unlocked_theme_is_not_added_again() {
        let mut state = EvolutionState::default();
        state.themes_unlocked.push(String::from("neon cityscape"));

        let result = apply_evolution(&mut state, &EvolutionRules::default(), &input(), Utc::now());

        assert!(result.is_ok());
        if let Ok(result) = result {
            assert!(result.new_abilities.is_empty());
        }
        assert_eq!(state.themes_unlocked.len(), 5);
    }

    #[test]
    fn generation_without_table_entry_unlocks_nothing() {
        let mut state = EvolutionState {
            generation: 10,
            ..EvolutionState::default()
        };
        let result = apply_evolution(&mut state, &EvolutionRules::default(), &input(), Utc::now());

        assert!(result.is_ok());
        if let Ok(result) = result {
            assert_eq!(result.new_generation, 11);
            assert!(result.new_abilities.is_empty());
        }
        assert_eq!(state.themes_unlocked.len(), 4);
    }

    #[test]
    fn duplicate_theme_names_in_table_unlock_once() {
        let mut themes = BTreeMap::new();
        themes.insert(2, String::from("echo"));
        themes.insert(3, String::from("echo"));
        let rules = EvolutionRules {
            themes,
            ..EvolutionRules::default()
        };

        let mut state = EvolutionState::default();
        let first = apply_evolution(&mut state, &rules, &input(), Utc::now());
        let second = apply_evolution(&mut state, &rules, &input(), Utc::now());

        assert!(first.is_ok_and(|r| r.new_abilities.len() == 1));
        assert!(second.is_ok_and(|r| r.new_abilities.is_empty()));
        assert_eq!(state.themes_unlocked.iter().filter(|t| *t == "echo").count(), 1);
    }

    #[test]
    fn generation_overflow_is_an_error_and_leaves_state_untouched() {
        let mut state = EvolutionState {
            generation: u32::MAX,
            ..EvolutionState::default()
        };
        let before = state.clone();
        let result = apply_evolution(&mut state, &EvolutionRules::default(), &input(), Utc::now());

        assert!(matches!(
            result,
            Err(EvolutionError::ArithmeticOverflow { .. })
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn palette_depends_only_on_generation() {
        let mut from_warm = EvolutionState {
            generation: 4,
            color_palette: ColorPalette::Warm,
            ..EvolutionState::default()
        };
        let mut from_cool = EvolutionState {
            generation: 4,
            color_palette: ColorPalette::Cool,
            ..EvolutionState::default()
        };
        let rules = EvolutionRules::default();
        assert!(apply_evolution(&mut from_warm, &rules, &input(), Utc::now()).is_ok());
        assert!(apply_evolution(&mut from_cool, &rules, &input(), Utc::now()).is_ok());

        assert_eq!(from_warm.color_palette, ColorPalette::Cool);
        assert_eq!(from_cool.color_palette, ColorPalette::Cool);
    }
}

//! The [`EvolutionEngine`] facade.
//!
//! Each operation performs at most one load → compute → save cycle against
//! the configured [`StateStore`]. Rules are resolved once per operation
//! from the [`RulesSource`].
//!
//! The engine assumes one invocation at a time per state record. Two
//! processes sharing a state file can interleave their load-modify-save
//! cycles; callers that need that must serialize access themselves.

use std::path::PathBuf;

use atelier_types::{EvolutionResult, EvolutionState};
use chrono::Utc;
use rand::Rng;
use tracing::info;

use crate::error::EvolutionError;
use crate::pricing;
use crate::rules::{EvolutionRules, RulesSource};
use crate::state;
use crate::store::{FileStateStore, StateStore};
use crate::theme;
use crate::transition::{self, EvolutionInput};
use crate::trigger;

/// Drives evolution for one agent's state record.
#[derive(Debug)]
pub struct EvolutionEngine<S> {
    store: S,
    rules: RulesSource,
}

impl<S: StateStore> EvolutionEngine<S> {
    /// Create an engine over `store` with rules from `rules`.
    pub const fn new(store: S, rules: RulesSource) -> Self {
        Self { store, rules }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The current state, or the genesis state if none is stored or the
    /// stored record is unreadable. Never fails.
    pub fn load_state(&self) -> EvolutionState {
        state::load_state(&self.store)
    }

    /// Persist `state` in full.
    ///
    /// # Errors
    ///
    /// Propagates serialization and storage failures.
    pub fn save_state(&self, state: &EvolutionState) -> Result<(), EvolutionError> {
        state::save_state(&self.store, state)
    }

    /// The rules for this invocation. Never fails.
    pub fn load_rules(&self) -> EvolutionRules {
        self.rules.load()
    }

    /// Overwrite the caller-reported sales bookkeeping without evolving.
    ///
    /// Generation and production parameters are left as stored.
    ///
    /// # Errors
    ///
    /// Propagates persistence failures.
    pub fn update_stats(&self, minted: u64, sold: u64, proceeds: &str) -> Result<(), EvolutionError> {
        let mut state = self.load_state();
        state.total_minted = minted;
        state.total_sold = sold;
        proceeds.clone_into(&mut state.total_proceeds);
        self.save_state(&state)?;
        info!(minted, sold, proceeds, "sales stats updated");
        Ok(())
    }

    /// Whether `total_sold` cumulative sales warrant an evolution.
    pub fn should_evolve(&self, total_sold: u64) -> bool {
        let state = self.load_state();
        let rules = self.load_rules();
        trigger::should_evolve(&state, &rules, total_sold)
    }

    /// Advance the agent one generation and persist the result.
    ///
    /// Does not consult [`EvolutionEngine::should_evolve`]; callers decide
    /// when to evolve. The result is returned only once the new state has
    /// been saved.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::Persistence`] or
    /// [`EvolutionError::Serialize`] if the new state cannot be saved, and
    /// [`EvolutionError::ArithmeticOverflow`] if the generation counter is
    /// exhausted.
    pub fn evolve(&self, input: &EvolutionInput) -> Result<EvolutionResult, EvolutionError> {
        let mut state = self.load_state();
        let rules = self.load_rules();
        let result = transition::apply_evolution(&mut state, &rules, input, Utc::now())?;

        self.save_state(&state)?;

        info!(
            new_generation = result.new_generation,
            improvements = ?result.improvements,
            new_abilities = ?result.new_abilities,
            "evolution complete"
        );
        Ok(result)
    }

    /// Pick one unlocked theme using `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::EmptyThemes`] if the state has no themes.
    pub fn select_theme<R: Rng>(&self, rng: &mut R) -> Result<String, EvolutionError> {
        theme::select_theme(&self.load_state(), rng)
    }

    /// The current list price with four decimal places.
    pub fn calculate_list_price(&self) -> String {
        pricing::list_price_string(&self.load_state(), &self.load_rules())
    }
}

impl EvolutionEngine<FileStateStore> {
    /// Create an engine over the state file at `state_path` with rules from
    /// the JSON file at `rules_path`.
    pub fn from_paths(state_path: impl Into<PathBuf>, rules_path: impl Into<PathBuf>) -> Self {
        Self::new(
            FileStateStore::new(state_path),
            RulesSource::File(rules_path.into()),
        )
    }
}

impl Default for EvolutionEngine<FileStateStore> {
    fn default() -> Self {
        Self::new(FileStateStore::default(), RulesSource::default())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::store::MemoryStateStore;

    fn engine() -> EvolutionEngine<MemoryStateStore> {
        EvolutionEngine::new(
            MemoryStateStore::new(),
            RulesSource::Fixed(EvolutionRules::default()),
        )
    }

    #[test]
    fn update_stats_touches_only_bookkeeping() {
        let engine = engine();
        assert!(engine.update_stats(10, 6, "0.05").is_ok());

        let state = engine.load_state();
        assert_eq!(state.total_minted, 10);
        assert_eq!(state.total_sold, 6);
        assert_eq!(state.total_proceeds, "0.05");
        assert_eq!(state.generation, 1);
        assert_eq!(state.complexity_boost, 1);
        assert!(state.evolution_history.is_empty());
    }

    #[test]
    fn update_stats_then_same_sales_does_not_trigger() {
        let engine = engine();
        assert!(engine.should_evolve(6));
        assert!(engine.update_stats(10, 6, "0.05").is_ok());
        assert!(!engine.should_evolve(6));
        assert!(engine.should_evolve(7));
    }

    #[test]
    fn evolve_persists_new_state() {
        let engine = engine();
        let result = engine.evolve(&EvolutionInput::new("0.05", 1, "sales milestone"));
        assert!(result.is_ok());

        let state = engine.load_state();
        assert_eq!(state.generation, 2);
        assert_eq!(state.evolution_history.len(), 1);
        assert_eq!(state.total_proceeds, "0.05");
        assert!(state.has_theme("neon cityscape"));
    }

    #[test]
    fn price_reflects_stored_state() {
        let engine = engine();
        assert_eq!(engine.calculate_list_price(), "0.0060");
        assert!(engine.evolve(&EvolutionInput::new("0", 1, "t")).is_ok());
        assert!(engine.evolve(&EvolutionInput::new("0", 2, "t")).is_ok());
        assert_eq!(engine.calculate_list_price(), "0.0080");
    }

    #[test]
    fn price_is_read_only() {
        let engine = engine();
        let _ = engine.calculate_list_price();
        assert!(engine.store().contents().is_none());
    }

    #[test]
    fn selected_theme_comes_from_stored_state() {
        let engine = engine();
        assert!(engine.evolve(&EvolutionInput::new("0", 1, "t")).is_ok());
        let state = engine.load_state();

        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..20 {
            assert!(
                engine
                    .select_theme(&mut rng)
                    .is_ok_and(|t| state.has_theme(&t))
            );
        }
    }

    #[test]
    fn failed_save_reports_error_not_result() {
        struct ReadOnlyStore;

        impl StateStore for ReadOnlyStore {
            fn read(&self) -> std::io::Result<Option<String>> {
                Ok(None)
            }

            fn write(&self, _contents: &str) -> std::io::Result<()> {
                Err(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "read-only",
                ))
            }

            fn location(&self) -> String {
                String::from("read-only")
            }
        }

        let engine = EvolutionEngine::new(
            ReadOnlyStore,
            RulesSource::Fixed(EvolutionRules::default()),
        );
        let result = engine.evolve(&EvolutionInput::new("1", 1, "t"));
        assert!(matches!(result, Err(EvolutionError::Persistence { .. })));
        assert!(engine.update_stats(1, 1, "1").is_err());
    }
}

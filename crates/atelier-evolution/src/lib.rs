//! Evolution engine for the Atelier evolving-artist agent.
//!
//! The agent produces artworks, the caller reports cumulative sales, and
//! when sales cross a milestone the agent evolves: its generation advances
//! by one and its production parameters (complexity, palette, element
//! variety, unlocked themes) step forward. This crate owns that state
//! machine and everything it persists. Rendering, uploading, and posting
//! artworks are collaborators outside this crate; they read the state and
//! report sales back through [`EvolutionEngine::update_stats`].
//!
//! # Modules
//!
//! - [`engine`] -- The [`EvolutionEngine`] facade used by callers
//! - [`error`] -- Error types ([`EvolutionError`], [`RulesError`])
//! - [`pricing`] -- List price derivation
//! - [`rules`] -- Tunable rules and their JSON file ([`EvolutionRules`])
//! - [`state`] -- State loading with default-fill, and saving
//! - [`store`] -- Storage backends ([`FileStateStore`], [`MemoryStateStore`])
//! - [`theme`] -- Random theme selection
//! - [`transition`] -- The one-generation transition
//! - [`trigger`] -- The sales-milestone trigger decision
//!
//! # Usage
//!
//! ```
//! use atelier_evolution::{EvolutionEngine, EvolutionInput, MemoryStateStore, RulesSource};
//!
//! let engine = EvolutionEngine::new(MemoryStateStore::new(), RulesSource::Fixed(Default::default()));
//!
//! if engine.should_evolve(6) {
//!     let result = engine.evolve(&EvolutionInput::new("0.05", 1, "sales milestone"));
//!     assert!(result.is_ok_and(|r| r.new_generation == 2));
//! }
//! assert_eq!(engine.calculate_list_price(), "0.0070");
//! ```

pub mod engine;
pub mod error;
pub mod pricing;
pub mod rules;
pub mod state;
pub mod store;
pub mod theme;
pub mod transition;
pub mod trigger;

// Re-export primary types at crate root for convenience.
pub use engine::EvolutionEngine;
pub use error::{EvolutionError, RulesError};
pub use pricing::{format_price, list_price, list_price_string};
pub use rules::{DEFAULT_RULES_PATH, EvolutionRules, RulesSource, load_rules};
pub use state::{PersistedState, load_state, parse_state, save_state};
pub use store::{DEFAULT_STATE_PATH, FileStateStore, MemoryStateStore, StateStore};
pub use theme::select_theme;
pub use transition::{EvolutionInput, apply_evolution};
pub use trigger::{sales_threshold, should_evolve};

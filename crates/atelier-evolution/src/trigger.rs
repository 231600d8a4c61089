//! The evolution trigger decision.
//!
//! The agent evolves once cumulative sales reach
//! `generation × sales_threshold_multiplier`, and only on a sales figure
//! strictly above the one already recorded, so repeating the same report
//! never re-triggers. The transition itself does not re-check this guard;
//! callers consult it first.

use atelier_types::EvolutionState;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::rules::EvolutionRules;

/// Sales needed before the agent at `state.generation` may evolve.
///
/// A fractional product is rounded up to whole sales, a negative one
/// counts as zero, and the result saturates at `u64::MAX`.
pub fn sales_threshold(state: &EvolutionState, rules: &EvolutionRules) -> u64 {
    Decimal::from(state.generation)
        .saturating_mul(rules.sales_threshold_multiplier)
        .ceil()
        .max(Decimal::ZERO)
        .to_u64()
        .unwrap_or(u64::MAX)
}

/// Whether a report of `total_sold` cumulative sales should trigger an
/// evolution.
pub fn should_evolve(state: &EvolutionState, rules: &EvolutionRules, total_sold: u64) -> bool {
    total_sold >= sales_threshold(state, rules) && total_sold > state.total_sold
}

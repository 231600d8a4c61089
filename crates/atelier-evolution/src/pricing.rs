//! List price derivation.
//!
//! ```text
//! price = base_price
//!       + generation * generation_bonus
//!       + (total_sold > 5  ? scarcity_bonus : 0)
//!       + (total_sold > 10 ? demand_bonus   : 0)
//! ```
//!
//! All arithmetic uses [`Decimal`]; the result is rendered with exactly
//! four decimal places.

use atelier_types::EvolutionState;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::rules::EvolutionRules;

/// Sales count above which the scarcity bonus applies.
pub const SCARCITY_SALES: u64 = 5;

/// Sales count above which the demand bonus applies.
pub const DEMAND_SALES: u64 = 10;

/// Decimal places in the rendered price.
pub const PRICE_DECIMALS: u32 = 4;

/// The list price for the current state, unrounded.
///
/// Saturates at [`Decimal::MAX`] if the coefficients are absurdly large.
pub fn list_price(state: &EvolutionState, rules: &EvolutionRules) -> Decimal {
    let generation_bonus = Decimal::from(state.generation).saturating_mul(rules.generation_bonus);
    let scarcity_bonus = if state.total_sold > SCARCITY_SALES {
        rules.scarcity_bonus
    } else {
        Decimal::ZERO
    };
    let demand_bonus = if state.total_sold > DEMAND_SALES {
        rules.demand_bonus
    } else {
        Decimal::ZERO
    };

    rules
        .base_price
        .saturating_add(generation_bonus)
        .saturating_add(scarcity_bonus)
        .saturating_add(demand_bonus)
}

/// Render a price with [`PRICE_DECIMALS`] places, rounding half away
/// from zero.
pub fn format_price(price: Decimal) -> String {
    let rounded =
        price.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.4}")
}

/// The list price for the current state, formatted for display.
pub fn list_price_string(state: &EvolutionState, rules: &EvolutionRules) -> String {
    format_price(list_price(state, rules))
}

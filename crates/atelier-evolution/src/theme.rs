//! Theme selection for the next artwork.
//!
//! Selection is uniform over the unlocked themes. The random source is a
//! parameter so tests can pass a seeded generator.

use atelier_types::EvolutionState;
use rand::Rng;

use crate::error::EvolutionError;

/// Pick one unlocked theme uniformly at random.
///
/// # Errors
///
/// Returns [`EvolutionError::EmptyThemes`] if no theme is unlocked. A
/// loaded state always carries at least the seed themes; this only
/// happens with a hand-built state.
pub fn select_theme<R: Rng>(
    state: &EvolutionState,
    rng: &mut R,
) -> Result<String, EvolutionError> {
    if state.themes_unlocked.is_empty() {
        return Err(EvolutionError::EmptyThemes);
    }
    let idx = rng.random_range(0..state.themes_unlocked.len());
    state
        .themes_unlocked
        .get(idx)
        .cloned()
        .ok_or(EvolutionError::EmptyThemes)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn selects_an_unlocked_theme() {
        let state = EvolutionState::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..50 {
            let theme = select_theme(&state, &mut rng);
            assert!(theme.is_ok_and(|t| state.has_theme(&t)));
        }
    }

    #[test]
    fn same_seed_gives_same_sequence() {
        let state = EvolutionState::default();
        let mut a = SmallRng::seed_from_u64(42);
        let mut b = SmallRng::seed_from_u64(42);
        for _ in 0..20 {
            assert_eq!(
                select_theme(&state, &mut a).ok(),
                select_theme(&state, &mut b).ok()
            );
        }
    }

    #[test]
    fn every_theme_is_reachable() {
        let state = EvolutionState::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let seen: BTreeSet<String> = (0..400)
            .filter_map(|_| select_theme(&state, &mut rng).ok())
            .collect();
        assert_eq!(seen.len(), state.themes_unlocked.len());
    }

    #[test]
    fn single_theme_is_always_chosen() {
        let state = EvolutionState {
            themes_unlocked: vec![String::from("void whispers")],
            ..EvolutionState::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(
            select_theme(&state, &mut rng).ok().as_deref(),
            Some("void whispers")
        );
    }

    #[test]
    fn empty_theme_list_is_an_error() {
        let state = EvolutionState {
            themes_unlocked: Vec::new(),
            ..EvolutionState::default()
        };
        let mut rng = SmallRng::seed_from_u64(3);
        assert!(matches!(
            select_theme(&state, &mut rng),
            Err(EvolutionError::EmptyThemes)
        ));
    }
}

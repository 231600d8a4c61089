//! Shared type definitions for the Atelier evolving-artist agent.
//!
//! This crate is the single source of truth for the data the evolution
//! engine persists and returns. It performs no I/O; the engine crate reads
//! and writes these types, and the CLI prints them.
//!
//! # Modules
//!
//! - [`enums`] -- Enumeration types ([`ColorPalette`])
//! - [`structs`] -- The persisted [`EvolutionState`], its history entries,
//!   and the [`EvolutionResult`] summary returned to callers

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ColorPalette, PALETTE_CYCLE};
pub use structs::{
    EvolutionEvent, EvolutionResult, EvolutionState, MAX_COMPLEXITY_BOOST, MAX_ELEMENT_VARIETY,
    MIN_COMPLEXITY_BOOST, MIN_ELEMENT_VARIETY, SEED_THEMES, seed_themes,
};

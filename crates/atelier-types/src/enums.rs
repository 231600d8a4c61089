//! Enumeration types for the Atelier agent.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual palette handed to the artwork renderer.
///
/// The palette rotates with every evolution. It is a pure function of the
/// generation number (see [`ColorPalette::for_generation`]), so two states
/// at the same generation always agree on the palette no matter how they
/// got there.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ColorPalette {
    /// Reds, oranges, and golds.
    Warm,
    /// Blues, teals, and violets.
    Cool,
    /// Saturated high-contrast colors. The genesis palette.
    #[default]
    Vibrant,
    /// Shades of a single hue.
    Monochrome,
}

/// Fixed rotation order, indexed by `generation mod 4`.
pub const PALETTE_CYCLE: [ColorPalette; 4] = [
    ColorPalette::Vibrant,
    ColorPalette::Cool,
    ColorPalette::Warm,
    ColorPalette::Monochrome,
];

impl ColorPalette {
    /// Palette for the given generation: `PALETTE_CYCLE[generation mod 4]`.
    pub const fn for_generation(generation: u32) -> Self {
        match generation.rem_euclid(4) {
            0 => Self::Vibrant,
            1 => Self::Cool,
            2 => Self::Warm,
            _ => Self::Monochrome,
        }
    }

    /// Lowercase name as stored in the state file.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Vibrant => "vibrant",
            Self::Monochrome => "monochrome",
        }
    }
}

impl fmt::Display for ColorPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

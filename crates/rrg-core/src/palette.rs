//! Series and quadrant colors

use serde::{Deserialize, Serialize};

use crate::quadrant::Quadrant;

/// Fixed cycle of series colors
pub const SERIES_COLORS: [&str; 15] = [
    "#e6194B", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4",
    "#f032e6", "#bcf60c", "#008080", "#e6beff", "#9A6324", "#800000",
    "#aaffc3", "#808000", "#000075",
];

/// How series colors are assigned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Index in the visible ordering; an entity's color shifts when others
    /// are toggled
    ByPosition,
    /// Hash of the entity id; independent of visibility
    #[default]
    StableHash,
}

impl std::str::FromStr for ColorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "position" | "by_position" => Ok(ColorMode::ByPosition),
            "stable_hash" | "hash" => Ok(ColorMode::StableHash),
            _ => Err(format!("Invalid color mode: {}", s)),
        }
    }
}

pub fn color_at(position: usize) -> &'static str {
    SERIES_COLORS[position % SERIES_COLORS.len()]
}

/// FNV-1a over the id bytes; stable across runs and platforms
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes.iter().fold(OFFSET, |hash, b| (hash ^ u64::from(*b)).wrapping_mul(PRIME))
}

pub fn color_for_id(entity_id: &str) -> &'static str {
    let slot = fnv1a(entity_id.as_bytes()) % SERIES_COLORS.len() as u64;
    SERIES_COLORS[slot as usize]
}

/// Color for an entity given its position in the visible ordering
pub fn color_of(entity_id: &str, position: usize, mode: ColorMode) -> &'static str {
    match mode {
        ColorMode::ByPosition => color_at(position),
        ColorMode::StableHash => color_for_id(entity_id),
    }
}

/// Background fill of a quadrant box
pub fn quadrant_fill(quadrant: Quadrant) -> &'static str {
    match quadrant {
        Quadrant::Leading => "rgba(204, 235, 204, 0.7)",
        Quadrant::Improving => "rgba(204, 229, 255, 0.7)",
        Quadrant::Lagging => "rgba(255, 204, 204, 0.7)",
        Quadrant::Weakening => "rgba(255, 255, 204, 0.7)",
    }
}

/// Text color of a quadrant label
pub fn quadrant_label_color(quadrant: Quadrant) -> &'static str {
    match quadrant {
        Quadrant::Leading => "green",
        Quadrant::Improving => "blue",
        Quadrant::Lagging => "red",
        Quadrant::Weakening => "#b45f06",
    }
}

/// Table indicator color for a quadrant
pub fn quadrant_indicator(quadrant: Option<Quadrant>) -> &'static str {
    match quadrant {
        Some(Quadrant::Leading) => "#4CAF50",
        Some(Quadrant::Improving) => "#2196F3",
        Some(Quadrant::Weakening) => "#FFC107",
        Some(Quadrant::Lagging) => "#F44336",
        None => "#777",
    }
}

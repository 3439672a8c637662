//! Quadrant Classification
//!
//! Classifies an entity's rotation state relative to the (100, 100) origin.

use serde::{Deserialize, Serialize};

use crate::types::NEUTRAL;

/// RRG quadrant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quadrant {
    /// Strong and gaining strength (ratio >= 100, momentum >= 100)
    Leading,
    /// Weak but gaining strength (ratio < 100, momentum >= 100)
    Improving,
    /// Weak and losing strength (ratio < 100, momentum < 100)
    Lagging,
    /// Strong but losing strength (ratio >= 100, momentum < 100)
    Weakening,
}

impl Quadrant {
    /// All quadrants in clockwise order starting top-right
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Leading,
        Quadrant::Weakening,
        Quadrant::Lagging,
        Quadrant::Improving,
    ];

    /// Classify a (rs_ratio, rs_momentum) pair. Exactly 100 counts as the
    /// strong side. Returns `None` for NaN/Infinity.
    pub fn classify(rs_ratio: f64, rs_momentum: f64) -> Option<Quadrant> {
        if !rs_ratio.is_finite() || !rs_momentum.is_finite() {
            return None;
        }

        let strong = rs_ratio >= NEUTRAL;
        let rising = rs_momentum >= NEUTRAL;

        Some(match (strong, rising) {
            (true, true) => Quadrant::Leading,
            (false, true) => Quadrant::Improving,
            (false, false) => Quadrant::Lagging,
            (true, false) => Quadrant::Weakening,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quadrant::Leading => "Leading",
            Quadrant::Improving => "Improving",
            Quadrant::Lagging => "Lagging",
            Quadrant::Weakening => "Weakening",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Quadrant::Leading => "Outperforming the benchmark with rising relative momentum",
            Quadrant::Improving => "Underperforming the benchmark but relative momentum is turning up",
            Quadrant::Lagging => "Underperforming the benchmark with falling relative momentum",
            Quadrant::Weakening => "Outperforming the benchmark but relative momentum is fading",
        }
    }

    /// Leading and Improving entities are long candidates
    pub fn is_long_candidate(&self) -> bool {
        matches!(self, Quadrant::Leading | Quadrant::Improving)
    }

    /// Weakening and Lagging entities are short candidates
    pub fn is_short_candidate(&self) -> bool {
        matches!(self, Quadrant::Weakening | Quadrant::Lagging)
    }
}

impl std::fmt::Display for Quadrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Quadrant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "leading" => Ok(Quadrant::Leading),
            "improving" => Ok(Quadrant::Improving),
            "lagging" => Ok(Quadrant::Lagging),
            "weakening" => Ok(Quadrant::Weakening),
            _ => Err(format!("Invalid quadrant: {}", s)),
        }
    }
}

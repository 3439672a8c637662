//! Quadrant boxes, labels and center lines for a display range

use serde::{Deserialize, Serialize};

use crate::palette::{quadrant_fill, quadrant_label_color};
use crate::quadrant::Quadrant;
use crate::range::DisplayRange;
use crate::types::NEUTRAL;

/// Inward pixel offset applied to quadrant labels
pub const LABEL_ADJUST_PX: f64 = 15.0;

/// Axis-aligned background box for one quadrant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub quadrant: Quadrant,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub fill: String,
}

impl Region {
    pub fn area(&self) -> f64 {
        (self.x_max - self.x_min) * (self.y_max - self.y_min)
    }

    /// True when the interiors of the two boxes intersect
    pub fn overlaps(&self, other: &Region) -> bool {
        self.x_min < other.x_max
            && other.x_min < self.x_max
            && self.y_min < other.y_max
            && other.y_min < self.y_max
    }
}

/// Quadrant label pinned to the outer corner of its quadrant.
///
/// `x`/`y` are data coordinates; `x_adjust`/`y_adjust` are pixel offsets in
/// screen convention (positive y moves down).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAnchor {
    pub quadrant: Quadrant,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub x_adjust: f64,
    pub y_adjust: f64,
    pub color: String,
}

/// Straight line segment in data coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadrantLayout {
    pub regions: Vec<Region>,
    pub labels: Vec<LabelAnchor>,
    /// Vertical line at x = 100 and horizontal line at y = 100
    pub center_lines: [Segment; 2],
}

impl QuadrantLayout {
    pub fn region(&self, quadrant: Quadrant) -> Option<&Region> {
        self.regions.iter().find(|r| r.quadrant == quadrant)
    }

    pub fn label(&self, quadrant: Quadrant) -> Option<&LabelAnchor> {
        self.labels.iter().find(|l| l.quadrant == quadrant)
    }
}

fn region(quadrant: Quadrant, range: &DisplayRange) -> Region {
    let (x_min, x_max) = match quadrant {
        Quadrant::Leading | Quadrant::Weakening => (NEUTRAL, range.x_max),
        Quadrant::Improving | Quadrant::Lagging => (range.x_min, NEUTRAL),
    };
    let (y_min, y_max) = match quadrant {
        Quadrant::Leading | Quadrant::Improving => (NEUTRAL, range.y_max),
        Quadrant::Lagging | Quadrant::Weakening => (range.y_min, NEUTRAL),
    };

    Region {
        quadrant,
        x_min,
        x_max,
        y_min,
        y_max,
        fill: quadrant_fill(quadrant).to_string(),
    }
}

fn label(quadrant: Quadrant, range: &DisplayRange) -> LabelAnchor {
    // Right-hand labels shift left, top labels shift down, and vice versa.
    let (x, x_adjust) = match quadrant {
        Quadrant::Leading | Quadrant::Weakening => (range.x_max, -LABEL_ADJUST_PX),
        Quadrant::Improving | Quadrant::Lagging => (range.x_min, LABEL_ADJUST_PX),
    };
    let (y, y_adjust) = match quadrant {
        Quadrant::Leading | Quadrant::Improving => (range.y_max, LABEL_ADJUST_PX),
        Quadrant::Lagging | Quadrant::Weakening => (range.y_min, -LABEL_ADJUST_PX),
    };

    LabelAnchor {
        quadrant,
        text: quadrant.as_str().to_string(),
        x,
        y,
        x_adjust,
        y_adjust,
        color: quadrant_label_color(quadrant).to_string(),
    }
}

/// Four quadrant boxes meeting at (100, 100) that tile `range` exactly, plus
/// their corner labels and the two center lines.
pub fn compute_quadrant_regions(range: &DisplayRange) -> QuadrantLayout {
    QuadrantLayout {
        regions: Quadrant::ALL.iter().map(|q| region(*q, range)).collect(),
        labels: Quadrant::ALL.iter().map(|q| label(*q, range)).collect(),
        center_lines: [
            Segment { x1: NEUTRAL, y1: range.y_min, x2: NEUTRAL, y2: range.y_max },
            Segment { x1: range.x_min, y1: NEUTRAL, x2: range.x_max, y2: NEUTRAL },
        ],
    }
}

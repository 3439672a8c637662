//! Symmetric Display Range
//!
//! Derives axis bounds centered on the neutral value from the full dataset,
//! so the scale stays put while scrubbing through dates.

use serde::{Deserialize, Serialize};

use crate::error::{RotationError, RotationResult};
use crate::types::{TimePoint, NEUTRAL};

/// Default padding as a fraction of the largest deviation
pub const DEFAULT_PADDING_FACTOR: f64 = 0.2;
/// Padding used when every deviation on an axis is zero
pub const DEFAULT_FALLBACK_PAD: f64 = 5.0;

/// Padding parameters for [`compute_display_range`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub padding_factor: f64,
    pub fallback_pad: f64,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            padding_factor: DEFAULT_PADDING_FACTOR,
            fallback_pad: DEFAULT_FALLBACK_PAD,
        }
    }
}

impl RangeConfig {
    pub fn validate(&self) -> RotationResult<()> {
        if !self.padding_factor.is_finite() || self.padding_factor < 0.0 {
            return Err(RotationError::InvalidConfig(format!(
                "padding factor must be finite and non-negative, got {}",
                self.padding_factor
            )));
        }
        if !self.fallback_pad.is_finite() || self.fallback_pad <= 0.0 {
            return Err(RotationError::InvalidConfig(format!(
                "fallback pad must be positive, got {}",
                self.fallback_pad
            )));
        }
        Ok(())
    }

    fn pad_for(&self, max_abs_dev: f64) -> f64 {
        let pad = max_abs_dev * self.padding_factor;
        if pad > 0.0 {
            pad
        } else {
            self.fallback_pad
        }
    }
}

/// Axis bounds, symmetric about 100 on each axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DisplayRange {
    fn symmetric(x_half: f64, y_half: f64) -> Self {
        Self {
            x_min: NEUTRAL - x_half,
            x_max: NEUTRAL + x_half,
            y_min: NEUTRAL - y_half,
            y_max: NEUTRAL + y_half,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}

/// Largest finite |value - 100| on each axis across every date and entity
pub fn max_abs_deviation(series: &[TimePoint]) -> (f64, f64) {
    series
        .iter()
        .flat_map(|tp| tp.entities.iter())
        .fold((0.0_f64, 0.0_f64), |(max_x, max_y), e| {
            let x = if e.rs_ratio.is_finite() {
                max_x.max((e.rs_ratio - NEUTRAL).abs())
            } else {
                max_x
            };
            let y = if e.rs_momentum.is_finite() {
                max_y.max((e.rs_momentum - NEUTRAL).abs())
            } else {
                max_y
            };
            (x, y)
        })
}

/// Compute the display range over the full series.
///
/// Non-finite values are ignored per axis. An empty series is reported as
/// [`RotationError::EmptyDataset`].
pub fn compute_display_range(series: &[TimePoint], config: &RangeConfig) -> RotationResult<DisplayRange> {
    if series.is_empty() {
        return Err(RotationError::EmptyDataset);
    }

    let (max_x, max_y) = max_abs_deviation(series);
    let range = DisplayRange::symmetric(max_x + config.pad_for(max_x), max_y + config.pad_for(max_y));

    tracing::debug!(
        max_abs_x = max_x,
        max_abs_y = max_y,
        "display range x=[{:.2}, {:.2}] y=[{:.2}, {:.2}]",
        range.x_min,
        range.x_max,
        range.y_min,
        range.y_max
    );

    Ok(range)
}

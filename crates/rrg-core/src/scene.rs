//! Scene Builder
//!
//! Combines the display range, quadrant layout and per-entity series into a
//! single immutable payload for a charting surface.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{RotationError, RotationResult};
use crate::layout::{compute_quadrant_regions, QuadrantLayout};
use crate::palette::{color_of, ColorMode};
use crate::quadrant::Quadrant;
use crate::range::{compute_display_range, DisplayRange, RangeConfig};
use crate::tail::{compute_tail, Tail};
use crate::types::{clamp_index, Point, TimePoint};

/// Rendering knobs that do not change between scrubs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneOptions {
    pub range: RangeConfig,
    pub color_mode: ColorMode,
}

/// Which entities get a series in the scene
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    All,
    Only(HashSet<String>),
}

impl Visibility {
    pub fn is_visible(&self, id: &str) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Only(ids) => ids.contains(id),
        }
    }
}

impl FromIterator<String> for Visibility {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Visibility::Only(iter.into_iter().collect())
    }
}

/// Current marker plus trailing line for one visible entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub id: String,
    pub name: String,
    pub color: String,
    pub quadrant: Option<Quadrant>,
    /// Current point; `None` when the current value is not finite
    pub marker: Option<Point>,
    pub tail: Tail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub date: NaiveDate,
    /// Effective (clamped) date index
    pub index: usize,
    pub tail_length: usize,
    pub range: DisplayRange,
    pub layout: QuadrantLayout,
    pub series: Vec<PlotSeries>,
}

impl Scene {
    pub fn series_for(&self, id: &str) -> Option<&PlotSeries> {
        self.series.iter().find(|s| s.id == id)
    }
}

/// Build the series for `at_index` using a range that was computed once for
/// the whole dataset.
pub fn build_scene_with_range(
    series: &[TimePoint],
    range: DisplayRange,
    at_index: usize,
    tail_length: usize,
    visible: &Visibility,
    color_mode: ColorMode,
) -> Option<Scene> {
    let index = clamp_index(at_index, series.len());
    let current = series.get(index)?;

    let plot_series: Vec<PlotSeries> = current
        .entities
        .iter()
        .filter(|e| visible.is_visible(&e.id))
        .enumerate()
        .map(|(position, entity)| PlotSeries {
            id: entity.id.clone(),
            name: entity.name.clone(),
            color: color_of(&entity.id, position, color_mode).to_string(),
            quadrant: entity.quadrant(),
            marker: entity.point().ok(),
            tail: compute_tail(series, &entity.id, index, tail_length),
        })
        .collect();

    tracing::debug!(
        date = %current.date,
        index,
        visible = plot_series.len(),
        total = current.entities.len(),
        "scene built"
    );

    Some(Scene {
        date: current.date,
        index,
        tail_length: tail_length.max(1),
        range,
        layout: compute_quadrant_regions(&range),
        series: plot_series,
    })
}

/// Build the full scene for the date at `at_index`.
///
/// The range covers every entity on every date regardless of `visible`. One
/// series is produced per visible entity present on the selected date, in
/// that date's entity order.
pub fn build_scene(
    series: &[TimePoint],
    at_index: usize,
    tail_length: usize,
    visible: &Visibility,
    options: &SceneOptions,
) -> RotationResult<Scene> {
    let range = compute_display_range(series, &options.range)?;
    build_scene_with_range(series, range, at_index, tail_length, visible, options.color_mode)
        .ok_or(RotationError::EmptyDataset)
}

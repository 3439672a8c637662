//! Table Projection
//!
//! Read-only views of one time point for the data table and the long/short
//! candidate lists.

use icu_collator::{Collator, CollatorOptions};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::quadrant::Quadrant;
use crate::types::{Entity, TimePoint};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    pub name: String,
    pub rs_ratio: f64,
    pub rs_momentum: f64,
    pub quadrant: Option<Quadrant>,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
}

impl From<&Entity> for TableRow {
    fn from(e: &Entity) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            rs_ratio: e.rs_ratio,
            rs_momentum: e.rs_momentum,
            quadrant: e.quadrant(),
            price: e.price,
            change_pct: e.change_pct,
        }
    }
}

impl TableRow {
    /// "Name (ID)" label used in the table's first column
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

/// Locale-aware name ordering (root collation) with the exact string as
/// tie-break.
///
/// Build once per sort; construction loads the collation tables.
pub struct NameCollator {
    collator: Option<Collator>,
}

impl NameCollator {
    pub fn new() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!("Root collator unavailable, falling back to case-folded order: {}", e);
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let primary = match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        };
        primary.then_with(|| a.cmp(b))
    }
}

impl Default for NameCollator {
    fn default() -> Self {
        Self::new()
    }
}

/// Rows for one date sorted by display name; ties keep input order.
pub fn project_table(time_point: &TimePoint) -> Vec<TableRow> {
    let collator = NameCollator::new();
    let mut rows: Vec<TableRow> = time_point.entities.iter().map(TableRow::from).collect();
    rows.sort_by(|a, b| collator.compare(&a.name, &b.name));
    rows
}

/// Long/short candidate lists derived from quadrants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidates {
    /// Leading and Improving, strongest momentum first
    pub long: Vec<TableRow>,
    /// Weakening and Lagging, weakest momentum first
    pub short: Vec<TableRow>,
}

pub fn candidates(time_point: &TimePoint) -> Candidates {
    let (mut long, mut short): (Vec<TableRow>, Vec<TableRow>) = time_point
        .entities
        .iter()
        .map(TableRow::from)
        .filter(|row| row.quadrant.is_some())
        .partition(|row| row.quadrant.is_some_and(|q| q.is_long_candidate()));

    long.sort_by(|a, b| b.rs_momentum.total_cmp(&a.rs_momentum));
    short.sort_by(|a, b| a.rs_momentum.total_cmp(&b.rs_momentum));

    Candidates { long, short }
}

//! Sector constituent performance
//!
//! Models and ordering for the per-sector constituent ranking view.

use serde::{Deserialize, Serialize};

/// Entry from `/sector_list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorInfo {
    pub ticker: String,
    pub name: String,
    #[serde(default)]
    pub has_constituents: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub change_pct: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Summary statistics as formatted by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstituentStats {
    #[serde(default)]
    pub avg_change: serde_json::Value,
    #[serde(default)]
    pub max_change: serde_json::Value,
    #[serde(default)]
    pub min_change: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentReport {
    pub sector_name: String,
    pub period: String,
    #[serde(default)]
    pub period_display: Option<String>,
    #[serde(default)]
    pub stats: ConstituentStats,
    #[serde(default)]
    pub constituents: Vec<Constituent>,
}

impl ConstituentReport {
    pub fn period_label(&self) -> &str {
        self.period_display.as_deref().unwrap_or(&self.period)
    }

    /// Constituents ordered for display
    pub fn sorted(&self, sort: ConstituentSort) -> Vec<Constituent> {
        let mut rows = self.constituents.clone();
        sort_constituents(&mut rows, sort);
        rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstituentSort {
    #[default]
    ChangeDesc,
    ChangeAsc,
    NameAsc,
}

impl std::str::FromStr for ConstituentSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "change_desc" => Ok(ConstituentSort::ChangeDesc),
            "change_asc" => Ok(ConstituentSort::ChangeAsc),
            "name_asc" => Ok(ConstituentSort::NameAsc),
            _ => Err(format!("Invalid sort: {}", s)),
        }
    }
}

pub fn sort_constituents(rows: &mut [Constituent], sort: ConstituentSort) {
    match sort {
        ConstituentSort::ChangeDesc => rows.sort_by(|a, b| b.change_pct.total_cmp(&a.change_pct)),
        ConstituentSort::ChangeAsc => rows.sort_by(|a, b| a.change_pct.total_cmp(&b.change_pct)),
        ConstituentSort::NameAsc => {
            let collator = crate::table::NameCollator::new();
            rows.sort_by(|a, b| collator.compare(&a.name, &b.name))
        }
    }
}

/// Bar color for a change percentage. Long periods get four buckets split at
/// +/-10%, short periods just up/down.
pub fn change_color(period: &str, change_pct: f64) -> &'static str {
    if matches!(period, "ytd" | "1y") {
        if change_pct >= 10.0 {
            "#00C851"
        } else if change_pct >= 0.0 {
            "#26A69A"
        } else if change_pct >= -10.0 {
            "#EF5350"
        } else {
            "#D32F2F"
        }
    } else if change_pct >= 0.0 {
        "#26A69A"
    } else {
        "#EF5350"
    }
}

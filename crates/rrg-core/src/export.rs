//! CSV / JSON export of a loaded dataset

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RotationError, RotationResult};
use crate::quadrant::Quadrant;
use crate::types::RotationDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!("Invalid export format: {}", s)),
        }
    }
}

/// One flattened (date, entity) row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub date: NaiveDate,
    pub benchmark: String,
    pub sector_name: String,
    pub sector_ticker: String,
    pub price: Option<f64>,
    pub change_pct: Option<f64>,
    pub rs_ratio: Option<f64>,
    pub rs_momentum: Option<f64>,
    pub quadrant: Option<Quadrant>,
    pub weekly_change_pct: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub export_date: DateTime<Utc>,
    pub benchmark: String,
    pub date_range: ExportDateRange,
    pub total_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub metadata: ExportMetadata,
    pub data: Vec<ExportRecord>,
}

fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Flatten every date of the dataset into export rows
pub fn export_records(dataset: &RotationDataset) -> Vec<ExportRecord> {
    dataset
        .points
        .iter()
        .flat_map(|tp| {
            tp.entities.iter().map(move |e| ExportRecord {
                date: tp.date,
                benchmark: dataset.benchmark.clone(),
                sector_name: e.name.clone(),
                sector_ticker: e.id.clone(),
                price: e.price,
                change_pct: e.change_pct,
                rs_ratio: finite(e.rs_ratio),
                rs_momentum: finite(e.rs_momentum),
                quadrant: e.quadrant(),
                weekly_change_pct: e.weekly_change_pct,
            })
        })
        .collect()
}

pub fn to_csv(records: &[ExportRecord]) -> RotationResult<String> {
    if records.is_empty() {
        return Err(RotationError::EmptyDataset);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|e| RotationError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| RotationError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| RotationError::Export(e.to_string()))
}

pub fn to_json(
    dataset: &RotationDataset,
    records: Vec<ExportRecord>,
    exported_at: DateTime<Utc>,
) -> RotationResult<String> {
    let document = ExportDocument {
        metadata: ExportMetadata {
            export_date: exported_at,
            benchmark: dataset.benchmark.clone(),
            date_range: ExportDateRange {
                start: dataset.first_date(),
                end: dataset.last_date(),
            },
            total_records: records.len(),
        },
        data: records,
    };

    serde_json::to_string_pretty(&document).map_err(|e| RotationError::Export(e.to_string()))
}

/// `sector_rrg_data_<benchmark>_<date>.<ext>`
pub fn export_file_name(benchmark: &str, date: NaiveDate, format: ExportFormat) -> String {
    format!(
        "sector_rrg_data_{}_{}.{}",
        benchmark,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

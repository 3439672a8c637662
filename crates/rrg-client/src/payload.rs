//! Calculate payload adapter
//!
//! The calculate endpoint has shipped two shapes over time:
//!
//! * a flat array of `{ date, points: [...] }` rows, and
//! * an object with `historical_data` keyed by date, a `date_range` ordering
//!   and the benchmark's own OHLC bars.
//!
//! Both are normalized here into a [`RotationDataset`]. Records that fail to
//! parse are logged and skipped; the rest of the payload is kept.

use chrono::NaiveDate;
use rrg_core::{Entity, OhlcBar, RotationDataset, TimePoint};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{ClientError, ClientResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct WireEntity {
    #[serde(alias = "symbol", alias = "ticker")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    rs_ratio: Option<f64>,
    #[serde(default)]
    rs_momentum: Option<f64>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    change_pct: Option<f64>,
    #[serde(default)]
    weekly_change_pct: Option<f64>,
}

impl From<WireEntity> for Entity {
    fn from(w: WireEntity) -> Self {
        Entity {
            name: w.name.unwrap_or_else(|| w.id.clone()),
            id: w.id,
            rs_ratio: w.rs_ratio.unwrap_or(f64::NAN),
            rs_momentum: w.rs_momentum.unwrap_or(f64::NAN),
            price: w.price,
            change_pct: w.change_pct,
            weekly_change_pct: w.weekly_change_pct,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FlatRow {
    date: NaiveDate,
    #[serde(alias = "sectors", alias = "entities")]
    points: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyedDay {
    #[serde(default)]
    sectors: Vec<Value>,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

fn parse_entities(date: NaiveDate, raw: Vec<Value>) -> Vec<Entity> {
    raw.into_iter()
        .filter_map(|v| match serde_json::from_value::<WireEntity>(v) {
            Ok(w) => Some(Entity::from(w)),
            Err(e) => {
                tracing::warn!(%date, "Skipping malformed entity: {}", e);
                None
            }
        })
        .collect()
}

fn normalize_rows(rows: Vec<Value>) -> Vec<TimePoint> {
    rows.into_iter()
        .filter_map(|v| match serde_json::from_value::<FlatRow>(v) {
            Ok(row) => Some(TimePoint::new(row.date, parse_entities(row.date, row.points))),
            Err(e) => {
                tracing::warn!("Skipping malformed row: {}", e);
                None
            }
        })
        .collect()
}

fn normalize_keyed(mut body: Map<String, Value>) -> ClientResult<(Vec<TimePoint>, Vec<OhlcBar>, Option<NaiveDate>)> {
    let mut historical = match body.remove("historical_data") {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            return Err(ClientError::InvalidPayload(format!(
                "historical_data must be an object, got {}",
                other
            )))
        }
    };

    // date_range gives the order; fall back to the map's own keys
    let order: Vec<String> = match body.remove("date_range") {
        Some(Value::Array(dates)) if !dates.is_empty() => dates
            .into_iter()
            .filter_map(|d| d.as_str().map(str::to_string))
            .collect(),
        _ => historical.keys().cloned().collect(),
    };

    let mut points = Vec::with_capacity(order.len());
    for raw_date in order {
        let Some(date) = parse_date(&raw_date) else {
            tracing::warn!("Skipping unparseable date {:?}", raw_date);
            continue;
        };
        let Some(day) = historical.remove(&raw_date) else {
            tracing::warn!(%date, "date_range entry missing from historical_data");
            continue;
        };
        match serde_json::from_value::<KeyedDay>(day) {
            Ok(day) => points.push(TimePoint::new(date, parse_entities(date, day.sectors))),
            Err(e) => tracing::warn!(%date, "Skipping malformed day: {}", e),
        }
    }

    let ohlc = match body.remove("benchmark_ohlc") {
        Some(Value::Array(bars)) => bars
            .into_iter()
            .filter_map(|v| match serde_json::from_value::<OhlcBar>(v) {
                Ok(bar) => Some(bar),
                Err(e) => {
                    tracing::warn!("Skipping malformed OHLC bar: {}", e);
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    };

    let target_date = body
        .get("target_date")
        .and_then(Value::as_str)
        .and_then(parse_date);

    Ok((points, ohlc, target_date))
}

/// Sort chronologically and drop repeated dates, keeping the first
fn finalize(mut points: Vec<TimePoint>) -> Vec<TimePoint> {
    points.sort_by_key(|p| p.date);
    let before = points.len();
    points.dedup_by_key(|p| p.date);
    if points.len() != before {
        tracing::warn!("Dropped {} duplicate dates", before - points.len());
    }
    points
}

/// Normalize a calculate response body of either shape
pub fn normalize(benchmark: &str, body: Value) -> ClientResult<RotationDataset> {
    let mut dataset = RotationDataset::new(benchmark, Vec::new());

    match body {
        Value::Array(rows) => {
            dataset.points = finalize(normalize_rows(rows));
        }
        Value::Object(map) if map.contains_key("historical_data") => {
            let (points, ohlc, target_date) = normalize_keyed(map)?;
            dataset.points = finalize(points);
            dataset.benchmark_ohlc = ohlc;
            dataset.target_date = target_date;
        }
        Value::Object(_) => {
            return Err(ClientError::InvalidPayload(
                "object payload without historical_data".to_string(),
            ))
        }
        other => {
            return Err(ClientError::InvalidPayload(format!(
                "expected array or object, got {}",
                other
            )))
        }
    }

    tracing::debug!(
        benchmark,
        dates = dataset.points.len(),
        ohlc = dataset.benchmark_ohlc.len(),
        "payload normalized"
    );

    Ok(dataset)
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RotationError, RotationResult};
use crate::quadrant::Quadrant;

/// Neutral value for both RS-Ratio and RS-Momentum
pub const NEUTRAL: f64 = 100.0;

/// A point on the RRG plane (x = RS-Ratio, y = RS-Momentum)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A ticker/sector snapshot at a given date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    /// JdK RS-Ratio, NaN when the upstream value was missing
    pub rs_ratio: f64,
    /// JdK RS-Momentum, NaN when the upstream value was missing
    pub rs_momentum: f64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change_pct: Option<f64>,
    #[serde(default)]
    pub weekly_change_pct: Option<f64>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, rs_ratio: f64, rs_momentum: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rs_ratio,
            rs_momentum,
            price: None,
            change_pct: None,
            weekly_change_pct: None,
        }
    }

    /// Plot coordinates, rejecting NaN/Infinity
    pub fn point(&self) -> RotationResult<Point> {
        let point = Point::new(self.rs_ratio, self.rs_momentum);
        if point.is_finite() {
            Ok(point)
        } else {
            Err(RotationError::NonFiniteValue {
                entity_id: self.id.clone(),
            })
        }
    }

    pub fn quadrant(&self) -> Option<Quadrant> {
        Quadrant::classify(self.rs_ratio, self.rs_momentum)
    }
}

/// One row of historical data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub entities: Vec<Entity>,
}

impl TimePoint {
    pub fn new(date: NaiveDate, entities: Vec<Entity>) -> Self {
        Self { date, entities }
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }
}

/// Daily OHLC bar of the benchmark itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Normalized result of one calculate request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationDataset {
    /// Benchmark the relative strength was computed against
    pub benchmark: String,
    /// Chronologically ordered, unique dates
    pub points: Vec<TimePoint>,
    #[serde(default)]
    pub benchmark_ohlc: Vec<OhlcBar>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
}

impl RotationDataset {
    pub fn new(benchmark: impl Into<String>, points: Vec<TimePoint>) -> Self {
        Self {
            benchmark: benchmark.into(),
            points,
            benchmark_ohlc: Vec::new(),
            target_date: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn latest_index(&self) -> Option<usize> {
        self.points.len().checked_sub(1)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }
}

/// Clamp a requested date index into `0..len`. `len` must be non-zero.
pub fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

/// Benchmark selector entry from `/api/tickers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: String,
    pub name: String,
}

impl TickerInfo {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.ticker)
    }
}

/// Pick the preferred benchmark if the server offers it, otherwise the first one
pub fn select_default_benchmark(tickers: &[TickerInfo], preferred: &str) -> Option<String> {
    tickers
        .iter()
        .find(|t| t.ticker == preferred)
        .or_else(|| tickers.first())
        .map(|t| t.ticker.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_point_rejects_nan() {
        let ok = Entity::new("A", "A", 101.0, 99.0);
        assert_eq!(ok.point().unwrap(), Point::new(101.0, 99.0));

        let bad = Entity::new("B", "B", f64::NAN, 99.0);
        assert_eq!(
            bad.point(),
            Err(RotationError::NonFiniteValue { entity_id: "B".to_string() })
        );
    }

    #[test]
    fn test_clamp_index() {
        assert_eq!(clamp_index(0, 3), 0);
        assert_eq!(clamp_index(2, 3), 2);
        assert_eq!(clamp_index(10, 3), 2);
    }

    #[test]
    fn test_select_default_benchmark() {
        let tickers = vec![
            TickerInfo { ticker: "1321.T".to_string(), name: "Nikkei 225 ETF".to_string() },
            TickerInfo { ticker: "1306.T".to_string(), name: "TOPIX ETF".to_string() },
        ];
        assert_eq!(select_default_benchmark(&tickers, "1306.T").as_deref(), Some("1306.T"));
        assert_eq!(select_default_benchmark(&tickers, "SPY").as_deref(), Some("1321.T"));
        assert_eq!(select_default_benchmark(&[], "1306.T"), None);
        assert_eq!(tickers[1].label(), "TOPIX ETF (1306.T)");
    }
}

use async_trait::async_trait;
use chrono::NaiveDate;
use rrg_core::{RotationDataset, RotationResult, TickerInfo};
use std::path::PathBuf;

use crate::payload;
use crate::RrgClient;

/// Anything that can produce a normalized dataset for a benchmark.
///
/// Implemented by the HTTP client and by a JSON file reader for offline use.
#[async_trait]
pub trait RotationSource: Send + Sync {
    async fn fetch(&self, benchmark: &str, date: Option<NaiveDate>) -> RotationResult<RotationDataset>;

    async fn benchmarks(&self) -> RotationResult<Vec<TickerInfo>>;

    fn source_name(&self) -> &'static str;
}

#[async_trait]
impl RotationSource for RrgClient {
    async fn fetch(&self, benchmark: &str, date: Option<NaiveDate>) -> RotationResult<RotationDataset> {
        Ok(self.calculate(benchmark, date).await?)
    }

    async fn benchmarks(&self) -> RotationResult<Vec<TickerInfo>> {
        Ok(self.tickers().await?)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

/// Reads a saved calculate response from disk
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RotationSource for JsonFileSource {
    async fn fetch(&self, benchmark: &str, _date: Option<NaiveDate>) -> RotationResult<RotationDataset> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(crate::ClientError::from)?;
        let body: serde_json::Value = serde_json::from_str(&raw).map_err(crate::ClientError::from)?;
        Ok(payload::normalize(benchmark, body)?)
    }

    /// Saved payloads carry no selector list
    async fn benchmarks(&self) -> RotationResult<Vec<TickerInfo>> {
        Ok(Vec::new())
    }

    fn source_name(&self) -> &'static str {
        "file"
    }
}

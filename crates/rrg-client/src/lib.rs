pub mod error;
pub mod payload;
pub mod source;

pub use error::{ClientError, ClientResult};
pub use source::{JsonFileSource, RotationSource};

use chrono::NaiveDate;
use rrg_core::{ConstituentReport, RotationDataset, SectorInfo, TickerInfo};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Configuration for the RRG data API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub tickers_path: String,
    pub calculate_path: String,
    pub sector_list_path: String,
    pub constituents_path: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            tickers_path: "/api/tickers".to_string(),
            calculate_path: "/api/calculate".to_string(),
            sector_list_path: "/sector_list".to_string(),
            constituents_path: "/constituents".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Read `RRG_API_URL`, `RRG_API_TIMEOUT_SECS` and the optional path
    /// overrides, falling back to defaults.
    pub fn from_env() -> ClientResult<Self> {
        let defaults = Self::default();
        let path = |key: &str, default: String| std::env::var(key).unwrap_or(default);

        let timeout_secs: u64 = match std::env::var("RRG_API_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .map_err(|_| ClientError::Config(format!("RRG_API_TIMEOUT_SECS is not a number: {}", v)))?,
            Err(_) => defaults.timeout.as_secs(),
        };

        Ok(Self {
            base_url: std::env::var("RRG_API_URL")
                .unwrap_or(defaults.base_url)
                .trim_end_matches('/')
                .to_string(),
            tickers_path: path("RRG_TICKERS_PATH", defaults.tickers_path),
            calculate_path: path("RRG_CALCULATE_PATH", defaults.calculate_path),
            sector_list_path: path("RRG_SECTOR_LIST_PATH", defaults.sector_list_path),
            constituents_path: path("RRG_CONSTITUENTS_PATH", defaults.constituents_path),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SectorListResponse {
    #[serde(default)]
    sectors: Vec<SectorInfo>,
}

/// Pull a human-readable message out of an error body (`{"detail": ...}`)
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => match map.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

/// Typed client for the RRG data API
#[derive(Clone)]
pub struct RrgClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl RrgClient {
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> ClientResult<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Value> {
        let url = format!("{}{}", self.config.base_url, path);
        tracing::debug!("GET {} {:?}", url, query);

        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail: error_detail(&body),
            });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Benchmarks offered by the server
    pub async fn tickers(&self) -> ClientResult<Vec<TickerInfo>> {
        let body = self.get_json(&self.config.tickers_path, &[]).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetch and normalize the full RRG history for a benchmark
    pub async fn calculate(&self, benchmark: &str, date: Option<NaiveDate>) -> ClientResult<RotationDataset> {
        let mut query = vec![("benchmark_ticker", benchmark.to_string())];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }

        let body = self.get_json(&self.config.calculate_path, &query).await?;
        let dataset = payload::normalize(benchmark, body)?;

        tracing::info!("Fetched {} dates for benchmark {}", dataset.len(), benchmark);
        Ok(dataset)
    }

    pub async fn sector_list(&self) -> ClientResult<Vec<SectorInfo>> {
        let body = self.get_json(&self.config.sector_list_path, &[]).await?;
        let response: SectorListResponse = serde_json::from_value(body)?;
        Ok(response.sectors)
    }

    pub async fn constituents(&self, sector_ticker: &str, period: &str) -> ClientResult<ConstituentReport> {
        let query = [
            ("sector_ticker", sector_ticker.to_string()),
            ("period", period.to_string()),
        ];
        let body = self.get_json(&self.config.constituents_path, &query).await?;
        Ok(serde_json::from_value(body)?)
    }
}

//! rrg-cli: Load an RRG dataset for a benchmark and print the scene.
//!
//! Usage:
//!   cargo run -p rrg-cli -- --list-tickers
//!   cargo run -p rrg-cli -- --benchmark 1306.T --tail 8
//!   cargo run -p rrg-cli -- --benchmark 1306.T --date 2024-03-01 --table --candidates
//!   cargo run -p rrg-cli -- --benchmark 1306.T --export csv --out ./exports
//!   cargo run -p rrg-cli -- --file saved.json --benchmark 1306.T
//!   cargo run -p rrg-cli -- --sectors
//!   cargo run -p rrg-cli -- --constituents 1631.T --period 1y --sort name_asc

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rrg_client::{JsonFileSource, RotationSource, RrgClient};
use rrg_core::palette::quadrant_indicator;
use rrg_core::{change_color, export_file_name, ConstituentSort, ExportFormat, Quadrant};
use rrg_view::{RotationController, RotationView, ViewConfig, ViewState};
use std::path::PathBuf;
use std::sync::Arc;

/// Value following `flag`; `None` when the flag is absent, an error when it
/// is present without a value.
fn arg_value<'a>(args: &'a [String], flag: &str) -> anyhow::Result<Option<&'a str>> {
    let Some(i) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    let value = args
        .get(i + 1)
        .map(|s| s.as_str())
        .filter(|v| !v.starts_with("--"))
        .with_context(|| format!("{} requires a value", flag))?;
    Ok(Some(value))
}

fn init_tracing() {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "rrg_cli=info,rrg_client=info,rrg_view=info".into())
    };

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    // logs go to stderr so stdout stays machine-readable
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let list_tickers = args.iter().any(|a| a == "--list-tickers");
    let show_table = args.iter().any(|a| a == "--table");
    let show_candidates = args.iter().any(|a| a == "--candidates");
    let list_sectors = args.iter().any(|a| a == "--sectors");

    if list_sectors || arg_value(&args, "--constituents")?.is_some() {
        return run_constituents(&args, list_sectors).await;
    }

    let config = ViewConfig::from_env().context("Invalid view configuration")?;

    let source: Arc<dyn RotationSource> = match arg_value(&args, "--file")? {
        Some(path) => Arc::new(JsonFileSource::new(path)),
        None => Arc::new(RrgClient::from_env().context("Failed to build API client")?),
    };
    tracing::info!("Using {} data source", source.source_name());

    if list_tickers {
        let tickers = source.benchmarks().await?;
        for t in &tickers {
            println!("{}", t.label());
        }
        return Ok(());
    }

    let date = arg_value(&args, "--date")?
        .map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d"))
        .transpose()
        .context("--date must be YYYY-MM-DD")?;
    let index: Option<usize> = arg_value(&args, "--index")?
        .map(|v| v.parse::<usize>())
        .transpose()
        .context("--index must be a non-negative integer")?;
    let tail: Option<usize> = arg_value(&args, "--tail")?
        .map(|v| v.parse::<usize>())
        .transpose()
        .context("--tail must be a positive integer")?;
    let export: Option<ExportFormat> = arg_value(&args, "--export")?
        .map(|f| f.parse::<ExportFormat>().map_err(anyhow::Error::msg))
        .transpose()?;

    let controller = RotationController::new(RotationView::new(config), source);

    let benchmark = match arg_value(&args, "--benchmark")? {
        Some(b) => b.to_string(),
        None => controller.default_benchmark().await,
    };

    let state = controller.reload_at(&benchmark, date).await;
    if let ViewState::Empty { reason } = &state {
        tracing::warn!("{}", reason.message());
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    if let Some(tail) = tail {
        controller.set_tail_length(tail).await;
    }
    if let Some(index) = index {
        controller.set_date_index(index).await;
    }

    if let Some(format) = export {
        let (body, last_date) = controller
            .with_view(|v| {
                let last = v.dataset().and_then(|ds| ds.last_date());
                (v.export(format, Utc::now()), last)
            })
            .await;
        let body = body?;
        let file_name = export_file_name(&benchmark, last_date.unwrap_or_else(|| Utc::now().date_naive()), format);

        let out_dir = PathBuf::from(arg_value(&args, "--out")?.unwrap_or("."));
        let path = out_dir.join(file_name);
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Exported {}", path.display());
        return Ok(());
    }

    if show_table {
        let rows = controller.table().await;
        for row in &rows {
            println!(
                "{:<32} {:>9.2} {:>9.2}  {:<9} {}",
                row.label(),
                row.rs_ratio,
                row.rs_momentum,
                row.quadrant.map(|q| q.as_str()).unwrap_or("-"),
                quadrant_indicator(row.quadrant)
            );
        }
        println!();
        for q in Quadrant::ALL {
            if rows.iter().any(|r| r.quadrant == Some(q)) {
                println!("{:<9} {}", q.as_str(), q.description());
            }
        }
    }

    if show_candidates {
        let candidates = controller.with_view(|v| v.candidates()).await;
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    }

    if show_table || show_candidates {
        return Ok(());
    }

    let scene = controller.scene().await;
    println!("{}", serde_json::to_string_pretty(&scene)?);
    Ok(())
}

async fn run_constituents(args: &[String], list_sectors: bool) -> anyhow::Result<()> {
    let client = RrgClient::from_env().context("Failed to build API client")?;

    if list_sectors {
        for sector in client.sector_list().await? {
            let marker = if sector.has_constituents { "" } else { " (no constituents)" };
            println!("{} {}{}", sector.ticker, sector.name, marker);
        }
        return Ok(());
    }

    let ticker = arg_value(args, "--constituents")?.context("--constituents requires a sector ticker")?;
    let period = arg_value(args, "--period")?.unwrap_or("1d");
    let sort: ConstituentSort = match arg_value(args, "--sort")? {
        Some(s) => s.parse().map_err(anyhow::Error::msg)?,
        None => ConstituentSort::default(),
    };

    let report = client.constituents(ticker, period).await?;
    println!("{} ({})", report.sector_name, report.period_label());
    for c in report.sorted(sort) {
        println!(
            "{:<10} {:<28} {:>10.1} {:>7.2}%  {}",
            c.ticker,
            c.name,
            c.price,
            c.change_pct,
            change_color(&report.period, c.change_pct)
        );
    }
    Ok(())
}

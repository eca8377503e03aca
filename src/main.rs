mod aggregate;
mod client;
mod config;
mod credential;
mod error;
mod latency;
mod report;
mod sampler;
mod session;
mod state;
mod types;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::client::CovalentClient;
use crate::config::Config;
use crate::error::Result;
use crate::report::{chart, display, table, ChartStyle};
use crate::sampler::{Sampler, SamplingSummary};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}. Program exited.");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    let api_key = credential::obtain(&cfg)?;
    let client = CovalentClient::new(&cfg, api_key)?;

    // --- Initial probe: seeds the ticker universe ---
    let results = session::initialize(&client).await?;

    // --- Sampling ---
    info!(
        "Collecting {} samples from {}, one every {}s",
        cfg.sample_rounds,
        cfg.api_url,
        cfg.sample_interval.as_secs()
    );
    let sampler = Sampler::new(&client, cfg.sample_rounds, cfg.sample_interval);
    let (results, summary) = sampler.run(results).await?;
    log_summary(&summary, results.len());

    // --- Aggregate ---
    let counts = aggregate::null_counts(&results);
    let rows = aggregate::report_rows(&counts);
    info!(
        "{} of {} tickers returned a null contract address at least once",
        rows.len(),
        counts.len()
    );

    // --- Report ---
    table::write_table(&cfg.csv_path, &rows)?;
    info!("Null counts written to {}", cfg.csv_path);

    let with_text = match chart::register_font(&cfg.chart_font_path) {
        Ok(()) => true,
        Err(e) => {
            warn!(
                "Chart font {} unavailable ({e}); chart will have no text",
                cfg.chart_font_path
            );
            false
        }
    };
    let style = ChartStyle::from_config(&cfg, with_text);
    chart::render_png(&cfg.chart_path, &rows, &style)?;
    info!("Bar chart written to {}", cfg.chart_path);

    if cfg.show_chart {
        match display::present(&rows, &style) {
            Ok(true) => {}
            Ok(false) => info!("No terminal attached; skipping interactive chart"),
            Err(e) => warn!("Interactive chart unavailable: {e}"),
        }
    }

    Ok(())
}

fn log_summary(summary: &SamplingSummary, tickers: usize) {
    info!(
        recorded = summary.recorded.len(),
        skipped = summary.skipped.len(),
        tickers,
        "Sampling complete: {} recorded, {} skipped",
        summary.recorded.len(),
        summary.skipped.len(),
    );
    if !summary.skipped.is_empty() {
        info!("Skipped samples: {:?}", summary.skipped);
    }
    if summary.unknown_quotes > 0 {
        warn!(
            "{} quotes named tickers absent from the initial probe and were ignored",
            summary.unknown_quotes
        );
    }
    if let Some((p50, p95, p99)) = summary.latency.percentiles() {
        info!(
            "Request latency p50={}ms p95={}ms p99={}ms over {} requests",
            p50.as_millis(),
            p95.as_millis(),
            p99.as_millis(),
            summary.latency.len()
        );
    }
}

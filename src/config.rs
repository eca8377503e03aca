use std::time::Duration;

use crate::error::{AppError, Result};

pub const TICKERS_API_URL: &str = "https://api.covalenthq.com/v1/pricing/tickers/";

/// Number of sampling rounds after the initial probe.
pub const SAMPLE_ROUNDS: u32 = 60;

/// Wait between sampling rounds (seconds).
pub const SAMPLE_INTERVAL_SECS: u64 = 60;

pub const REPORT_CSV_PATH: &str = "null_count.csv";
pub const REPORT_CHART_PATH: &str = "null_count_histogram.png";

/// Used for chart text. Bars still render when it cannot be loaded.
pub const CHART_FONT_PATH: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

pub const API_KEY_PROMPT: &str = "Enter Covalent API Key:";

/// Chart appearance.
pub mod chart {
    pub const WIDTH_PX: u32 = 1024;
    pub const HEIGHT_PX: u32 = 768;
    pub const X_LABEL: &str = "Currency Ticker";
    pub const Y_LABEL: &str = "Null Address Count";
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    /// Overrides the interactive prompt when set (COVALENT_API_KEY)
    pub api_key: Option<String>,
    pub log_level: String,
    pub sample_rounds: u32,
    pub sample_interval: Duration,
    /// None leaves the transport default in place (REQUEST_TIMEOUT_SECS)
    pub request_timeout: Option<Duration>,
    pub csv_path: String,
    pub chart_path: String,
    pub chart_font_path: String,
    /// Present the chart in the terminal after the run (SHOW_CHART)
    pub show_chart: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let sample_rounds = std::env::var("SAMPLE_ROUNDS")
            .unwrap_or_else(|_| SAMPLE_ROUNDS.to_string())
            .parse::<u32>()
            .map_err(|_| AppError::Config("SAMPLE_ROUNDS must be a positive integer".to_string()))?;
        if sample_rounds == 0 {
            return Err(AppError::Config("SAMPLE_ROUNDS must be at least 1".to_string()));
        }

        let sample_interval_secs = std::env::var("SAMPLE_INTERVAL_SECS")
            .unwrap_or_else(|_| SAMPLE_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                AppError::Config("SAMPLE_INTERVAL_SECS must be a whole number of seconds".to_string())
            })?;

        let request_timeout = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(Duration::from_secs(raw.parse::<u64>().map_err(|_| {
                AppError::Config("REQUEST_TIMEOUT_SECS must be a whole number of seconds".to_string())
            })?)),
            Err(_) => None,
        };

        Ok(Self {
            api_url: std::env::var("COVALENT_API_URL")
                .unwrap_or_else(|_| TICKERS_API_URL.to_string()),
            api_key: std::env::var("COVALENT_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            sample_rounds,
            sample_interval: Duration::from_secs(sample_interval_secs),
            request_timeout,
            csv_path: std::env::var("REPORT_CSV_PATH")
                .unwrap_or_else(|_| REPORT_CSV_PATH.to_string()),
            chart_path: std::env::var("REPORT_CHART_PATH")
                .unwrap_or_else(|_| REPORT_CHART_PATH.to_string()),
            chart_font_path: std::env::var("CHART_FONT_PATH")
                .unwrap_or_else(|_| CHART_FONT_PATH.to_string()),
            show_chart: std::env::var("SHOW_CHART")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }

    pub fn chart_title(&self) -> String {
        format!("Null Address Count over {} samples", self.sample_rounds)
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

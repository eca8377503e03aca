use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API response {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Histogram error: {0}")]
    Histogram(#[from] hdrhistogram::errors::CreationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

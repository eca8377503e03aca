use tracing::{debug, info, warn};

use crate::client::TickerSource;
use crate::error::{AppError, Result};
use crate::state::ResultsTable;

/// Probe the endpoint once and seed the ticker universe from the answer.
///
/// Requires both HTTP 200 and a false API error flag. Anything else, including
/// a transport failure, is returned as an error and ends the run.
pub async fn initialize<S: TickerSource>(source: &S) -> Result<ResultsTable> {
    let snapshot = source.fetch_snapshot().await?;

    if !snapshot.is_ok() {
        return Err(AppError::Api {
            status: snapshot.status,
            message: snapshot.message().to_string(),
        });
    }

    info!(
        "API Response: {}. No error. Program continuing.",
        snapshot.status
    );

    let table = ResultsTable::from_tickers(snapshot.quotes.iter().map(|q| q.ticker.clone()));
    info!(
        tickers = table.len(),
        rejected_items = snapshot.rejected_items,
        "Tracking {} tickers",
        table.len()
    );
    debug!("Tickers: {:?}", table.tickers());
    if table.is_empty() {
        warn!("Initial response listed no tickers; every sample will be ignored");
    }
    Ok(table)
}

//! Request latency histogram for the sampling run.
//! Each round's request time is recorded; percentiles are logged in the run summary.

use std::time::Duration;

use hdrhistogram::Histogram;

use crate::error::Result;

/// Upper bound of the histogram: one hour, in microseconds.
const MAX_LATENCY_US: u64 = 3_600_000_000;

/// Values stored in microseconds.
pub struct LatencyStats {
    histogram: Histogram<u64>,
}

impl LatencyStats {
    /// Tracks 1us to 1h, 3 significant figures.
    pub fn new() -> Result<Self> {
        let histogram = Histogram::new_with_bounds(1, MAX_LATENCY_US, 3)?;
        Ok(Self { histogram })
    }

    /// Durations above the bound are clamped to it.
    pub fn record(&mut self, d: Duration) {
        let us = d.as_micros().min(u128::from(MAX_LATENCY_US)) as u64;
        self.histogram.saturating_record(us.max(1));
    }

    /// Return (p50, p95, p99). None if no samples.
    pub fn percentiles(&self) -> Option<(Duration, Duration, Duration)> {
        if self.is_empty() {
            return None;
        }
        let at = |q: f64| Duration::from_micros(self.histogram.value_at_quantile(q));
        Some((at(0.5), at(0.95), at(0.99)))
    }

    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }
}

impl std::fmt::Debug for LatencyStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LatencyStats")
            .field("samples", &self.len())
            .finish()
    }
}

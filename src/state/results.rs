use std::collections::{BTreeMap, HashMap};

use crate::types::{ContractAddress, TickerQuote};

/// Sample index → contract address reported in that round.
pub type Samples = BTreeMap<u32, ContractAddress>;

// ---------------------------------------------------------------------------
// ResultsTable
// ---------------------------------------------------------------------------

/// Per-ticker sample records for one run.
///
/// The ticker universe is fixed at construction, in discovery order. A round
/// that was skipped leaves its index absent for every ticker; only an explicit
/// `ContractAddress::Null` counts as a null sample.
#[derive(Debug, Clone, Default)]
pub struct ResultsTable {
    /// Discovery order
    tickers: Vec<String>,
    /// ticker → position in `tickers` / `samples`
    positions: HashMap<String, usize>,
    samples: Vec<Samples>,
}

/// What happened to the quotes of one round.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecordStats {
    pub recorded: usize,
    /// Quotes for tickers outside the universe, dropped silently
    pub unknown: usize,
}

impl ResultsTable {
    /// Build an empty bucket per ticker. A repeated symbol keeps its first position.
    pub fn from_tickers<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for ticker in tickers {
            let ticker = ticker.into();
            if table.positions.contains_key(&ticker) {
                continue;
            }
            table.positions.insert(ticker.clone(), table.tickers.len());
            table.tickers.push(ticker);
            table.samples.push(Samples::new());
        }
        table
    }

    /// Record one quote under `round`. Returns false when the ticker is not tracked.
    pub fn record(&mut self, round: u32, quote: &TickerQuote) -> bool {
        match self.positions.get(&quote.ticker) {
            Some(&pos) => {
                self.samples[pos].insert(round, quote.address.clone());
                true
            }
            None => false,
        }
    }

    pub fn record_round(&mut self, round: u32, quotes: &[TickerQuote]) -> RecordStats {
        let mut stats = RecordStats::default();
        for quote in quotes {
            if self.record(round, quote) {
                stats.recorded += 1;
            } else {
                stats.unknown += 1;
            }
        }
        stats
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    #[cfg(test)]
    pub fn samples(&self, ticker: &str) -> Option<&Samples> {
        self.positions.get(ticker).map(|&pos| &self.samples[pos])
    }

    /// Tickers with their samples, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Samples)> {
        self.tickers
            .iter()
            .map(String::as_str)
            .zip(self.samples.iter())
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

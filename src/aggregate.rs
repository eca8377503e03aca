use crate::state::ResultsTable;

/// Null sample count per ticker, in ticker discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullCountTable {
    counts: Vec<(String, u32)>,
}

impl NullCountTable {
    #[cfg(test)]
    pub fn get(&self, ticker: &str) -> Option<u32> {
        self.counts
            .iter()
            .find(|(t, _)| t == ticker)
            .map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(t, c)| (t.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

/// One line of the report: a ticker with at least one null sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub ticker: String,
    pub null_count: u32,
}

/// Count explicit null samples per ticker. Skipped rounds have no entry and
/// therefore never count.
pub fn null_counts(table: &ResultsTable) -> NullCountTable {
    let counts = table
        .iter()
        .map(|(ticker, samples)| {
            let nulls = samples.values().filter(|a| a.is_null()).count() as u32;
            (ticker.to_string(), nulls)
        })
        .collect();
    NullCountTable { counts }
}

/// Tickers with a nonzero count, ascending by count. The sort is stable, so
/// equal counts keep discovery order.
pub fn report_rows(counts: &NullCountTable) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = counts
        .iter()
        .filter(|&(_, c)| c > 0)
        .map(|(ticker, null_count)| ReportRow {
            ticker: ticker.to_string(),
            null_count,
        })
        .collect();
    rows.sort_by_key(|r| r.null_count);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContractAddress, TickerQuote};

    fn quote(ticker: &str, null: bool) -> TickerQuote {
        TickerQuote {
            ticker: ticker.to_string(),
            address: if null {
                ContractAddress::Null
            } else {
                ContractAddress::Address(format!("0x{ticker}"))
            },
        }
    }

    /// A: null in rounds 1 and 59, B: null in round 30, C never null.
    fn three_ticker_run() -> ResultsTable {
        let mut table = ResultsTable::from_tickers(["A", "B", "C"]);
        for round in 1..=60 {
            table.record_round(
                round,
                &[
                    quote("A", round == 1 || round == 59),
                    quote("B", round == 30),
                    quote("C", false),
                ],
            );
        }
        table
    }

    #[test]
    fn counts_explicit_nulls() {
        let counts = null_counts(&three_ticker_run());
        assert_eq!(counts.get("A"), Some(2));
        assert_eq!(counts.get("B"), Some(1));
        assert_eq!(counts.get("C"), Some(0));
        assert_eq!(counts.get("D"), None);
    }

    #[test]
    fn equal_counts_keep_discovery_order() {
        let mut table = three_ticker_run();
        // Second null for B makes it tie with A.
        table.record(31, &quote("B", true));
        let rows = report_rows(&null_counts(&table));
        assert_eq!(
            rows,
            vec![
                ReportRow { ticker: "A".to_string(), null_count: 2 },
                ReportRow { ticker: "B".to_string(), null_count: 2 },
            ]
        );
    }

    #[test]
    fn rows_are_ascending_and_exclude_zero() {
        let mut table = ResultsTable::from_tickers(["X", "Y", "Z", "W"]);
        for round in 1..=5 {
            table.record_round(
                round,
                &[
                    quote("X", true),
                    quote("Y", round == 1),
                    quote("Z", false),
                    quote("W", round <= 3),
                ],
            );
        }
        let rows = report_rows(&null_counts(&table));
        let tickers: Vec<&str> = rows.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["Y", "W", "X"]);
        assert!(rows.windows(2).all(|w| w[0].null_count <= w[1].null_count));
        assert!(rows.iter().all(|r| r.ticker != "Z"));
    }

    #[test]
    fn skipped_rounds_do_not_count() {
        let mut table = ResultsTable::from_tickers(["A"]);
        table.record(1, &quote("A", false));
        // Rounds 2..=60 skipped: no entries at all.
        let counts = null_counts(&table);
        assert_eq!(counts.get("A"), Some(0));
        assert!(report_rows(&counts).is_empty());
    }

    #[test]
    fn all_rounds_failed_gives_zero_counts_and_empty_report() {
        let table = ResultsTable::from_tickers(["A", "B"]);
        let counts = null_counts(&table);
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|(_, c)| c == 0));
        assert!(report_rows(&counts).is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let table = three_ticker_run();
        let first = null_counts(&table);
        let second = null_counts(&table);
        assert_eq!(first, second);
        assert_eq!(report_rows(&first), report_rows(&second));
    }
}

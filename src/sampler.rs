use std::time::{Duration, Instant};

use futures_util::stream::{self, Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::client::TickerSource;
use crate::error::{AppError, Result};
use crate::latency::LatencyStats;
use crate::state::ResultsTable;
use crate::types::{Round, RoundOutcome, SkipReason};

/// Polls the endpoint for a fixed number of rounds, one request per round,
/// waiting a fixed interval between rounds.
pub struct Sampler<'a, S> {
    source: &'a S,
    rounds: u32,
    interval: Duration,
}

#[derive(Debug)]
pub struct SamplingSummary {
    pub recorded: Vec<u32>,
    pub skipped: Vec<u32>,
    /// Quotes for tickers that were not seen by the initial probe
    pub unknown_quotes: usize,
    pub latency: LatencyStats,
}

impl SamplingSummary {
    pub fn new() -> Result<Self> {
        Ok(Self {
            recorded: Vec::new(),
            skipped: Vec::new(),
            unknown_quotes: 0,
            latency: LatencyStats::new()?,
        })
    }
}

impl<'a, S: TickerSource> Sampler<'a, S> {
    pub fn new(source: &'a S, rounds: u32, interval: Duration) -> Self {
        Self {
            source,
            rounds,
            interval,
        }
    }

    /// Rounds 1..=N in order. The wait for round n+1 only starts once round n
    /// has been taken from the stream, and no wait follows the final round.
    /// A failed request never ends the stream early.
    pub fn rounds(&self) -> impl Stream<Item = Round> + 'a {
        let source = self.source;
        let total = self.rounds;
        let interval = self.interval;

        stream::unfold(1u32, move |index| async move {
            if index > total {
                return None;
            }
            if index > 1 {
                tokio::time::sleep(interval).await;
            }
            let round = sample_round(source, index).await;
            Some((round, index + 1))
        })
    }

    /// Drive every round to completion, committing each round's records to
    /// `table` before the next request is issued.
    pub async fn run(&self, mut table: ResultsTable) -> Result<(ResultsTable, SamplingSummary)> {
        let mut summary = SamplingSummary::new()?;
        let rounds = self.rounds();
        futures_util::pin_mut!(rounds);

        while let Some(round) = rounds.next().await {
            summary.latency.record(round.latency);
            match round.outcome {
                RoundOutcome::Recorded(quotes) => {
                    let stats = table.record_round(round.index, &quotes);
                    summary.recorded.push(round.index);
                    summary.unknown_quotes += stats.unknown;
                    if stats.unknown > 0 {
                        debug!(
                            round = round.index,
                            "Ignored {} quotes for untracked tickers", stats.unknown
                        );
                    }
                    info!(
                        round = round.index,
                        recorded = stats.recorded,
                        "Sample {}/{} recorded",
                        round.index,
                        self.rounds
                    );
                }
                RoundOutcome::Skipped(reason) => {
                    warn!(
                        round = round.index,
                        "Sample {} failed and skipped. {}", round.index, reason
                    );
                    summary.skipped.push(round.index);
                }
            }
        }

        Ok((table, summary))
    }
}

async fn sample_round<S: TickerSource>(source: &S, index: u32) -> Round {
    let started = Instant::now();
    let result = source.fetch_snapshot().await;
    let latency = started.elapsed();

    let outcome = match result {
        Ok(snapshot) if !snapshot.error => {
            debug!(
                round = index,
                updated_at = snapshot.updated_at.as_deref().unwrap_or("unknown"),
                items = snapshot.quotes.len(),
                "Ticker snapshot received"
            );
            RoundOutcome::Recorded(snapshot.quotes)
        }
        Ok(snapshot) => RoundOutcome::Skipped(SkipReason::Api(snapshot.message().to_string())),
        Err(AppError::Http(e)) => RoundOutcome::Skipped(SkipReason::Transport(e.to_string())),
        Err(e) => RoundOutcome::Skipped(SkipReason::Payload(e.to_string())),
    };

    Round {
        index,
        latency,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::scripted::{api_error, ok, ScriptedSource};
    use crate::types::ContractAddress;

    fn all_ok(rounds: usize) -> Vec<crate::error::Result<crate::types::TickerSnapshot>> {
        (0..rounds)
            .map(|_| ok(&[("A", Some("0xa")), ("B", Some("0xb"))]))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn runs_every_round_with_fixed_interval() {
        let source = ScriptedSource::new(all_ok(60));
        let sampler = Sampler::new(&source, 60, Duration::from_secs(60));

        let started = tokio::time::Instant::now();
        let (table, summary) = sampler.run(ResultsTable::from_tickers(["A", "B"])).await.unwrap();

        assert_eq!(source.calls(), 60);
        assert_eq!(summary.recorded, (1..=60).collect::<Vec<_>>());
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.latency.len(), 60);
        // 59 waits between 60 rounds.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(59 * 60));
        assert!(elapsed < Duration::from_secs(60 * 60));

        let samples = table.samples("A").unwrap();
        assert_eq!(samples.keys().copied().collect::<Vec<_>>(), (1..=60).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn api_error_round_is_skipped_and_keeps_its_index() {
        let mut script = all_ok(5);
        script[2] = api_error(200, "Internal error");
        let source = ScriptedSource::new(script);
        let sampler = Sampler::new(&source, 5, Duration::from_secs(60));

        let (table, summary) = sampler.run(ResultsTable::from_tickers(["A", "B"])).await.unwrap();

        assert_eq!(summary.recorded, vec![1, 2, 4, 5]);
        assert_eq!(summary.skipped, vec![3]);
        for ticker in ["A", "B"] {
            let samples = table.samples(ticker).unwrap();
            assert!(!samples.contains_key(&3));
            assert_eq!(samples.keys().copied().collect::<Vec<_>>(), vec![1, 2, 4, 5]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transport_and_payload_failures_do_not_abort() {
        let source = ScriptedSource::new(vec![
            Err(AppError::Payload("HTTP 502: response body is not JSON".to_string())),
            ok(&[("A", None)]),
        ]);
        let sampler = Sampler::new(&source, 3, Duration::from_secs(1));

        let (table, summary) = sampler.run(ResultsTable::from_tickers(["A"])).await.unwrap();

        // Round 3 finds the script exhausted and is skipped as well.
        assert_eq!(source.calls(), 3);
        assert_eq!(summary.recorded, vec![2]);
        assert_eq!(summary.skipped, vec![1, 3]);
        assert_eq!(
            table.samples("A").unwrap().get(&2),
            Some(&ContractAddress::Null)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stream_yields_skip_reasons() {
        let source = ScriptedSource::new(vec![
            api_error(429, "Rate limit"),
            Err(AppError::Payload("bad".to_string())),
        ]);
        let sampler = Sampler::new(&source, 2, Duration::from_secs(60));
        let rounds: Vec<Round> = sampler.rounds().collect().await;

        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].index, 1);
        assert!(matches!(
            &rounds[0].outcome,
            RoundOutcome::Skipped(SkipReason::Api(m)) if m == "Rate limit"
        ));
        assert!(matches!(
            &rounds[1].outcome,
            RoundOutcome::Skipped(SkipReason::Payload(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn untracked_tickers_are_counted_not_recorded() {
        let source = ScriptedSource::new(vec![ok(&[("A", Some("0xa")), ("NEW", None)])]);
        let sampler = Sampler::new(&source, 1, Duration::from_secs(60));

        let (table, summary) = sampler.run(ResultsTable::from_tickers(["A"])).await.unwrap();

        assert_eq!(summary.unknown_quotes, 1);
        assert!(table.samples("NEW").is_none());
        assert_eq!(table.len(), 1);
    }
}

use std::time::Duration;

// ---------------------------------------------------------------------------
// Ticker payload
// ---------------------------------------------------------------------------

/// Contract address reported for a ticker in one sample.
/// An absent `contract_address` key is a malformed item, never `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractAddress {
    Address(String),
    Null,
}

impl ContractAddress {
    pub fn is_null(&self) -> bool {
        matches!(self, ContractAddress::Null)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerQuote {
    pub ticker: String,
    pub address: ContractAddress,
}

/// One parsed response from the tickers endpoint.
#[derive(Debug, Clone)]
pub struct TickerSnapshot {
    /// Transport-level status code
    pub status: u16,
    /// API-level error flag, independent of `status`
    pub error: bool,
    pub error_message: Option<String>,
    pub updated_at: Option<String>,
    pub quotes: Vec<TickerQuote>,
    /// Items dropped because the ticker or address field was missing or mistyped
    pub rejected_items: usize,
}

impl TickerSnapshot {
    pub fn is_ok(&self) -> bool {
        self.status == 200 && !self.error
    }

    pub fn message(&self) -> &str {
        self.error_message.as_deref().unwrap_or("none")
    }
}

// ---------------------------------------------------------------------------
// Sampling rounds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The endpoint answered with its error flag set
    Api(String),
    /// The request never produced a response
    Transport(String),
    /// A response arrived but could not be read as a ticker payload
    Payload(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Api(m) => write!(f, "API error message: {m}"),
            SkipReason::Transport(m) => write!(f, "transport error: {m}"),
            SkipReason::Payload(m) => write!(f, "payload error: {m}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RoundOutcome {
    Recorded(Vec<TickerQuote>),
    Skipped(SkipReason),
}

/// Result of one sampling round. `index` runs 1..=rounds with no gaps;
/// a skipped round still consumes its index.
#[derive(Debug, Clone)]
pub struct Round {
    pub index: u32,
    pub latency: Duration,
    pub outcome: RoundOutcome,
}

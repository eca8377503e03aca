use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::types::{ContractAddress, TickerQuote, TickerSnapshot};

/// A source of ticker snapshots. One call is one request against the endpoint.
///
/// Transport failures and unreadable bodies are `Err`. An answer carrying the
/// API error flag is still `Ok`; callers decide what the flag means for them.
pub trait TickerSource {
    async fn fetch_snapshot(&self) -> Result<TickerSnapshot>;
}

/// Covalent pricing-tickers endpoint, authenticated with the API key as the
/// basic-auth username and an empty password.
pub struct CovalentClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl CovalentClient {
    pub fn new(cfg: &Config, api_key: String) -> Result<Self> {
        Self::with_timeout(cfg.api_url.clone(), api_key, cfg.request_timeout)
    }

    pub fn with_timeout(url: String, api_key: String, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            url,
            api_key,
        })
    }
}

impl TickerSource for CovalentClient {
    async fn fetch_snapshot(&self) -> Result<TickerSnapshot> {
        let resp = self
            .http
            .get(&self.url)
            .basic_auth(&self.api_key, Some(""))
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await?;
        let value: Value = serde_json::from_str(&body).map_err(|e| {
            AppError::Payload(format!("HTTP {status}: response body is not JSON ({e})"))
        })?;

        parse_snapshot(status, &value)
    }
}

/// Parse a tickers response body. Items are only read when the API error flag
/// is false; `data` is usually null otherwise.
pub fn parse_snapshot(status: u16, v: &Value) -> Result<TickerSnapshot> {
    let obj = v
        .as_object()
        .ok_or_else(|| AppError::Payload(format!("HTTP {status}: response is not a JSON object")))?;

    let error = obj
        .get("error")
        .and_then(|e| e.as_bool())
        .ok_or_else(|| AppError::Payload(format!("HTTP {status}: missing boolean `error` flag")))?;

    let error_message = obj
        .get("error_message")
        .and_then(|m| m.as_str())
        .map(|m| m.to_string());

    let mut snapshot = TickerSnapshot {
        status,
        error,
        error_message,
        updated_at: None,
        quotes: Vec::new(),
        rejected_items: 0,
    };

    if error {
        return Ok(snapshot);
    }

    let data = obj
        .get("data")
        .filter(|d| !d.is_null())
        .ok_or_else(|| AppError::Payload("`data` is null while `error` is false".to_string()))?;

    snapshot.updated_at = data
        .get("updated_at")
        .and_then(|u| u.as_str())
        .map(|u| u.to_string());

    let items = data
        .get("items")
        .and_then(|i| i.as_array())
        .ok_or_else(|| AppError::Payload("`data.items` is not an array".to_string()))?;

    for item in items {
        match parse_quote(item) {
            Ok(quote) => snapshot.quotes.push(quote),
            Err(rejection) => {
                snapshot.rejected_items += 1;
                debug!("Dropped ticker item ({rejection:?}): {item}");
            }
        }
    }

    Ok(snapshot)
}

#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    NotAnObject,
    NoTicker,
    NoAddressField,
    AddressNotString,
}

fn parse_quote(item: &Value) -> std::result::Result<TickerQuote, Rejection> {
    let item = item.as_object().ok_or(Rejection::NotAnObject)?;

    let ticker = item
        .get("contract_ticker_symbol")
        .and_then(|t| t.as_str())
        .ok_or(Rejection::NoTicker)?
        .to_string();

    let address = match item.get("contract_address") {
        None => return Err(Rejection::NoAddressField),
        Some(Value::Null) => ContractAddress::Null,
        Some(Value::String(a)) => ContractAddress::Address(a.clone()),
        Some(_) => return Err(Rejection::AddressNotString),
    };

    Ok(TickerQuote { ticker, address })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_items_with_null_and_string_addresses() {
        let body = json!({
            "data": {
                "updated_at": "2021-09-26T12:00:00.000Z",
                "items": [
                    { "contract_ticker_symbol": "WETH", "contract_address": "0xc02a" },
                    { "contract_ticker_symbol": "BNB", "contract_address": null }
                ]
            },
            "error": false,
            "error_message": null,
            "error_code": null
        });
        let snap = parse_snapshot(200, &body).unwrap();
        assert!(snap.is_ok());
        assert_eq!(snap.updated_at.as_deref(), Some("2021-09-26T12:00:00.000Z"));
        assert_eq!(
            snap.quotes,
            vec![
                TickerQuote {
                    ticker: "WETH".to_string(),
                    address: ContractAddress::Address("0xc02a".to_string()),
                },
                TickerQuote {
                    ticker: "BNB".to_string(),
                    address: ContractAddress::Null,
                },
            ]
        );
        assert_eq!(snap.rejected_items, 0);
    }

    #[test]
    fn absent_address_is_not_null() {
        let body = json!({
            "data": { "items": [
                { "contract_ticker_symbol": "USDT" },
                { "contract_ticker_symbol": "DAI", "contract_address": 42 },
                { "contract_address": null },
                "garbage"
            ]},
            "error": false
        });
        let snap = parse_snapshot(200, &body).unwrap();
        assert!(snap.quotes.is_empty());
        assert_eq!(snap.rejected_items, 4);
    }

    #[test]
    fn api_error_skips_items() {
        let body = json!({
            "data": null,
            "error": true,
            "error_message": "Invalid API key",
            "error_code": 401
        });
        let snap = parse_snapshot(401, &body).unwrap();
        assert!(snap.error);
        assert!(!snap.is_ok());
        assert_eq!(snap.message(), "Invalid API key");
        assert!(snap.quotes.is_empty());
    }

    #[test]
    fn non_200_without_error_flag_is_not_ok() {
        let body = json!({ "data": { "items": [] }, "error": false });
        let snap = parse_snapshot(503, &body).unwrap();
        assert!(!snap.error);
        assert!(!snap.is_ok());
        assert_eq!(snap.message(), "none");
    }

    #[test]
    fn missing_error_flag_is_payload_error() {
        let body = json!({ "data": { "items": [] } });
        let err = parse_snapshot(200, &body).unwrap_err();
        assert!(matches!(err, AppError::Payload(_)));
    }

    #[test]
    fn null_data_without_error_is_payload_error() {
        let body = json!({ "data": null, "error": false });
        assert!(matches!(parse_snapshot(200, &body), Err(AppError::Payload(_))));
    }

    #[test]
    fn non_object_body_is_payload_error() {
        assert!(matches!(parse_snapshot(200, &json!([1, 2])), Err(AppError::Payload(_))));
    }

    #[test]
    fn quote_rejections() {
        assert_eq!(parse_quote(&json!(1)), Err(Rejection::NotAnObject));
        assert_eq!(
            parse_quote(&json!({ "contract_ticker_symbol": 5, "contract_address": null })),
            Err(Rejection::NoTicker)
        );
        assert_eq!(
            parse_quote(&json!({ "contract_ticker_symbol": "X" })),
            Err(Rejection::NoAddressField)
        );
        assert_eq!(
            parse_quote(&json!({ "contract_ticker_symbol": "X", "contract_address": [] })),
            Err(Rejection::AddressNotString)
        );
    }
}

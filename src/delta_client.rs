use crate::config;
use crate::error::DeltaError;
use crate::models::{
    CandlesResponse, ContractRecord, MarketSnapshot, Product, ProductsResponse, TickerResponse,
    TickersResponse,
};
use crate::processor;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use reqwest::{Client, StatusCode, header};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

// -----------------------------------------------
// DELTA EXCHANGE REST CLIENT
// -----------------------------------------------
pub struct DeltaClient {
    client: Client,
}

impl DeltaClient {
    pub fn new() -> Result<Self, DeltaError> {
        Ok(Self {
            client: build_client()?,
        })
    }

    /// Generic retry fetch with JSON-shape validation
    async fn fetch_json(&self, url: &str) -> Result<String, DeltaError> {
        let backoff = ExponentialBackoff::from_millis(config::RETRY_BASE_DELAY_MS)
            .factor(config::RETRY_FACTOR)
            .max_delay(Duration::from_secs(config::RETRY_MAX_DELAY_SECS))
            .take(config::RETRY_MAX_ATTEMPTS);

        Retry::spawn(backoff, || async {
            let res = self.client.get(url).send().await?;
            let status = res.status();

            if status.is_success() {
                let text = res.text().await?;

                // Validate JSON before handing it to serde
                let trimmed = text.trim();
                if !trimmed.starts_with('{') && !trimmed.starts_with('[') {
                    let preview: String = text.chars().take(200).collect();
                    return Err(DeltaError::NonJsonResponse(preview));
                }

                Ok(text)
            } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                warn!(%status, url, "retryable upstream error");
                Err(DeltaError::Request(format!("Retryable error: {}", status)))
            } else {
                // Fail fast on client errors
                let body = res.text().await.unwrap_or_default();
                let preview: String = body.chars().take(200).collect();
                Err(DeltaError::Request(format!("Client error {}: {}", status, preview)))
            }
        })
        .await
    }

    // -----------------------------------------------
    // STEP 1: OPTION CONTRACTS FOR THE NEAREST EXPIRY
    // -----------------------------------------------
    pub async fn fetch_option_contracts(
        &self,
        underlying: &str,
    ) -> Result<Vec<ContractRecord>, DeltaError> {
        let text = self.fetch_json(&config::delta_products_url()).await?;
        let products: ProductsResponse = serde_json::from_str(&text)?;

        let mut contracts: Vec<Product> = products
            .result
            .into_iter()
            .filter(|p| {
                p.underlying_asset
                    .as_ref()
                    .is_some_and(|a| a.symbol == underlying)
            })
            .collect();

        // Nearest expiry: smallest settlement time still in the future
        let now = Utc::now();
        let mut nearest: Option<DateTime<Utc>> = None;
        for product in &contracts {
            if let Some(ts) = product.settlement_time.as_deref().and_then(parse_settlement) {
                if ts > now && nearest.is_none_or(|n| ts < n) {
                    nearest = Some(ts);
                }
            }
        }
        let Some(nearest) = nearest else {
            return Err(DeltaError::MissingData(format!(
                "no live option expiries found for {}",
                underlying
            )));
        };
        contracts
            .retain(|p| p.settlement_time.as_deref().and_then(parse_settlement) == Some(nearest));

        debug!(
            underlying,
            expiry = %nearest,
            contracts = contracts.len(),
            "selected nearest expiry"
        );

        // Join mark prices from the tickers feed
        let text = self.fetch_json(&config::delta_tickers_url()).await?;
        let tickers: TickersResponse = serde_json::from_str(&text)?;
        let marks: HashMap<String, Option<Value>> = tickers
            .result
            .into_iter()
            .map(|t| (t.symbol, t.mark_price))
            .collect();

        let records = contracts
            .into_iter()
            .map(|p| ContractRecord {
                mark_price: marks.get(&p.symbol).cloned().flatten(),
                symbol: p.symbol,
                contract_type: p.contract_type,
                strike_price: p.strike_price,
            })
            .collect();

        Ok(records)
    }

    // -----------------------------------------------
    // STEP 2: CURRENT SPOT PRICE
    // -----------------------------------------------
    pub async fn fetch_spot_price(&self) -> Result<f64, DeltaError> {
        let text = self
            .fetch_json(&config::delta_ticker_url(config::SPOT_SYMBOL))
            .await?;
        let ticker: TickerResponse = serde_json::from_str(&text)?;

        processor::numeric_cell(ticker.result.spot_price.as_ref())
            .or_else(|| processor::numeric_cell(ticker.result.mark_price.as_ref()))
            .ok_or_else(|| {
                DeltaError::MissingData(format!(
                    "no usable price on ticker {}",
                    config::SPOT_SYMBOL
                ))
            })
    }

    // -----------------------------------------------
    // STEP 3: MORNING REFERENCE PRICE
    // -----------------------------------------------

    /// Close of the 1-minute candle at today's reference instant (05:29 IST).
    /// `None` before that instant, or when the feed has no candle for it.
    pub async fn fetch_reference_price(&self) -> Result<Option<f64>, DeltaError> {
        let Some(start) = reference_window_start(Utc::now()) else {
            return Ok(None);
        };

        let url = config::delta_candles_url(config::SPOT_SYMBOL, "1m", start, start + 60);
        let text = self.fetch_json(&url).await?;
        let candles: CandlesResponse = serde_json::from_str(&text)?;

        Ok(candles.result.first().map(|c| c.close))
    }

    /// Both rule-evaluation scalars in one call. A failed reference fetch
    /// degrades to `None` so rules can report the deficiency themselves.
    pub async fn fetch_snapshot(&self) -> Result<MarketSnapshot, DeltaError> {
        let current_price = self.fetch_spot_price().await?;

        let reference_price = match self.fetch_reference_price().await {
            Ok(price) => price,
            Err(e) => {
                warn!(error = %e, "reference price fetch failed");
                None
            }
        };

        Ok(MarketSnapshot {
            current_price,
            reference_price,
        })
    }
}

fn parse_settlement(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Epoch seconds of today's reference instant, or `None` when it has not
/// occurred yet
fn reference_window_start(now: DateTime<Utc>) -> Option<i64> {
    let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60)?;
    let local = now.with_timezone(&ist);
    let at = local
        .date_naive()
        .and_hms_opt(config::REFERENCE_HOUR_IST, config::REFERENCE_MINUTE_IST, 0)?;
    let at = ist.from_local_datetime(&at).single()?;

    (at <= now).then(|| at.timestamp())
}

// -----------------------------------------------
// HTTP CLIENT BUILDER
// -----------------------------------------------
fn build_client() -> Result<Client, DeltaError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(headers)
        .user_agent(config::USER_AGENT)
        .timeout(config::HTTP_TIMEOUT)
        .build()
        .map_err(DeltaError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settlement() {
        let ts = parse_settlement("2026-08-07T12:00:00Z").unwrap();
        assert_eq!(ts.timestamp(), 1786104000);
        assert!(parse_settlement("not-a-date").is_none());
    }

    #[test]
    fn test_reference_window_before_and_after() {
        // 05:29 IST == 23:59 UTC the previous day
        let before = Utc.with_ymd_and_hms(2026, 8, 6, 23, 0, 0).unwrap();
        assert!(reference_window_start(before).is_none());

        let after = Utc.with_ymd_and_hms(2026, 8, 7, 6, 0, 0).unwrap();
        let start = reference_window_start(after).unwrap();
        // window start is today's 05:29 IST, i.e. 23:59 UTC on the 6th
        let expected = Utc.with_ymd_and_hms(2026, 8, 6, 23, 59, 0).unwrap();
        assert_eq!(start, expected.timestamp());
    }
}

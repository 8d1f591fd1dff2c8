use std::time::Duration;

// -----------------------------------------------
// DELTA EXCHANGE API ENDPOINTS
// -----------------------------------------------
pub const DELTA_BASE_URL: &str = "https://api.india.delta.exchange";

pub fn delta_products_url() -> String {
    format!(
        "{}/v2/products?contract_types=call_options,put_options&states=live&page_size=500",
        DELTA_BASE_URL
    )
}

pub fn delta_tickers_url() -> String {
    format!(
        "{}/v2/tickers?contract_types=call_options,put_options",
        DELTA_BASE_URL
    )
}

pub fn delta_ticker_url(symbol: &str) -> String {
    format!(
        "{}/v2/tickers/{}",
        DELTA_BASE_URL,
        urlencoding::encode(symbol) // URL-encode the symbol
    )
}

pub fn delta_candles_url(symbol: &str, resolution: &str, start: i64, end: i64) -> String {
    format!(
        "{}/v2/history/candles?symbol={}&resolution={}&start={}&end={}",
        DELTA_BASE_URL,
        urlencoding::encode(symbol),
        resolution,
        start,
        end
    )
}

// -----------------------------------------------
// UNDERLYING / SPOT
// -----------------------------------------------
pub const UNDERLYING_ASSET: &str = "BTC";
pub const SPOT_SYMBOL: &str = "BTCUSD";

// Reference instant for the intraday move calculation (05:29 IST)
pub const REFERENCE_HOUR_IST: u32 = 5;
pub const REFERENCE_MINUTE_IST: u32 = 29;

// -----------------------------------------------
// STRATEGY CONSTANTS
// -----------------------------------------------
// Desk-supplied risk sizing; thresholds and bands are not derived anywhere.
pub const PUT_SELL_DROP_PCT: f64 = -1.0;
pub const PUT_SELL_BAND_LOW: f64 = 270.0;
pub const PUT_SELL_BAND_HIGH: f64 = 330.0;
pub const PUT_SELL_LOTS: u32 = 23;

pub const SCAN_BAND_LOW: f64 = 100.0;
pub const SCAN_BAND_HIGH: f64 = 200.0;

// -----------------------------------------------
// HTTP CLIENT CONFIG
// -----------------------------------------------
pub const USER_AGENT: &str = "delta-analyzer/0.1";

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

// -----------------------------------------------
// RETRY CONFIG
// -----------------------------------------------
pub const RETRY_BASE_DELAY_MS: u64 = 200;
pub const RETRY_FACTOR: u64 = 3;
pub const RETRY_MAX_DELAY_SECS: u64 = 5;
pub const RETRY_MAX_ATTEMPTS: usize = 5;

// -----------------------------------------------
// RUNTIME CONFIGURATION
// -----------------------------------------------

/// Get the execution mode from environment or default to a one-shot analysis
pub fn get_execution_mode() -> String {
    std::env::var("DELTA_MODE").unwrap_or_else(|_| "analyze".to_string())
}

/// Get the underlying asset symbol
pub fn get_underlying() -> String {
    std::env::var("DELTA_UNDERLYING").unwrap_or_else(|_| UNDERLYING_ASSET.to_string())
}

/// Get the selected strategy name, if any (default selection is the registry's)
pub fn get_selected_strategy() -> Option<String> {
    std::env::var("DELTA_STRATEGY").ok().filter(|s| !s.is_empty())
}

/// Get the watch-mode refresh interval in seconds
pub fn get_refresh_secs() -> u64 {
    std::env::var("DELTA_REFRESH_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(|v| v.clamp(5, 3600))
        .unwrap_or(60)
}

/// Get the API server port
pub fn get_port() -> u16 {
    std::env::var("DELTA_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(3001)
}

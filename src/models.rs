use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Option contract side as Delta Exchange tags it on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
    #[serde(rename = "call_options")]
    CallOptions,

    #[serde(rename = "put_options")]
    PutOptions,
}

/// One raw option contract as handed to the chain builder.
///
/// The feed delivers strike and mark price inconsistently (numeric strings,
/// numbers, sometimes missing), so both stay as loose JSON cells until the
/// processor coerces them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractRecord {
    pub symbol: String,

    pub contract_type: ContractType,

    #[serde(default)]
    pub strike_price: Option<Value>,

    #[serde(default)]
    pub mark_price: Option<Value>,
}

/// Scalar inputs for rule evaluation. The reference price is the spot
/// observed at the fixed morning instant and may be unavailable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub current_price: f64,
    pub reference_price: Option<f64>,
}

// -----------------------------------------------
// DELTA API RESPONSE ENVELOPES
// -----------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ProductsResponse {
    pub result: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub symbol: String,

    pub contract_type: ContractType,

    #[serde(default)]
    pub strike_price: Option<Value>,

    #[serde(default)]
    pub settlement_time: Option<String>,

    #[serde(default)]
    pub underlying_asset: Option<AssetRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetRef {
    pub symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickersResponse {
    pub result: Vec<Ticker>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TickerResponse {
    pub result: Ticker,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ticker {
    pub symbol: String,

    #[serde(default)]
    pub mark_price: Option<Value>,

    #[serde(default)]
    pub spot_price: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandlesResponse {
    pub result: Vec<Candle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

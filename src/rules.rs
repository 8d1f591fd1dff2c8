use crate::config;
use crate::processor::{self, ChainTable, OptionLeg};
use serde::Serialize;

/// Uniform output of every strategy rule: finalized message text plus
/// optional structured supporting data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalResult {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<SignalDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SignalDetails {
    /// One selected contract with its computed distance to spot
    Selection(SelectedContract),
    /// Band-scan rows tagged with their originating leg, calls first
    BandScan(Vec<TaggedMatch>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedContract {
    pub strike: f64,
    pub symbol: String,
    pub price: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedMatch {
    pub side: String, // "Calls" or "Puts"
    pub strike: f64,
    pub symbol: String,
    pub price: f64,
}

pub type StrategyFn = fn(&ChainTable, f64, Option<f64>) -> SignalResult;

// -----------------------------------------------
// STRATEGY REGISTRY
// -----------------------------------------------
// Fixed at compile time; slice order defines the default (first entry).
pub const STRATEGIES: &[(&str, StrategyFn)] = &[
    ("Sell OTM Put if BTC falls >1% (270-330 range)", put_sell_signal),
    ("OTM Calls & Puts in $100-200 range", otm_band_scan),
];

pub fn strategy_names() -> Vec<&'static str> {
    STRATEGIES.iter().map(|(name, _)| *name).collect()
}

pub fn default_strategy() -> &'static str {
    STRATEGIES[0].0
}

/// Dispatch the selected strategy against the chain. An omitted name runs the
/// default; an unknown name yields a not-found result, never a panic.
pub fn run_strategy(
    chain: &ChainTable,
    current_price: f64,
    reference_price: Option<f64>,
    selected: Option<&str>,
) -> SignalResult {
    let name = selected.unwrap_or_else(|| default_strategy());

    match STRATEGIES.iter().find(|(n, _)| *n == name) {
        Some((_, rule)) => rule(chain, current_price, reference_price),
        None => SignalResult {
            message: "❌ Strategy not found.".to_string(),
            details: None,
        },
    }
}

// -----------------------------------------------
// RULE A: FALL-TRIGGERED PUT SELL
// -----------------------------------------------

/// If the market fell at least 1% from the morning reference price, pick the
/// OTM put closest to spot inside the configured premium band and size it at
/// the fixed lot count.
pub fn put_sell_signal(
    chain: &ChainTable,
    current_price: f64,
    reference_price: Option<f64>,
) -> SignalResult {
    let reference = match reference_price {
        Some(r) if r != 0.0 => r,
        _ => {
            return SignalResult {
                message: "⚠ Reference price missing or zero, cannot evaluate market move."
                    .to_string(),
                details: None,
            };
        }
    };

    let pct_change = (current_price - reference) / reference * 100.0;

    if pct_change > config::PUT_SELL_DROP_PCT {
        return SignalResult {
            message: format!("✅ Market drop only {:.2}%, no sell signal.", pct_change),
            details: None,
        };
    }

    let candidates = processor::select_otm_in_band(
        chain,
        current_price,
        OptionLeg::Put,
        config::PUT_SELL_BAND_LOW,
        config::PUT_SELL_BAND_HIGH,
    );

    match processor::closest_to_spot(&candidates, current_price) {
        Some(best) => {
            let total_notional = best.price * config::PUT_SELL_LOTS as f64;
            SignalResult {
                message: format!(
                    "📉 Market fell {:.2}% → SELL PUT {} @ ${:.2} for {} lots (~${} notional)",
                    pct_change,
                    best.strike,
                    best.price,
                    config::PUT_SELL_LOTS,
                    fmt_thousands(total_notional)
                ),
                details: Some(SignalDetails::Selection(SelectedContract {
                    strike: best.strike,
                    symbol: best.symbol.clone(),
                    price: best.price,
                    distance: (best.strike - current_price).abs(),
                })),
            }
        }
        None => SignalResult {
            message: format!(
                "📉 Market fell >1%, but no matching OTM puts found in ${:.0}–${:.0} range.",
                config::PUT_SELL_BAND_LOW,
                config::PUT_SELL_BAND_HIGH
            ),
            details: None,
        },
    }
}

// -----------------------------------------------
// RULE B: DUAL-BAND OTM SCAN
// -----------------------------------------------

/// Scan both legs for OTM contracts inside the mid-premium band. Does not
/// consult the reference price.
pub fn otm_band_scan(
    chain: &ChainTable,
    current_price: f64,
    _reference_price: Option<f64>,
) -> SignalResult {
    let otm_calls = processor::select_otm_in_band(
        chain,
        current_price,
        OptionLeg::Call,
        config::SCAN_BAND_LOW,
        config::SCAN_BAND_HIGH,
    );
    let otm_puts = processor::select_otm_in_band(
        chain,
        current_price,
        OptionLeg::Put,
        config::SCAN_BAND_LOW,
        config::SCAN_BAND_HIGH,
    );

    let message = format!(
        "📊 Found {} OTM Calls and {} OTM Puts in ${:.0}–${:.0} range.",
        otm_calls.len(),
        otm_puts.len(),
        config::SCAN_BAND_LOW,
        config::SCAN_BAND_HIGH
    );

    let mut tagged: Vec<TaggedMatch> = Vec::with_capacity(otm_calls.len() + otm_puts.len());
    tagged.extend(otm_calls.into_iter().map(|m| TaggedMatch {
        side: "Calls".to_string(),
        strike: m.strike,
        symbol: m.symbol,
        price: m.price,
    }));
    tagged.extend(otm_puts.into_iter().map(|m| TaggedMatch {
        side: "Puts".to_string(),
        strike: m.strike,
        symbol: m.symbol,
        price: m.price,
    }));

    SignalResult {
        message,
        details: if tagged.is_empty() {
            None
        } else {
            Some(SignalDetails::BandScan(tagged))
        },
    }
}

/// Group integer digits with commas, two decimal places: 6900 -> "6,900.00"
fn fmt_thousands(amount: f64) -> String {
    let formatted = format!("{:.2}", amount);
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}{}.{}", sign, grouped, frac_part)
}

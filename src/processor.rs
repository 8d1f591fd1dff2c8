use crate::models::{ContractRecord, ContractType};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;

/// A coerced mark-price cell. Unparseable cells carry an explicit marker
/// and fail every numeric comparison; an absent leg is `Value(0.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceCell {
    Value(f64),
    Invalid,
}

impl PriceCell {
    pub fn value(self) -> Option<f64> {
        match self {
            PriceCell::Value(v) => Some(v),
            PriceCell::Invalid => None,
        }
    }

    /// Inclusive band check; false for invalid cells
    pub fn in_band(self, low: f64, high: f64) -> bool {
        match self {
            PriceCell::Value(v) => v >= low && v <= high,
            PriceCell::Invalid => false,
        }
    }
}

impl Serialize for PriceCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // number, or null for the invalid marker
        self.value().serialize(serializer)
    }
}

/// One strike's combined call/put data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainRow {
    pub strike: f64,
    pub call_symbol: String,
    pub call_price: PriceCell,
    pub put_symbol: String,
    pub put_price: PriceCell,
}

impl ChainRow {
    fn empty(strike: f64) -> Self {
        Self {
            strike,
            call_symbol: String::new(),
            call_price: PriceCell::Value(0.0),
            put_symbol: String::new(),
            put_price: PriceCell::Value(0.0),
        }
    }
}

/// Strike-indexed chain table: unique strikes, ascending order.
/// Built fresh per evaluation cycle; rules only ever borrow it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChainTable {
    rows: Vec<ChainRow>,
}

impl ChainTable {
    pub fn rows(&self) -> &[ChainRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Coerce a loose JSON cell to a number. Accepts numbers and numeric strings.
pub fn numeric_cell(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn price_cell(raw: Option<&Value>) -> PriceCell {
    match numeric_cell(raw) {
        Some(v) => PriceCell::Value(v),
        None => PriceCell::Invalid,
    }
}

/// Build the per-strike chain table from raw contract records.
///
/// Emits one row for every strike present on either side, with the absent
/// leg defaulted (empty symbol, price 0). Records whose strike cell cannot
/// be coerced are dropped since the strike is the row key. The caller is
/// expected to have narrowed records to one underlying and one expiry.
pub fn build_chain(records: &[ContractRecord]) -> ChainTable {
    let mut rows: Vec<ChainRow> = Vec::new();

    for rec in records {
        let Some(strike) = numeric_cell(rec.strike_price.as_ref()) else {
            continue;
        };

        let idx = match rows.iter().position(|r| r.strike == strike) {
            Some(i) => i,
            None => {
                rows.push(ChainRow::empty(strike));
                rows.len() - 1
            }
        };

        let price = price_cell(rec.mark_price.as_ref());
        match rec.contract_type {
            ContractType::CallOptions => {
                rows[idx].call_symbol = rec.symbol.clone();
                rows[idx].call_price = price;
            }
            ContractType::PutOptions => {
                rows[idx].put_symbol = rec.symbol.clone();
                rows[idx].put_price = price;
            }
        }
    }

    rows.sort_by(|a, b| a.strike.partial_cmp(&b.strike).unwrap_or(Ordering::Equal));

    ChainTable { rows }
}

// -----------------------------------------------
// FILTER PRIMITIVES
// -----------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionLeg {
    Call,
    Put,
}

/// One chain row narrowed to a single leg
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandMatch {
    pub strike: f64,
    pub symbol: String,
    pub price: f64,
}

/// Select out-of-the-money rows whose leg price sits inside [low, high].
///
/// Calls are OTM above spot, puts below. Bounds are inclusive; rows with an
/// invalid price cell never match. Result order follows the chain table
/// (ascending strike).
pub fn select_otm_in_band(
    chain: &ChainTable,
    spot: f64,
    leg: OptionLeg,
    low: f64,
    high: f64,
) -> Vec<BandMatch> {
    chain
        .rows()
        .iter()
        .filter_map(|row| {
            let (otm, symbol, price) = match leg {
                OptionLeg::Call => (row.strike > spot, &row.call_symbol, row.call_price),
                OptionLeg::Put => (row.strike < spot, &row.put_symbol, row.put_price),
            };
            if otm && price.in_band(low, high) {
                Some(BandMatch {
                    strike: row.strike,
                    symbol: symbol.clone(),
                    price: price.value()?,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Pick the candidate closest to spot. Exact distance ties go to the lower
/// strike, regardless of input order.
pub fn closest_to_spot(candidates: &[BandMatch], spot: f64) -> Option<&BandMatch> {
    candidates.iter().min_by(|a, b| {
        let da = (a.strike - spot).abs();
        let db = (b.strike - spot).abs();
        da.partial_cmp(&db)
            .unwrap_or(Ordering::Equal)
            .then(a.strike.partial_cmp(&b.strike).unwrap_or(Ordering::Equal))
    })
}

use delta_analyzer::models::{ContractRecord, ContractType};
use delta_analyzer::processor::build_chain;
use delta_analyzer::rules::{SignalDetails, run_strategy, strategy_names};
use serde_json::json;

fn put(symbol: &str, strike: f64, mark: f64) -> ContractRecord {
    ContractRecord {
        symbol: symbol.to_string(),
        contract_type: ContractType::PutOptions,
        strike_price: Some(json!(strike)),
        mark_price: Some(json!(mark)),
    }
}

fn call(symbol: &str, strike: f64, mark: f64) -> ContractRecord {
    ContractRecord {
        symbol: symbol.to_string(),
        contract_type: ContractType::CallOptions,
        strike_price: Some(json!(strike)),
        mark_price: Some(json!(mark)),
    }
}

const PUT_SELL: &str = "Sell OTM Put if BTC falls >1% (270-330 range)";
const BAND_SCAN: &str = "OTM Calls & Puts in $100-200 range";

#[test]
fn test_market_fall_sells_put_closest_to_spot() {
    // puts at 60000/280 and 61000/300, spot 62000, reference 63000 (-1.59%)
    let chain = build_chain(&[put("P-60000", 60000.0, 280.0), put("P-61000", 61000.0, 300.0)]);

    let result = run_strategy(&chain, 62000.0, Some(63000.0), Some(PUT_SELL));

    assert!(result.message.contains("SELL PUT 61000"), "{}", result.message);
    assert!(result.message.contains("$6,900.00"), "{}", result.message);

    match result.details {
        Some(SignalDetails::Selection(selected)) => {
            assert_eq!(selected.strike, 61000.0);
            assert_eq!(selected.symbol, "P-61000");
            assert_eq!(selected.price, 300.0);
            assert_eq!(selected.distance, 1000.0);
        }
        other => panic!("expected a selected contract, got {:?}", other),
    }
}

#[test]
fn test_small_dip_yields_no_signal() {
    // reference 62100 puts the change around -0.16%
    let chain = build_chain(&[put("P-60000", 60000.0, 280.0), put("P-61000", 61000.0, 300.0)]);

    let result = run_strategy(&chain, 62000.0, Some(62100.0), Some(PUT_SELL));

    assert!(result.message.contains("-0.16"), "{}", result.message);
    assert!(result.message.contains("no sell signal"), "{}", result.message);
    assert!(result.details.is_none());
}

#[test]
fn test_band_scan_tags_both_legs() {
    let chain = build_chain(&[call("C-65000", 65000.0, 150.0), put("P-60000", 60000.0, 180.0)]);

    let result = run_strategy(&chain, 62000.0, None, Some(BAND_SCAN));

    assert!(
        result.message.contains("1 OTM Calls and 1 OTM Puts"),
        "{}",
        result.message
    );

    match result.details {
        Some(SignalDetails::BandScan(rows)) => {
            assert_eq!(rows.len(), 2);
            // calls first, then puts
            assert_eq!(rows[0].side, "Calls");
            assert_eq!(rows[0].symbol, "C-65000");
            assert_eq!(rows[1].side, "Puts");
            assert_eq!(rows[1].symbol, "P-60000");
        }
        other => panic!("expected tagged band rows, got {:?}", other),
    }
}

#[test]
fn test_band_scan_ignores_missing_reference() {
    let chain = build_chain(&[call("C-65000", 65000.0, 150.0)]);

    let with_ref = run_strategy(&chain, 62000.0, Some(63000.0), Some(BAND_SCAN));
    let without_ref = run_strategy(&chain, 62000.0, None, Some(BAND_SCAN));
    assert_eq!(with_ref, without_ref);
}

#[test]
fn test_empty_chain_never_raises() {
    let chain = build_chain(&[]);

    for name in strategy_names() {
        let result = run_strategy(&chain, 62000.0, Some(63000.0), Some(name));
        assert!(result.details.is_none(), "{}: {:?}", name, result.details);
        assert!(!result.message.is_empty());
    }
}

#[test]
fn test_unknown_strategy_reports_not_found() {
    let chain = build_chain(&[put("P-60000", 60000.0, 280.0)]);

    let result = run_strategy(&chain, 62000.0, Some(63000.0), Some("does-not-exist"));
    assert_eq!(result.message, "❌ Strategy not found.");
    assert!(result.details.is_none());
}

#[test]
fn test_default_dispatch_matches_named_dispatch() {
    let chain = build_chain(&[put("P-61000", 61000.0, 300.0)]);

    let by_default = run_strategy(&chain, 62000.0, Some(63000.0), None);
    let by_name = run_strategy(&chain, 62000.0, Some(63000.0), Some(PUT_SELL));
    assert_eq!(by_default, by_name);
}

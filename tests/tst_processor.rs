use delta_analyzer::models::{ContractRecord, ContractType};
use delta_analyzer::processor::{OptionLeg, PriceCell, build_chain, select_otm_in_band};
use serde_json::{Value, json};

fn rec(contract_type: ContractType, symbol: &str, strike: Value, mark: Value) -> ContractRecord {
    ContractRecord {
        symbol: symbol.to_string(),
        contract_type,
        strike_price: Some(strike),
        mark_price: Some(mark),
    }
}

fn mixed_records() -> Vec<ContractRecord> {
    vec![
        rec(ContractType::CallOptions, "C-BTC-64000", json!("64000"), json!("95.5")),
        rec(ContractType::PutOptions, "P-BTC-60000", json!("60000"), json!("180")),
        rec(ContractType::CallOptions, "C-BTC-63000", json!("63000"), json!("150")),
        rec(ContractType::PutOptions, "P-BTC-63000", json!("63000"), json!("520")),
        rec(ContractType::PutOptions, "P-BTC-61000", json!(61000), json!(120.25)),
        rec(ContractType::CallOptions, "C-BTC-60000", json!("60000"), json!("2100")),
    ]
}

#[test]
fn test_strikes_unique_and_sorted_ascending() {
    let chain = build_chain(&mixed_records());

    let strikes: Vec<f64> = chain.rows().iter().map(|r| r.strike).collect();
    assert_eq!(strikes, vec![60000.0, 61000.0, 63000.0, 64000.0]);

    // union of both sides, no duplicates
    let mut deduped = strikes.clone();
    deduped.dedup();
    assert_eq!(deduped.len(), strikes.len());
}

#[test]
fn test_rebuild_yields_identical_table() {
    let records = mixed_records();
    let first = build_chain(&records);
    let second = build_chain(&records);
    assert_eq!(first, second);
}

#[test]
fn test_both_legs_merged_onto_one_row() {
    let chain = build_chain(&mixed_records());

    let row = chain
        .rows()
        .iter()
        .find(|r| r.strike == 63000.0)
        .expect("63000 row");
    assert_eq!(row.call_symbol, "C-BTC-63000");
    assert_eq!(row.call_price, PriceCell::Value(150.0));
    assert_eq!(row.put_symbol, "P-BTC-63000");
    assert_eq!(row.put_price, PriceCell::Value(520.0));
}

#[test]
fn test_band_selection_invariants_hold() {
    let chain = build_chain(&mixed_records());
    let spot = 62000.0;

    let calls = select_otm_in_band(&chain, spot, OptionLeg::Call, 100.0, 200.0);
    for m in &calls {
        assert!(m.strike > spot);
        assert!(m.price >= 100.0 && m.price <= 200.0);
    }
    // 64000 call priced 95.5 sits below the band
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].symbol, "C-BTC-63000");

    let puts = select_otm_in_band(&chain, spot, OptionLeg::Put, 100.0, 200.0);
    for m in &puts {
        assert!(m.strike < spot);
        assert!(m.price >= 100.0 && m.price <= 200.0);
    }
    assert_eq!(puts.len(), 2);

    // chain order preserved: ascending strike
    assert!(puts[0].strike < puts[1].strike);
}

#[test]
fn test_empty_records_give_empty_table() {
    let chain = build_chain(&[]);
    assert!(chain.is_empty());
    assert!(select_otm_in_band(&chain, 62000.0, OptionLeg::Put, 0.0, 1.0e9).is_empty());
}

#[test]
fn test_invalid_price_rows_never_selected() {
    let records = vec![
        rec(ContractType::PutOptions, "P-GOOD", json!("61000"), json!("300")),
        rec(ContractType::PutOptions, "P-BAD", json!("60500"), json!([1, 2])),
        rec(ContractType::PutOptions, "P-NULL", json!("60250"), json!(null)),
    ];
    let chain = build_chain(&records);
    assert_eq!(chain.len(), 3);

    let puts = select_otm_in_band(&chain, 62000.0, OptionLeg::Put, 0.0, 1.0e9);
    assert_eq!(puts.len(), 1);
    assert_eq!(puts[0].symbol, "P-GOOD");
}

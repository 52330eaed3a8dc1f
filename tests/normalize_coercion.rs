// tests/normalize_coercion.rs
use serde_json::json;

use fmp_quarterly_loader::normalize::coerce_timestamp;
use fmp_quarterly_loader::{Dataset, RawRecord, Ratios, Repurchases};

fn record(v: serde_json::Value) -> RawRecord {
    v.as_object().cloned().unwrap()
}

#[test]
fn malformed_numerics_coerce_to_null_across_the_row() {
    let raw = record(json!({
        "symbol": "BRK-B",
        "date": "2024-06-30",
        "bookValuePerShare": "",
        "priceToBookRatio": "abc",
        "currentRatio": true,
        "quickRatio": null,
        "fiscalYear": "n/a",
    }));

    let row = Ratios::normalize(raw);
    assert!(row.book_value_per_share.is_none());
    assert!(row.price_to_book_ratio.is_none());
    assert!(row.current_ratio.is_none());
    assert!(row.quick_ratio.is_none());
    assert!(row.fiscal_year.is_none());
}

#[test]
fn accepted_date_uses_naive_then_iso_then_null() {
    // FMP's usual naive format
    let naive = record(json!({"acceptedDate": "2024-05-01 00:00:00"}));
    let row = Repurchases::normalize(naive);
    assert_eq!(row.accepted_at.as_deref(), Some("2024-05-01T00:00:00"));

    // Already full ISO with offset
    let iso = record(json!({"acceptedDate": "2024-05-01T09:15:00+02:00"}));
    let row = Repurchases::normalize(iso);
    assert_eq!(row.accepted_at.as_deref(), Some("2024-05-01T09:15:00+02:00"));

    // Unparseable
    let bad = record(json!({"acceptedDate": "not-a-date"}));
    let row = Repurchases::normalize(bad);
    assert!(row.accepted_at.is_none());
}

#[test]
fn coerce_timestamp_is_total_over_junk() {
    for junk in ["", "   ", "not-a-date", "2024-99-99 00:00:00", "12:30"] {
        assert!(coerce_timestamp(junk).is_none(), "{junk:?} should be null");
    }
}

#[test]
fn at_most_one_row_per_raw_record() {
    let raw = record(json!({"symbol": "BRK-B", "date": "2024-03-31"}));
    // normalize is a plain function: one record in, exactly one row out.
    let row = Repurchases::normalize(raw);
    assert_eq!(row.symbol.as_deref(), Some("BRK-B"));
}

// src/normalize/mod.rs
//
// Pure normalization: every helper maps a provider field to either a typed
// value or `None`. Nothing in this module can fail a run.

pub mod ratios;
pub mod repurchases;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::fetch::RawRecord;

/// Constant tag identifying the provider in persisted rows.
pub const SOURCE_TAG: &str = "FMP";

/// Rows carrying the (symbol, date) natural key. The filter stage keeps only
/// rows where both halves are present and non-empty.
pub trait NaturalKey {
    fn symbol(&self) -> Option<&str>;
    fn date(&self) -> Option<&str>;

    fn has_natural_key(&self) -> bool {
        matches!(
            (self.symbol(), self.date()),
            (Some(s), Some(d)) if !s.is_empty() && !d.is_empty()
        )
    }
}

/// One of the two structurally identical pipelines: names its provider
/// endpoint and destination table, and owns the raw-to-row mapping plus the
/// verifier's column list and highlight formatting.
pub trait Dataset {
    /// Human label for logs ("cash-flow repurchases", "financial ratios").
    const LABEL: &'static str;
    /// Provider endpoint path segment under the FMP base URL.
    const ENDPOINT: &'static str;
    /// Destination table name.
    const TABLE: &'static str;
    /// Column list the verifier reads back.
    const VERIFY_COLUMNS: &'static str;

    type Row: serde::Serialize + NaturalKey + Send;

    /// Map one raw provider record into the table schema. Pure; never fails;
    /// malformed fields coerce to null.
    fn normalize(raw: RawRecord) -> Self::Row;

    /// Optional human-readable line for one persisted row in the summary.
    fn highlight(row: &Value) -> Option<String>;
}

/// String passthrough; absent, null, non-string, or empty → `None`.
pub fn opt_str(raw: &RawRecord, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Safe float coercion: JSON numbers pass through, numeric strings parse,
/// everything else (bool, null, empty/non-numeric string) → `None`.
pub fn opt_f64(raw: &RawRecord, key: &str) -> Option<f64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Safe integer coercion with the same policy. FMP sends `fiscalYear` as a
/// string on some records and a number on others.
pub fn opt_i64(raw: &RawRecord, key: &str) -> Option<i64> {
    match raw.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Timestamp coercion for fields like FMP's `acceptedDate`, which usually
/// arrives as a naive `"YYYY-MM-DD HH:MM:SS"` but not always.
pub fn opt_timestamp(raw: &RawRecord, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(Value::as_str)
        .and_then(coerce_timestamp)
}

/// Dual-parse: strict naive format first, then a general ISO fallback.
/// Naive inputs are treated as UTC-naive and re-emitted without an offset;
/// inputs that carry an offset keep it. Unparseable → `None`.
pub fn coerce_timestamp(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.to_rfc3339());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(format!("{}T00:00:00", d.format("%Y-%m-%d")));
    }
    None
}

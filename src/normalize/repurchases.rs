//! Cash-flow repurchases dataset: one row per reporting period, carrying the
//! `commonStockRepurchased` line item from the FMP cash-flow statement.

use serde::Serialize;
use serde_json::Value;

use crate::fetch::RawRecord;
use crate::normalize::{
    opt_f64, opt_i64, opt_str, opt_timestamp, Dataset, NaturalKey, SOURCE_TAG,
};

#[derive(Debug, Clone, Serialize)]
pub struct RepurchaseRow {
    pub symbol: Option<String>,
    pub date: Option<String>,
    pub cik: Option<String>,
    pub reported_currency: Option<String>,
    pub filing_date: Option<String>,
    pub accepted_at: Option<String>,
    pub fiscal_year: Option<i64>,
    pub period: Option<String>,
    pub common_stock_repurchased: Option<f64>,
    /// Verbatim provider payload, retained for audit.
    pub raw: Value,
    pub source: &'static str,
}

impl NaturalKey for RepurchaseRow {
    fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

pub struct Repurchases;

impl Dataset for Repurchases {
    const LABEL: &'static str = "cash-flow repurchases";
    const ENDPOINT: &'static str = "cash-flow-statement";
    const TABLE: &'static str = "common_stock_repurchases";
    const VERIFY_COLUMNS: &'static str = "symbol,date,period,fiscal_year,common_stock_repurchased";

    type Row = RepurchaseRow;

    fn normalize(raw: RawRecord) -> RepurchaseRow {
        RepurchaseRow {
            symbol: opt_str(&raw, "symbol"),
            // already an ISO date (YYYY-MM-DD), pass through
            date: opt_str(&raw, "date"),
            cik: opt_str(&raw, "cik"),
            reported_currency: opt_str(&raw, "reportedCurrency"),
            filing_date: opt_str(&raw, "filingDate"),
            accepted_at: opt_timestamp(&raw, "acceptedDate"),
            fiscal_year: opt_i64(&raw, "fiscalYear"),
            period: opt_str(&raw, "period"),
            common_stock_repurchased: opt_f64(&raw, "commonStockRepurchased"),
            raw: Value::Object(raw),
            source: SOURCE_TAG,
        }
    }

    fn highlight(row: &Value) -> Option<String> {
        let amount = row.get("common_stock_repurchased")?.as_f64()?;
        if amount == 0.0 {
            return None;
        }
        let period = row.get("period").and_then(Value::as_str).unwrap_or("?");
        let year = row.get("fiscal_year").and_then(Value::as_i64);
        let billions = amount.abs() / 1_000_000_000.0;
        Some(match year {
            Some(y) => format!("{period} {y}: ${billions:.1}B"),
            None => format!("{period}: ${billions:.1}B"),
        })
    }
}

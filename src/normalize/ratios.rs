//! Financial-ratios dataset: valuation, margin, liquidity, and per-share
//! metrics for one reporting period. Every metric is independently nullable.

use serde::Serialize;
use serde_json::Value;

use crate::fetch::RawRecord;
use crate::normalize::{opt_f64, opt_i64, opt_str, Dataset, NaturalKey, SOURCE_TAG};

#[derive(Debug, Clone, Serialize)]
pub struct RatioRow {
    pub symbol: Option<String>,
    pub date: Option<String>,
    pub fiscal_year: Option<i64>,
    pub period: Option<String>,
    pub reported_currency: String,

    // Key ratios we target
    pub book_value_per_share: Option<f64>,
    pub price_to_book_ratio: Option<f64>,

    // Additional valuation / margin / liquidity ratios
    pub price_to_earnings_ratio: Option<f64>,
    pub price_to_sales_ratio: Option<f64>,
    pub net_profit_margin: Option<f64>,
    pub gross_profit_margin: Option<f64>,
    pub operating_profit_margin: Option<f64>,
    pub debt_to_equity_ratio: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,

    // Per-share metrics
    pub revenue_per_share: Option<f64>,
    pub net_income_per_share: Option<f64>,
    pub cash_per_share: Option<f64>,
    pub free_cash_flow_per_share: Option<f64>,

    pub source: &'static str,
    /// Verbatim provider payload, retained for audit. The ratios table names
    /// this column `raw_data`, unlike the repurchases table's `raw`.
    pub raw_data: Value,
}

impl NaturalKey for RatioRow {
    fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }
    fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}

pub struct Ratios;

impl Dataset for Ratios {
    const LABEL: &'static str = "financial ratios";
    const ENDPOINT: &'static str = "ratios";
    const TABLE: &'static str = "financial_ratios";
    const VERIFY_COLUMNS: &'static str =
        "symbol,date,period,fiscal_year,book_value_per_share,price_to_book_ratio";

    type Row = RatioRow;

    fn normalize(raw: RawRecord) -> RatioRow {
        RatioRow {
            symbol: opt_str(&raw, "symbol"),
            date: opt_str(&raw, "date"),
            fiscal_year: opt_i64(&raw, "fiscalYear"),
            period: opt_str(&raw, "period"),
            reported_currency: opt_str(&raw, "reportedCurrency")
                .unwrap_or_else(|| "USD".to_string()),

            book_value_per_share: opt_f64(&raw, "bookValuePerShare"),
            price_to_book_ratio: opt_f64(&raw, "priceToBookRatio"),

            price_to_earnings_ratio: opt_f64(&raw, "priceToEarningsRatio"),
            price_to_sales_ratio: opt_f64(&raw, "priceToSalesRatio"),
            net_profit_margin: opt_f64(&raw, "netProfitMargin"),
            gross_profit_margin: opt_f64(&raw, "grossProfitMargin"),
            operating_profit_margin: opt_f64(&raw, "operatingProfitMargin"),
            debt_to_equity_ratio: opt_f64(&raw, "debtToEquityRatio"),
            current_ratio: opt_f64(&raw, "currentRatio"),
            quick_ratio: opt_f64(&raw, "quickRatio"),

            revenue_per_share: opt_f64(&raw, "revenuePerShare"),
            net_income_per_share: opt_f64(&raw, "netIncomePerShare"),
            cash_per_share: opt_f64(&raw, "cashPerShare"),
            free_cash_flow_per_share: opt_f64(&raw, "freeCashFlowPerShare"),

            source: SOURCE_TAG,
            raw_data: Value::Object(raw),
        }
    }

    fn highlight(row: &Value) -> Option<String> {
        let period = row.get("period").and_then(Value::as_str).unwrap_or("?");
        let year = row.get("fiscal_year").and_then(Value::as_i64);
        let bvps = row.get("book_value_per_share").and_then(Value::as_f64);
        let pb = row.get("price_to_book_ratio").and_then(Value::as_f64);
        if bvps.is_none() && pb.is_none() {
            return None;
        }
        let bvps_str = bvps.map_or_else(|| "N/A".to_string(), |v| format!("${v:.2}"));
        let pb_str = pb.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"));
        Some(match year {
            Some(y) => format!("{period} {y}: BVPS={bvps_str}, P/B={pb_str}"),
            None => format!("{period}: BVPS={bvps_str}, P/B={pb_str}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_defaults_to_usd_when_absent() {
        let row = Ratios::normalize(RawRecord::new());
        assert_eq!(row.reported_currency, "USD");
    }

    #[test]
    fn metrics_coerce_independently() {
        let raw = json!({
            "symbol": "BRK-B",
            "date": "2024-06-30",
            "fiscalYear": 2024,
            "period": "Q2",
            "bookValuePerShare": "417.32",
            "priceToBookRatio": 1.56,
            "currentRatio": "not-a-number",
            "quickRatio": null,
        })
        .as_object()
        .cloned()
        .unwrap();

        let row = Ratios::normalize(raw);
        assert_eq!(row.book_value_per_share, Some(417.32));
        assert_eq!(row.price_to_book_ratio, Some(1.56));
        assert_eq!(row.current_ratio, None);
        assert_eq!(row.quick_ratio, None);
        assert!(row.has_natural_key());
    }

    #[test]
    fn highlight_formats_bvps_and_pb() {
        let row = json!({
            "period": "Q2",
            "fiscal_year": 2024,
            "book_value_per_share": 417.321,
            "price_to_book_ratio": 1.557,
        });
        assert_eq!(
            Ratios::highlight(&row).unwrap(),
            "Q2 2024: BVPS=$417.32, P/B=1.56"
        );
    }

    #[test]
    fn highlight_none_when_both_metrics_missing() {
        let row = json!({"period": "Q2", "fiscal_year": 2024});
        assert!(Ratios::highlight(&row).is_none());
    }
}

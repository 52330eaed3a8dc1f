// src/report.rs
//
// Verifier: read-only sanity check after a run. Failures here are reported by
// the caller, never fatal to the pipeline itself.

use serde_json::Value;
use std::fmt;

use crate::error::Result;
use crate::normalize::Dataset;
use crate::store::TableStore;

/// Human-oriented summary of what the store holds for one symbol.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub table: &'static str,
    pub symbol: String,
    pub rows: usize,
    pub earliest: Option<String>,
    pub latest: Option<String>,
    pub highlights: Vec<String>,
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows == 0 {
            return write!(f, "{}: no rows found for {}", self.table, self.symbol);
        }
        writeln!(
            f,
            "{}: {} rows for {}, {} to {}",
            self.table,
            self.rows,
            self.symbol,
            self.earliest.as_deref().unwrap_or("?"),
            self.latest.as_deref().unwrap_or("?"),
        )?;
        for line in &self.highlights {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

/// Re-read persisted rows for `symbol` ordered by ascending date and distill
/// them into a summary. An empty result set is a valid (if suspicious) report.
pub async fn summarize<D: Dataset>(store: &dyn TableStore, symbol: &str) -> Result<SummaryReport> {
    let rows = store
        .fetch_ordered(D::TABLE, D::VERIFY_COLUMNS, symbol)
        .await?;

    let date_of = |row: &Value| {
        row.get("date")
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    let earliest = rows.first().and_then(date_of);
    let latest = rows.last().and_then(date_of);
    let highlights = rows.iter().filter_map(D::highlight).collect();

    Ok(SummaryReport {
        table: D::TABLE,
        symbol: symbol.to_string(),
        rows: rows.len(),
        earliest,
        latest,
        highlights,
    })
}

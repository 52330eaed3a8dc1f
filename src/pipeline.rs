// src/pipeline.rs
//
// Fetch → normalize → filter → batched upsert, strictly sequential. The only
// errors that leave this module are transport, storage, and serialization
// failures; per-record defects become dropped rows or null fields upstream.

use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{Period, RecordSource};
use crate::normalize::{Dataset, NaturalKey};
use crate::store::{upsert_in_batches, TableStore};

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "loader_records_fetched_total",
            "Raw records returned by the provider."
        );
        describe_counter!(
            "loader_rows_valid_total",
            "Normalized rows that kept their (symbol, date) key."
        );
        describe_counter!(
            "loader_rows_dropped_total",
            "Normalized rows dropped for a missing symbol or date."
        );
        describe_counter!(
            "loader_upsert_batches_total",
            "Upsert chunks written to the table store."
        );
        describe_counter!(
            "loader_shape_errors_total",
            "Provider payloads that were not the expected array."
        );
    });
}

/// Parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub symbol: String,
    pub period: Period,
    pub limit: u32,
    pub batch_size: usize,
}

impl From<&Config> for JobSpec {
    fn from(cfg: &Config) -> Self {
        Self {
            symbol: cfg.symbol.clone(),
            period: cfg.period,
            limit: cfg.limit,
            batch_size: cfg.batch_size,
        }
    }
}

/// Counters surfaced to the caller after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounts {
    pub fetched: usize,
    pub valid: usize,
    pub dropped: usize,
    pub batches: usize,
}

/// Keep only rows whose (symbol, date) natural key is present and non-empty.
/// Dropped rows are silent per-row; the count is returned for diagnostics.
pub fn filter_keyed<R: NaturalKey>(rows: Vec<R>) -> (Vec<R>, usize) {
    let mut dropped = 0usize;
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if row.has_natural_key() {
            kept.push(row);
        } else {
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Run one dataset end to end: fetch all periods, normalize each record,
/// filter key-less rows, and upsert the rest in order-preserving batches.
pub async fn run_dataset<D: Dataset>(
    source: &dyn RecordSource,
    store: &dyn TableStore,
    job: &JobSpec,
) -> Result<RunCounts> {
    ensure_metrics_described();

    tracing::info!(
        dataset = D::LABEL,
        symbol = %job.symbol,
        period = %job.period,
        limit = job.limit,
        "fetching from provider"
    );
    let raw = source
        .fetch(D::ENDPOINT, &job.symbol, job.period, job.limit)
        .await?;
    let fetched = raw.len();
    counter!("loader_records_fetched_total").increment(fetched as u64);
    tracing::info!(dataset = D::LABEL, fetched, "fetched records");

    let rows: Vec<D::Row> = raw.into_iter().map(D::normalize).collect();
    let (kept, dropped) = filter_keyed(rows);
    counter!("loader_rows_valid_total").increment(kept.len() as u64);
    counter!("loader_rows_dropped_total").increment(dropped as u64);
    if dropped > 0 {
        tracing::warn!(dataset = D::LABEL, dropped, "rows missing symbol/date dropped");
    }

    let values = kept
        .iter()
        .map(serde_json::to_value)
        .collect::<std::result::Result<Vec<Value>, _>>()?;

    let batches = upsert_in_batches(store, D::TABLE, &values, job.batch_size).await?;
    counter!("loader_upsert_batches_total").increment(batches as u64);
    tracing::info!(
        dataset = D::LABEL,
        table = D::TABLE,
        rows = values.len(),
        batches,
        "upsert complete"
    );

    Ok(RunCounts {
        fetched,
        valid: values.len(),
        dropped,
        batches,
    })
}

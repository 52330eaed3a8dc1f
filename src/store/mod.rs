// src/store/mod.rs
pub mod supabase;

use serde_json::Value;

use crate::error::Result;

/// Upsert-capable table store keyed on (symbol, date). One `upsert` call is
/// one backend request; chunking across requests lives in
/// [`upsert_in_batches`].
#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    /// Write one chunk of rows. Conflict target is (symbol, date); an existing
    /// row with that key is fully replaced by the new one, never merged.
    async fn upsert(&self, table: &str, rows: &[Value]) -> Result<()>;

    /// Read back all rows for `symbol`, ascending by date.
    async fn fetch_ordered(&self, table: &str, select: &str, symbol: &str) -> Result<Vec<Value>>;
}

/// Partition `rows` into consecutive chunks of at most `batch_size` and write
/// each as one upsert, preserving input order. Empty input performs no storage
/// call. The first failing chunk aborts; chunks already written stay written
/// (re-running is safe, the upsert is idempotent by natural key).
pub async fn upsert_in_batches(
    store: &dyn TableStore,
    table: &str,
    rows: &[Value],
    batch_size: usize,
) -> Result<usize> {
    if rows.is_empty() {
        return Ok(0);
    }
    let mut batches = 0usize;
    for chunk in rows.chunks(batch_size.max(1)) {
        store.upsert(table, chunk).await?;
        batches += 1;
        tracing::debug!(table, batch = batches, rows = chunk.len(), "chunk upserted");
    }
    Ok(batches)
}

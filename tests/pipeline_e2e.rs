// tests/pipeline_e2e.rs
//
// End-to-end pipeline runs against an in-memory table store: filtering,
// idempotent upsert by (symbol, date), ordered read-back, and the
// unexpected-payload-shape guard.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use fmp_quarterly_loader::fetch::records_from_payload;
use fmp_quarterly_loader::{
    run_dataset, summarize, JobSpec, Period, RawRecord, RecordSource, Repurchases, Result,
    TableStore,
};

struct MockSource {
    payload: Value,
}

#[async_trait]
impl RecordSource for MockSource {
    async fn fetch(
        &self,
        endpoint: &str,
        _symbol: &str,
        _period: Period,
        _limit: u32,
    ) -> Result<Vec<RawRecord>> {
        Ok(records_from_payload(endpoint, self.payload.clone()))
    }
}

/// Upsert-semantics table store: rows keyed by (symbol, date), later writes
/// replace earlier ones wholesale.
#[derive(Default)]
struct MemoryStore {
    tables: Mutex<HashMap<String, BTreeMap<(String, String), Value>>>,
    chunk_sizes: Mutex<Vec<usize>>,
}

impl MemoryStore {
    fn chunk_sizes(&self) -> Vec<usize> {
        self.chunk_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TableStore for MemoryStore {
    async fn upsert(&self, table: &str, rows: &[Value]) -> Result<()> {
        self.chunk_sizes.lock().unwrap().push(rows.len());
        let mut tables = self.tables.lock().unwrap();
        let t = tables.entry(table.to_string()).or_default();
        for row in rows {
            let key = (
                row.get("symbol").and_then(Value::as_str).unwrap_or_default().to_string(),
                row.get("date").and_then(Value::as_str).unwrap_or_default().to_string(),
            );
            t.insert(key, row.clone());
        }
        Ok(())
    }

    async fn fetch_ordered(&self, table: &str, _select: &str, symbol: &str) -> Result<Vec<Value>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .get(table)
            .map(|t| {
                t.iter()
                    .filter(|((s, _), _)| s == symbol)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn job() -> JobSpec {
    JobSpec {
        symbol: "BRK-B".to_string(),
        period: Period::Quarter,
        limit: 80,
        batch_size: 500,
    }
}

fn quarters_payload() -> Value {
    // Provider order is newest-first; one record is missing its date.
    json!([
        {
            "symbol": "BRK-B",
            "date": "2024-06-30",
            "period": "Q2",
            "fiscalYear": "2024",
            "acceptedDate": "2024-08-03 08:10:04",
            "commonStockRepurchased": -345000000.0,
        },
        {
            "symbol": "BRK-B",
            "date": "2024-03-31",
            "period": "Q1",
            "fiscalYear": "2024",
            "acceptedDate": "2024-05-04 08:02:11",
            "commonStockRepurchased": -2570000000.0,
        },
        {
            "symbol": "BRK-B",
            "period": "Q4",
            "fiscalYear": "2023",
        },
    ])
}

#[tokio::test]
async fn end_to_end_upserts_keyed_rows_in_date_order() {
    let source = MockSource {
        payload: quarters_payload(),
    };
    let store = MemoryStore::default();

    let counts = run_dataset::<Repurchases>(&source, &store, &job())
        .await
        .unwrap();
    assert_eq!(counts.fetched, 3);
    assert_eq!(counts.valid, 2);
    assert_eq!(counts.dropped, 1);
    assert_eq!(counts.batches, 1);

    let rows = store
        .fetch_ordered("common_stock_repurchases", "*", "BRK-B")
        .await
        .unwrap();
    let dates: Vec<_> = rows
        .iter()
        .map(|r| r.get("date").and_then(Value::as_str).unwrap())
        .collect();
    assert_eq!(dates, vec!["2024-03-31", "2024-06-30"]);

    // Dual-parse timestamp survived normalization.
    assert_eq!(
        rows[0].get("accepted_at").and_then(Value::as_str),
        Some("2024-05-04T08:02:11")
    );
}

#[tokio::test]
async fn rerunning_is_idempotent_and_last_write_wins() {
    let store = MemoryStore::default();

    let first = MockSource {
        payload: quarters_payload(),
    };
    run_dataset::<Repurchases>(&first, &store, &job())
        .await
        .unwrap();

    // Provider corrects the Q1 figure on the next pull.
    let mut corrected = quarters_payload();
    corrected[1]["commonStockRepurchased"] = json!(-2600000000.0);
    let second = MockSource { payload: corrected };
    run_dataset::<Repurchases>(&second, &store, &job())
        .await
        .unwrap();

    let rows = store
        .fetch_ordered("common_stock_repurchases", "*", "BRK-B")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2, "double upsert must not duplicate rows");
    assert_eq!(
        rows[0].get("common_stock_repurchased").and_then(Value::as_f64),
        Some(-2600000000.0),
        "conflicting row must hold the most recent normalization"
    );
}

#[tokio::test]
async fn mapping_shaped_payload_yields_empty_run_without_error() {
    let source = MockSource {
        payload: json!({"error": "rate limited"}),
    };
    let store = MemoryStore::default();

    let counts = run_dataset::<Repurchases>(&source, &store, &job())
        .await
        .unwrap();
    assert_eq!(counts.fetched, 0);
    assert_eq!(counts.valid, 0);
    assert_eq!(counts.batches, 0);
    assert!(store.chunk_sizes().is_empty(), "empty input must not hit the store");
}

#[tokio::test]
async fn summary_reports_date_range_and_buyback_highlights() {
    let source = MockSource {
        payload: quarters_payload(),
    };
    let store = MemoryStore::default();
    run_dataset::<Repurchases>(&source, &store, &job())
        .await
        .unwrap();

    let report = summarize::<Repurchases>(&store, "BRK-B").await.unwrap();
    assert_eq!(report.rows, 2);
    assert_eq!(report.earliest.as_deref(), Some("2024-03-31"));
    assert_eq!(report.latest.as_deref(), Some("2024-06-30"));
    assert!(report.highlights.contains(&"Q1 2024: $2.6B".to_string()));
}

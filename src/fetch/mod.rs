// src/fetch/mod.rs
pub mod fmp;

use crate::error::Result;
use metrics::counter;
use serde_json::Value;

/// One reporting period as the provider returned it: an opaque mapping with no
/// guaranteed fields. Everything downstream treats every key as optional.
pub type RawRecord = serde_json::Map<String, Value>;

/// Provider-defined reporting cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Quarter,
    Annual,
}

impl Period {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quarter => "quarter",
            Self::Annual => "annual",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quarter" | "quarterly" => Ok(Self::Quarter),
            "annual" | "yearly" => Ok(Self::Annual),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of raw provider records. One `fetch` call issues exactly one request;
/// transport failures propagate, shape defects do not.
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(
        &self,
        endpoint: &str,
        symbol: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<RawRecord>>;
}

/// Shape guard: the provider answers rate limits and auth failures with a JSON
/// object instead of the expected array. Anything that is not an array yields
/// an empty record set — "nothing to process", never an error.
pub fn records_from_payload(endpoint: &str, payload: Value) -> Vec<RawRecord> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            tracing::warn!(endpoint, payload = %other, "unexpected provider response shape");
            counter!("loader_shape_errors_total").increment(1);
            return Vec::new();
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Object(map) => out.push(map),
            other => {
                tracing::warn!(endpoint, item = %other, "skipping non-object array element");
            }
        }
    }
    out
}

// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::config::Config;
pub use crate::error::{LoaderError, Result};
pub use crate::fetch::{fmp::FmpClient, Period, RawRecord, RecordSource};
pub use crate::normalize::{ratios::Ratios, repurchases::Repurchases, Dataset};
pub use crate::pipeline::{run_dataset, JobSpec, RunCounts};
pub use crate::report::{summarize, SummaryReport};
pub use crate::store::{supabase::SupabaseStore, upsert_in_batches, TableStore};

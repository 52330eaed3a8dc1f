//! Quarterly Fundamentals Loader — Binary Entrypoint
//! One-shot run: pull FMP cash-flow repurchases and financial ratios for the
//! configured symbol and upsert them into Supabase, then print a read-back
//! summary per table. Idempotent by (symbol, date), so re-running is safe.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fmp_quarterly_loader::{
    run_dataset, summarize, Config, Dataset, FmpClient, JobSpec, Ratios, RecordSource,
    Repurchases, SupabaseStore, TableStore,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("fmp_quarterly_loader=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Run one dataset and print its summary. The verifier is diagnostic only:
/// its failure is logged, not fatal.
async fn run_and_report<D: Dataset>(
    source: &dyn RecordSource,
    store: &dyn TableStore,
    job: &JobSpec,
) -> anyhow::Result<()> {
    let counts = run_dataset::<D>(source, store, job).await?;
    println!(
        "{}: fetched {}, valid {} (dropped {}), {} upsert batch(es)",
        D::LABEL,
        counts.fetched,
        counts.valid,
        counts.dropped,
        counts.batches
    );

    match summarize::<D>(store, &job.symbol).await {
        Ok(report) => println!("{report}"),
        Err(e) => tracing::warn!(dataset = D::LABEL, error = ?e, "verification read failed"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Config::from_env()?;
    let source = FmpClient::new(&cfg)?;
    let store = SupabaseStore::new(&cfg)?;
    let job = JobSpec::from(&cfg);

    run_and_report::<Repurchases>(&source, &store, &job).await?;
    run_and_report::<Ratios>(&source, &store, &job).await?;

    println!("Done.");
    Ok(())
}

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::error::{LoaderError, Result};
use crate::fetch::{records_from_payload, Period, RawRecord, RecordSource};

/// Per-request timeout; exceeding it is a hard failure of that call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// FMP API client. Each dataset shares this client and names its own endpoint
/// path segment (`cash-flow-statement`, `ratios`, ...).
pub struct FmpClient {
    base: String,
    api_key: String,
    client: reqwest::Client,
}

impl FmpClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::with_base(&cfg.fmp_base, &cfg.fmp_api_key)
    }

    /// Build against an explicit base URL (tests, proxies).
    pub fn with_base(base: &str, api_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(LoaderError::Transport)?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }
}

#[async_trait]
impl RecordSource for FmpClient {
    async fn fetch(
        &self,
        endpoint: &str,
        symbol: &str,
        period: Period,
        limit: u32,
    ) -> Result<Vec<RawRecord>> {
        let url = format!("{}/{}", self.base, endpoint);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol),
                ("apikey", self.api_key.as_str()),
                ("period", period.as_str()),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(LoaderError::Transport)?
            .error_for_status()
            .map_err(LoaderError::Transport)?;

        let payload: Value = resp.json().await.map_err(LoaderError::Transport)?;
        Ok(records_from_payload(endpoint, payload))
    }
}

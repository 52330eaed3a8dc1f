//! Supabase table store, speaking PostgREST directly with the service-role
//! key. Upserts use `on_conflict=symbol,date` with
//! `Prefer: resolution=merge-duplicates`, which overwrites every supplied
//! column of a conflicting row; since rows serialize all columns (nulls
//! included), a conflict is a whole-row replacement.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::config::Config;
use crate::error::{LoaderError, Result};
use crate::store::TableStore;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SupabaseStore {
    base: String,
    service_key: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(cfg: &Config) -> Result<Self> {
        Self::with_base(&cfg.supabase_url, &cfg.supabase_service_role_key)
    }

    pub fn with_base(base: &str, service_key: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(LoaderError::StorageTransport)?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base, table)
    }
}

#[async_trait]
impl TableStore for SupabaseStore {
    async fn upsert(&self, table: &str, rows: &[Value]) -> Result<()> {
        let resp = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", "symbol,date")])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await
            .map_err(LoaderError::StorageTransport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LoaderError::StorageRejected {
                table: table.to_string(),
                status,
                body,
            });
        }
        Ok(())
    }

    async fn fetch_ordered(&self, table: &str, select: &str, symbol: &str) -> Result<Vec<Value>> {
        let resp = self
            .client
            .get(self.table_url(table))
            .query(&[
                ("select", select),
                ("symbol", &format!("eq.{symbol}")),
                ("order", "date.asc"),
            ])
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await
            .map_err(LoaderError::StorageTransport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LoaderError::StorageRejected {
                table: table.to_string(),
                status,
                body,
            });
        }
        resp.json().await.map_err(LoaderError::StorageTransport)
    }
}

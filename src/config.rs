// src/config.rs
use crate::error::{LoaderError, Result};
use crate::fetch::Period;

/// Default FMP stable-API root; overridable via `FMP_BASE_URL` (tests, proxies).
pub const DEFAULT_FMP_BASE: &str = "https://financialmodelingprep.com/stable";

const DEFAULT_SYMBOL: &str = "BRK-B";
const DEFAULT_LIMIT: u32 = 80;
const DEFAULT_BATCH_SIZE: usize = 500;

/// Process configuration, built once at startup and passed by reference into
/// each component. Missing required values abort before any pipeline logic.
#[derive(Debug, Clone)]
pub struct Config {
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub fmp_api_key: String,
    pub fmp_base: String,
    pub symbol: String,
    pub period: Period,
    pub limit: u32,
    pub batch_size: usize,
}

impl Config {
    /// Read configuration from the environment. Call `dotenvy::dotenv()` first
    /// in local/dev so `.env` values are visible.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            supabase_url: required("SUPABASE_URL")?,
            supabase_service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            fmp_api_key: required("FMP_API_KEY")?,
            fmp_base: optional("FMP_BASE_URL").unwrap_or_else(|| DEFAULT_FMP_BASE.to_string()),
            symbol: optional("LOADER_SYMBOL").unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            period: parse_or_default("LOADER_PERIOD", Period::Quarter)?,
            limit: parse_or_default("LOADER_LIMIT", DEFAULT_LIMIT)?,
            batch_size: parse_or_default("LOADER_BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
        })
    }
}

fn required(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(LoaderError::MissingConfig(name)),
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or_default<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T> {
    match optional(name) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| LoaderError::InvalidConfig { name, value: raw }),
    }
}

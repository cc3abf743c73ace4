use std::time::Duration;

use crate::StoreError;
use secrecy::SecretString;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Settings for a [`StoreClient`](crate::StoreClient). Fixed once built.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub base_url: String,
    pub environment: String,
    /// Per-call debug logging; on in `development`.
    pub debug_mode: bool,
    pub project_id: Option<String>,
    pub api_key: Option<SecretString>,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            environment: DEFAULT_ENVIRONMENT.into(),
            debug_mode: true,
            project_id: None,
            api_key: None,
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration values through `get` so tests never touch the
    /// process environment.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, StoreError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let base_url = get("CHOIR_STORE_BASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let environment = get("CHOIR_ENV")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.into());
        let project_id = get("CHOIR_STORE_PROJECT_ID").filter(|v| !v.trim().is_empty());
        let api_key = get("CHOIR_STORE_API_KEY")
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::new(v.into()));

        let timeout_ms = match get("CHOIR_STORE_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                StoreError::Config(format!("CHOIR_STORE_TIMEOUT_MS is not a number: {raw}"))
            })?,
            None => DEFAULT_TIMEOUT_MS,
        };
        if timeout_ms == 0 {
            return Err(StoreError::Config(
                "CHOIR_STORE_TIMEOUT_MS must be positive".into(),
            ));
        }
        let max_retries = match get("CHOIR_STORE_MAX_RETRIES") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                StoreError::Config(format!("CHOIR_STORE_MAX_RETRIES is not a number: {raw}"))
            })?,
            None => DEFAULT_MAX_RETRIES,
        };

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            debug_mode: environment == DEFAULT_ENVIRONMENT,
            environment,
            project_id,
            api_key,
            request_timeout: Duration::from_millis(timeout_ms),
            max_retries,
        })
    }
}

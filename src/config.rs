use crate::error::{EsgError, Result};
use std::env;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_DATA_FILE: &str = "averaged_scores_sector_with_beta.csv";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the calculator service (no trailing slash).
    pub api_url: String,
    /// Equity table, CSV or `.json`.
    pub data_file: String,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            data_file: DEFAULT_DATA_FILE.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Read `ESG_API_URL`, `ESG_DATA_FILE` and `ESG_HTTP_TIMEOUT_SECS`,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("ESG_API_URL").filter(|s| !s.trim().is_empty()) {
            config.api_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(path) = lookup("ESG_DATA_FILE").filter(|s| !s.trim().is_empty()) {
            config.data_file = path;
        }

        if let Some(raw) = lookup("ESG_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                EsgError::Config(format!("ESG_HTTP_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw))
            })?;
            if secs == 0 {
                return Err(EsgError::Config("ESG_HTTP_TIMEOUT_SECS must be positive".to_string()));
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

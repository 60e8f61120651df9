use serde::Deserialize;
use std::env;
use std::time::Duration;
use validator::Validate;
use viewer_core::config as core_config;
use viewer_core::error::AppError;

const DEFAULT_PAGE_SIZE: usize = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ViewerConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[validate(nested)]
    pub api: ApiConfig,
    /// Fixed for the whole session.
    #[validate(range(min = 1, max = 100))]
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ApiConfig {
    /// Listing endpoint; the push stream lives at `{base_url}/stream`.
    #[validate(url)]
    pub base_url: String,
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn stream_url(&self) -> String {
        format!("{}/stream", self.base_url.trim_end_matches('/'))
    }
}

impl ViewerConfig {
    /// Read once at startup; nothing re-reads the environment afterwards.
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";
        Self::from_lookup(common_config, is_prod, |key| env::var(key).ok())
    }

    /// Only the API URL is mandatory in production; tuning knobs keep their defaults.
    fn from_lookup<F>(common: core_config::Config, is_prod: bool, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = match lookup("DOCUMENT_API_URL") {
            Some(url) => url,
            None if is_prod => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "DOCUMENT_API_URL is required in production but not set"
                )))
            }
            None => "http://localhost:8080/api/documents".to_string(),
        };

        let config = ViewerConfig {
            common,
            api: ApiConfig {
                base_url,
                request_timeout_secs: parse_env(
                    &lookup,
                    "DOCUMENT_API_TIMEOUT_SECS",
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                )?,
            },
            page_size: parse_env(&lookup, "VIEWER_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    raw.parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has an invalid value '{}': {}", key, raw, e))
    })
}

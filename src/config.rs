use crate::exchanges::coindcx::DEFAULT_BASE_URL;
use anyhow::{Context, bail};
use reqwest::Url;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub api_port: u16,
    /// `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
    pub exchange_base_url: Url,
    pub http_timeout: Duration,
    pub json_logs: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL").unwrap_or_else(|| "sqlite://futures.db".to_string());

        let api_port = var("PORT")
            .unwrap_or_else(|| "5000".to_string())
            .trim()
            .parse::<u16>()
            .context("PORT must be a valid port number (1-65535)")?;

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let raw_base = var("COINDCX_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let exchange_base_url =
            Url::parse(raw_base.trim()).with_context(|| format!("COINDCX_BASE_URL is not a URL: {raw_base}"))?;
        if exchange_base_url.cannot_be_a_base() {
            bail!("COINDCX_BASE_URL must be an http(s) base URL, got {raw_base}");
        }

        let timeout_secs = var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .context("HTTP_TIMEOUT_SECS must be a positive number of seconds")?;

        let json_logs = var("LOG_FORMAT").is_some_and(|f| f.trim().eq_ignore_ascii_case("json"));

        Ok(Self {
            database_url,
            api_port,
            cors_origins,
            exchange_base_url,
            http_timeout: Duration::from_secs(timeout_secs),
            json_logs,
        })
    }
}

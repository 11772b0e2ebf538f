use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
use crate::matching::orchestrator::MatchSettings;

/// Application configuration loaded from environment variables.
///
/// `LLM_API_KEY` is optional at startup: without it the service still boots and
/// every match request fails fast with a configuration error.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmSettings,
    pub matching: MatchSettings,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = MatchSettings::default();
        let matching = MatchSettings {
            batch_size: parse_var(
                "MATCH_BATCH_SIZE",
                optional_env("MATCH_BATCH_SIZE"),
                defaults.batch_size,
            )?,
            max_concurrency: parse_var(
                "MATCH_MAX_CONCURRENCY",
                optional_env("MATCH_MAX_CONCURRENCY"),
                defaults.max_concurrency,
            )?,
        };
        matching.validate().context("Invalid matching configuration")?;

        let timeout_secs = parse_var(
            "LLM_TIMEOUT_SECS",
            optional_env("LLM_TIMEOUT_SECS"),
            DEFAULT_TIMEOUT.as_secs(),
        )?;
        if timeout_secs == 0 {
            anyhow::bail!("LLM_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Config {
            llm: LlmSettings {
                api_key: optional_env("LLM_API_KEY"),
                base_url: optional_env("LLM_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            matching,
            port: parse_var("PORT", optional_env("PORT"), 8080)?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Reads `key`, treating unset and blank values alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{value}'")),
        None => Ok(default),
    }
}

use std::time::Duration;

use anyhow::{bail, Context, Result};
use intake::Mode;
use reqwest::Url;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Client configuration loaded from environment variables (and `.env` if present).
/// Command-line flags override individual values.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub mode: Mode,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = get("INTAKE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Config {
            base_url: parse_base_url(&base_url)?,
            mode: get("INTAKE_MODE")
                .unwrap_or_default()
                .parse::<Mode>()
                .map_err(anyhow::Error::msg)
                .context("INTAKE_MODE must be 'standard' or 'sandbox'")?,
            poll_interval: Duration::from_millis(parse_or(
                get("INTAKE_POLL_INTERVAL_MS"),
                1000,
                "INTAKE_POLL_INTERVAL_MS",
            )?),
            request_timeout: Duration::from_secs(parse_or(
                get("INTAKE_REQUEST_TIMEOUT_SECS"),
                120,
                "INTAKE_REQUEST_TIMEOUT_SECS",
            )?),
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Only http(s) URLs can carry the submit and progress paths.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("'{raw}' is not a valid URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("Base URL must use http or https, got '{}'", url.scheme());
    }
    Ok(url)
}

fn parse_or(value: Option<String>, default: u64, key: &str) -> Result<u64> {
    let parsed = match value {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a positive integer"))?,
        None => default,
    };
    if parsed == 0 {
        bail!("{key} must be greater than zero");
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.mode, Mode::Standard);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("INTAKE_BASE_URL", "https://intake.example.com/app/"),
            ("INTAKE_MODE", "sandbox"),
            ("INTAKE_POLL_INTERVAL_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.base_url.path(), "/app/");
        assert_eq!(config.mode, Mode::Sandbox);
        assert_eq!(config.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(load(&[("INTAKE_BASE_URL", "ftp://files.example.com")]).is_err());
        assert!(load(&[("INTAKE_BASE_URL", "not a url")]).is_err());
        assert!(load(&[("INTAKE_MODE", "staging")]).is_err());
        assert!(load(&[("INTAKE_POLL_INTERVAL_MS", "0")]).is_err());
        assert!(load(&[("INTAKE_REQUEST_TIMEOUT_SECS", "soon")]).is_err());
    }
}

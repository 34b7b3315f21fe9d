use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_TIMEOUT;
use crate::scanner::keywords::default_sensitive_keywords;

/// Editor configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Directory holding one `<id>.json` file per newsletter.
    pub data_dir: PathBuf,
    /// Quiescence window before a confidentiality scan fires.
    pub scan_debounce: Duration,
    /// Per-request timeout for model calls.
    pub llm_timeout: Duration,
    pub sensitive_keywords: Vec<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let sensitive_keywords = match std::env::var("SENSITIVE_KEYWORDS") {
            Ok(raw) => parse_keyword_list(&raw),
            Err(_) => default_sensitive_keywords(),
        };

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            data_dir: std::env::var("NEWSFLOW_DATA_DIR")
                .unwrap_or_else(|_| "data".to_string())
                .into(),
            scan_debounce: Duration::from_millis(
                std::env::var("SCAN_DEBOUNCE_MS")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse::<u64>()
                    .context("SCAN_DEBOUNCE_MS must be a number of milliseconds")?,
            ),
            llm_timeout: parse_timeout(std::env::var("LLM_TIMEOUT_SECS").ok().as_deref())?,
            sensitive_keywords,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Seconds from `LLM_TIMEOUT_SECS`, or the client default when unset.
fn parse_timeout(raw: Option<&str>) -> Result<Duration> {
    match raw {
        Some(raw) => Ok(Duration::from_secs(
            raw.trim()
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
        )),
        None => Ok(DEFAULT_TIMEOUT),
    }
}

/// Splits a comma-separated keyword list, dropping blanks.
fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_list_trims_and_drops_blanks() {
        let parsed = parse_keyword_list(" secret , ,Project Alpha,");
        assert_eq!(parsed, vec!["secret", "Project Alpha"]);
    }

    #[test]
    fn test_parse_timeout_defaults_and_rejects_garbage() {
        assert_eq!(parse_timeout(None).unwrap(), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout(Some("5")).unwrap(), Duration::from_secs(5));
        assert!(parse_timeout(Some("soon")).is_err());
    }

    #[test]
    fn test_parse_keyword_list_empty() {
        assert!(parse_keyword_list("").is_empty());
    }
}

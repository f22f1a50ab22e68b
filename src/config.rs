use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::db::Database;
use crate::toast::DEFAULT_TOAST_LIFETIME;

const DEFAULT_BASE_URL: &str = "http://localhost:5173";
const DEFAULT_LOG_FILTER: &str = "warn";

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub toast_lifetime: Duration,
    pub base_url: String,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // a missing .env is fine
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = lookup("JOBHUNT_DB")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Database::default_path);

        let toast_lifetime = match lookup("JOBHUNT_TOAST_SECS") {
            Some(raw) => {
                let secs: f64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("JOBHUNT_TOAST_SECS must be a number, got '{raw}'"))?;
                Duration::try_from_secs_f64(secs)
                    .with_context(|| format!("JOBHUNT_TOAST_SECS must be non-negative, got '{raw}'"))?
            }
            None => DEFAULT_TOAST_LIFETIME,
        };

        Ok(Config {
            db_path,
            toast_lifetime,
            base_url: lookup("JOBHUNT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.db_path, Database::default_path());
        assert_eq!(config.toast_lifetime, Duration::from_secs(4));
        assert_eq!(config.base_url, "http://localhost:5173");
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("JOBHUNT_DB", "/tmp/board.db"),
            ("JOBHUNT_TOAST_SECS", "1.5"),
            ("JOBHUNT_BASE_URL", "https://jobs.example.com"),
            ("RUST_LOG", "jobhunt=debug"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/board.db"));
        assert_eq!(config.toast_lifetime, Duration::from_millis(1500));
        assert_eq!(config.base_url, "https://jobs.example.com");
        assert_eq!(config.log_filter, "jobhunt=debug");
    }

    #[test]
    fn test_rejects_bad_toast_lifetime() {
        assert!(config(&[("JOBHUNT_TOAST_SECS", "soon")]).is_err());
        assert!(config(&[("JOBHUNT_TOAST_SECS", "-1")]).is_err());
    }
}

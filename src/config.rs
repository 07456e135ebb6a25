use std::time::Duration;

use chrono::NaiveDate;
use thiserror::Error;

use crate::api::YahooChartClient;
use crate::models::Day;
use crate::utils::Breaker;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Where the series blob lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Local directory, one file per container/key
    Fs { root: String },
    /// HTTP object endpoint
    Http { endpoint: String, token: Option<String> },
}

pub struct Config {
    pub symbol: String,
    pub api_base_url: String,
    pub window_start: Day,
    pub fetch_limit: usize,
    pub request_delay: Duration,
    pub request_timeout: Duration,
    pub retry_attempts: u32,
    pub retry_cooldown: Duration,
    pub storage: StorageBackend,
    pub container: String,
    pub key: String,
}

impl Config {
    pub const DEFAULT_SYMBOL: &'static str = "^GSPC";
    pub const DEFAULT_WINDOW_START: &'static str = "2020-12-01";
    pub const DEFAULT_FETCH_LIMIT: usize = 5;
    pub const DEFAULT_REQUEST_DELAY_MS: u64 = 200;
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
    pub const DEFAULT_CONTAINER: &'static str = "chiron-data-collector";
    pub const DEFAULT_KEY: &'static str = "spx/spx.csv";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let window_start = parse_day(
            "SPX_WINDOW_START",
            &get("SPX_WINDOW_START").unwrap_or_else(|| Self::DEFAULT_WINDOW_START.to_string()),
        )?;

        let retry_attempts = parse_number("SPX_RETRY_ATTEMPTS", get("SPX_RETRY_ATTEMPTS"), Breaker::DEFAULT_ATTEMPTS)?;
        if retry_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "SPX_RETRY_ATTEMPTS",
                value: "0".to_string(),
                reason: "at least one attempt is required".to_string(),
            });
        }

        let storage = match get("SPX_STORAGE").as_deref().unwrap_or("fs") {
            "fs" => StorageBackend::Fs {
                root: get("SPX_STORAGE_ROOT").unwrap_or_else(|| "./data".to_string()),
            },
            "http" => StorageBackend::Http {
                endpoint: get("SPX_STORAGE_ENDPOINT").ok_or(ConfigError::Missing("SPX_STORAGE_ENDPOINT"))?,
                token: get("SPX_STORAGE_TOKEN"),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "SPX_STORAGE",
                    value: other.to_string(),
                    reason: "expected \"fs\" or \"http\"".to_string(),
                })
            }
        };

        Ok(Config {
            symbol: get("SPX_SYMBOL").unwrap_or_else(|| Self::DEFAULT_SYMBOL.to_string()),
            api_base_url: get("SPX_API_BASE_URL")
                .unwrap_or_else(|| YahooChartClient::DEFAULT_BASE_URL.to_string()),
            window_start,
            fetch_limit: parse_number("SPX_FETCH_LIMIT", get("SPX_FETCH_LIMIT"), Self::DEFAULT_FETCH_LIMIT)?,
            request_delay: Duration::from_millis(parse_number(
                "SPX_REQUEST_DELAY_MS",
                get("SPX_REQUEST_DELAY_MS"),
                Self::DEFAULT_REQUEST_DELAY_MS,
            )?),
            request_timeout: Duration::from_secs(parse_number(
                "SPX_REQUEST_TIMEOUT_SECS",
                get("SPX_REQUEST_TIMEOUT_SECS"),
                Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            retry_attempts,
            retry_cooldown: Duration::from_millis(parse_number(
                "SPX_RETRY_COOLDOWN_MS",
                get("SPX_RETRY_COOLDOWN_MS"),
                Breaker::DEFAULT_COOLDOWN.as_millis() as u64,
            )?),
            storage,
            container: get("SPX_CONTAINER").unwrap_or_else(|| Self::DEFAULT_CONTAINER.to_string()),
            key: get("SPX_KEY").unwrap_or_else(|| Self::DEFAULT_KEY.to_string()),
        })
    }

    pub fn breaker(&self) -> Breaker {
        Breaker::new(self.retry_attempts, self.retry_cooldown)
    }
}

fn parse_number<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 midnight-UTC timestamp
fn parse_day(name: &'static str, value: &str) -> Result<Day, ConfigError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(Day::new)
        .or_else(|| Day::parse_rfc3339(value))
        .ok_or_else(|| ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: "expected YYYY-MM-DD or a midnight UTC timestamp".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.symbol, "^GSPC");
        assert_eq!(config.window_start, Day::from_ymd(2020, 12, 1).unwrap());
        assert_eq!(config.fetch_limit, 5);
        assert_eq!(config.request_delay, Duration::from_millis(200));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_cooldown, Duration::from_secs(1));
        assert_eq!(config.storage, StorageBackend::Fs { root: "./data".to_string() });
        assert_eq!(config.container, "chiron-data-collector");
        assert_eq!(config.key, "spx/spx.csv");
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("SPX_WINDOW_START", "2020-12-01T00:00:00Z"),
            ("SPX_FETCH_LIMIT", "50"),
            ("SPX_REQUEST_DELAY_MS", "0"),
            ("SPX_STORAGE", "http"),
            ("SPX_STORAGE_ENDPOINT", "https://objects.example.com"),
            ("SPX_STORAGE_TOKEN", "t0k3n"),
        ])
        .unwrap();
        assert_eq!(config.window_start, Day::from_ymd(2020, 12, 1).unwrap());
        assert_eq!(config.fetch_limit, 50);
        assert_eq!(config.request_delay, Duration::ZERO);
        assert_eq!(
            config.storage,
            StorageBackend::Http {
                endpoint: "https://objects.example.com".to_string(),
                token: Some("t0k3n".to_string()),
            }
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config(&[("SPX_FETCH_LIMIT", "  "), ("SPX_SYMBOL", "")]).unwrap();
        assert_eq!(config.fetch_limit, 5);
        assert_eq!(config.symbol, "^GSPC");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            config(&[("SPX_FETCH_LIMIT", "-1")]),
            Err(ConfigError::Invalid { name: "SPX_FETCH_LIMIT", .. })
        ));
        assert!(matches!(
            config(&[("SPX_WINDOW_START", "2020-12-01T09:30:00Z")]),
            Err(ConfigError::Invalid { name: "SPX_WINDOW_START", .. })
        ));
        assert!(matches!(
            config(&[("SPX_RETRY_ATTEMPTS", "0")]),
            Err(ConfigError::Invalid { name: "SPX_RETRY_ATTEMPTS", .. })
        ));
        assert!(matches!(
            config(&[("SPX_STORAGE", "s3")]),
            Err(ConfigError::Invalid { name: "SPX_STORAGE", .. })
        ));
        assert!(matches!(
            config(&[("SPX_STORAGE", "http")]),
            Err(ConfigError::Missing("SPX_STORAGE_ENDPOINT"))
        ));
    }
}

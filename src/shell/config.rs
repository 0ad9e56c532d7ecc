// Runtime configuration read from the environment.
//
// Every option falls back to the value the service has always shipped with, so
// an empty environment reproduces the fixed deployment: port 8080, the three
// etcd endpoints, a 5s dial timeout and a 10s operation timeout.

use crate::shared::infrastructure::kv_store::connection::StoreTimeouts;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_STORE_ENDPOINTS: [&str; 3] =
    ["http://etcd:2379", "http://etcd:22379", "http://etcd:32379"];
pub const DEFAULT_DIAL_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_KEY_PREFIX: &str = "operation";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub store_endpoints: Vec<String>,
    pub dial_timeout: Duration,
    pub operation_timeout: Duration,
    pub key_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            store_endpoints: DEFAULT_STORE_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            dial_timeout: Duration::from_millis(DEFAULT_DIAL_TIMEOUT_MS),
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup("CALC_PORT") {
            config.port = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "CALC_PORT",
                expected: "a port number",
                value: raw.clone(),
            })?;
        }
        if let Some(raw) = lookup("CALC_STORE_ENDPOINTS") {
            let endpoints: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
            if endpoints.is_empty() {
                return Err(ConfigError::Empty("CALC_STORE_ENDPOINTS"));
            }
            config.store_endpoints = endpoints;
        }
        if let Some(raw) = lookup("CALC_DIAL_TIMEOUT_MS") {
            config.dial_timeout = parse_millis("CALC_DIAL_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("CALC_OPERATION_TIMEOUT_MS") {
            config.operation_timeout = parse_millis("CALC_OPERATION_TIMEOUT_MS", &raw)?;
        }
        if let Some(raw) = lookup("CALC_KEY_PREFIX") {
            let prefix = raw.trim();
            if prefix.is_empty() {
                return Err(ConfigError::Empty("CALC_KEY_PREFIX"));
            }
            config.key_prefix = prefix.to_string();
        }

        Ok(config)
    }

    pub fn store_timeouts(&self) -> StoreTimeouts {
        StoreTimeouts {
            dial: self.dial_timeout,
            operation: self.operation_timeout,
        }
    }
}

fn parse_millis(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::Invalid {
            name,
            expected: "a positive number of milliseconds",
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod app_config_tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[rstest]
    fn it_should_fall_back_to_the_fixed_deployment() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_endpoints.len(), 3);
        assert_eq!(config.store_timeouts(), StoreTimeouts::default());
    }

    #[rstest]
    fn it_should_read_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CALC_PORT", "9090"),
            ("CALC_STORE_ENDPOINTS", "http://a:2379, http://b:2379,"),
            ("CALC_DIAL_TIMEOUT_MS", "250"),
            ("CALC_OPERATION_TIMEOUT_MS", "1500"),
            ("CALC_KEY_PREFIX", "calc"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.store_endpoints, vec!["http://a:2379", "http://b:2379"]);
        assert_eq!(config.dial_timeout, Duration::from_millis(250));
        assert_eq!(config.operation_timeout, Duration::from_millis(1500));
        assert_eq!(config.key_prefix, "calc");
    }

    #[rstest]
    #[case("CALC_PORT", "eighty")]
    #[case("CALC_PORT", "70000")]
    #[case("CALC_DIAL_TIMEOUT_MS", "0")]
    #[case("CALC_OPERATION_TIMEOUT_MS", "-5")]
    fn it_should_reject_invalid_values(#[case] name: &str, #[case] value: &str) {
        let result = AppConfig::from_lookup(lookup_from(&[(name, value)]));
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[rstest]
    #[case("CALC_STORE_ENDPOINTS", " , ")]
    #[case("CALC_KEY_PREFIX", "  ")]
    fn it_should_reject_empty_values(#[case] name: &str, #[case] value: &str) {
        let result = AppConfig::from_lookup(lookup_from(&[(name, value)]));
        assert!(matches!(result, Err(ConfigError::Empty(_))));
    }
}

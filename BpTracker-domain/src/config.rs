//! Runtime configuration read from the environment

use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use bp_tracker_data::repository::{StoreConfig, DEFAULT_QUERY_TIMEOUT};

/// Upper bound on a single store query, in seconds
pub const QUERY_TIMEOUT_VAR: &str = "BP_QUERY_TIMEOUT_SECONDS";
/// Fallback log filter when `RUST_LOG` is not set
pub const LOG_FILTER_VAR: &str = "BP_LOG_FILTER";
/// Emit JSON log lines instead of plain text
pub const LOG_JSON_VAR: &str = "BP_LOG_JSON";
/// Days of random history to generate when seeding
pub const SEED_DAYS_VAR: &str = "BP_SEED_DAYS";

pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_SEED_DAYS: u32 = 60;

/// Tracker configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Upper bound on a single store query
    pub query_timeout: Duration,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Whether logs are written as JSON
    pub log_json: bool,
    /// Days of generated history for seeding
    pub seed_days: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_json: false,
            seed_days: DEFAULT_SEED_DAYS,
        }
    }
}

impl TrackerConfig {
    /// Create a configuration from environment variables, loading `.env`
    /// first if there is one
    pub fn from_env() -> Self {
        if dotenv::dotenv().is_err() {
            info!(".env file not found or couldn't be read. Using environment variables.");
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create a configuration from an arbitrary variable lookup.
    /// Unset variables take their defaults; unparseable ones do too, with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let query_timeout = parse_or(&lookup, QUERY_TIMEOUT_VAR, defaults.query_timeout.as_secs())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| {
                warn!("{} must be a positive number of seconds, using default", QUERY_TIMEOUT_VAR);
                defaults.query_timeout
            });

        let log_filter = lookup(LOG_FILTER_VAR)
            .map(|filter| filter.trim().to_string())
            .filter(|filter| !filter.is_empty())
            .unwrap_or(defaults.log_filter);

        let log_json = match lookup(LOG_JSON_VAR) {
            None => defaults.log_json,
            Some(raw) => parse_flag(&raw).unwrap_or_else(|| {
                warn!("Invalid {} value {:?}, using default", LOG_JSON_VAR, raw);
                defaults.log_json
            }),
        };

        let seed_days = parse_or(&lookup, SEED_DAYS_VAR, defaults.seed_days).unwrap_or_else(|| {
            warn!("Invalid {} value, using default", SEED_DAYS_VAR);
            defaults.seed_days
        });

        info!(
            "Tracker configuration: query_timeout={}s, log_filter={}, log_json={}, seed_days={}",
            query_timeout.as_secs(),
            log_filter,
            log_json,
            seed_days
        );

        Self {
            query_timeout,
            log_filter,
            log_json,
            seed_days,
        }
    }

    /// Settings for the store adapter
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            query_timeout: self.query_timeout,
        }
    }
}

/// Parse a variable, using `default` when it is unset and `None` when it is malformed
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Some(default),
        Some(raw) => raw.trim().parse::<T>().ok(),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = TrackerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.query_timeout, Duration::from_secs(10));
        assert_eq!(config.seed_days, 60);
        assert!(!config.log_json);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = TrackerConfig::from_lookup(lookup(&[
            (QUERY_TIMEOUT_VAR, "3"),
            (LOG_FILTER_VAR, "bp_tracker_domain=debug"),
            (LOG_JSON_VAR, "true"),
            (SEED_DAYS_VAR, "14"),
        ]));

        assert_eq!(config.query_timeout, Duration::from_secs(3));
        assert_eq!(config.log_filter, "bp_tracker_domain=debug");
        assert!(config.log_json);
        assert_eq!(config.seed_days, 14);
        assert_eq!(config.store_config().query_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_fall_back_to_defaults() {
        let config = TrackerConfig::from_lookup(lookup(&[
            (QUERY_TIMEOUT_VAR, "soon"),
            (LOG_FILTER_VAR, "   "),
            (LOG_JSON_VAR, "maybe"),
            (SEED_DAYS_VAR, "-5"),
        ]));

        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = TrackerConfig::from_lookup(lookup(&[(QUERY_TIMEOUT_VAR, "0")]));
        assert_eq!(config.query_timeout, DEFAULT_QUERY_TIMEOUT);
    }
}

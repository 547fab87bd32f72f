//! CLI configuration

use serde::Deserialize;

use core_kernel::Timezone;
use domain_reports::cache::DEFAULT_CACHE_CAPACITY;

/// Settings read from `REPORTS_*` environment variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Log filter directive, e.g. `info` or `domain_reports=debug`
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// IANA timezone that decides what "today" is
    pub timezone: Timezone,
    /// Stored credential for the access gate; unset leaves reports open
    pub password_hash: Option<String>,
    /// Maximum number of cached report outputs
    pub cache_capacity: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            timezone: Timezone::default(),
            password_hash: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CliConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::with_prefix("REPORTS"))
    }

    /// Loads configuration from any `config` source, filling gaps with
    /// defaults
    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("REPORTS").source(Some(map))
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CliConfig::from_source(env(&[])).unwrap();
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert_eq!(config.timezone, Timezone::default());
        assert!(config.password_hash.is_none());
        assert_eq!(config.cache_capacity, DEFAULT_CACHE_CAPACITY);
    }

    #[test]
    fn test_reads_prefixed_variables() {
        let config = CliConfig::from_source(env(&[
            ("REPORTS_LOG_LEVEL", "debug"),
            ("REPORTS_TIMEZONE", "Asia/Kolkata"),
            ("REPORTS_CACHE_CAPACITY", "8"),
        ]))
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.timezone.0, chrono_tz::Asia::Kolkata);
        assert_eq!(config.cache_capacity, 8);
    }
}

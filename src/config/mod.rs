//! Configuration module for stockpulse.
//!
//! Settings are loaded from environment variables (after `.env`), organized
//! by concern: data providers, the model and the signal pipeline.

mod model_config;
mod provider_config;
mod signal_config;

pub use model_config::ModelEnvConfig;
pub use provider_config::{NewsSource, ProviderEnvConfig};
pub use signal_config::SignalEnvConfig;

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Reads one configuration key; `None` when unset.
pub type Lookup = dyn Fn(&str) -> Option<String>;

pub(crate) fn read_or(lookup: &Lookup, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

/// Parses `key`, falling back to `default` when unset or malformed.
pub(crate) fn parse_or<T: FromStr>(lookup: &Lookup, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let values: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| values.get(key).cloned()
}

/// Price history source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Yahoo,
    Alpaca,
    Csv,
    Mock,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" => Ok(Mode::Yahoo),
            "alpaca" => Ok(Mode::Alpaca),
            "csv" => Ok(Mode::Csv),
            "mock" => Ok(Mode::Mock),
            _ => anyhow::bail!(
                "Invalid MODE: {}. Must be 'yahoo', 'alpaca', 'csv', or 'mock'",
                s
            ),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub providers: ProviderEnvConfig,
    pub model: ModelEnvConfig,
    pub signal: SignalEnvConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key: &str| env::var(key).ok())
    }

    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let mode = Mode::from_str(&read_or(lookup, "MODE", "yahoo"))?;

        let providers =
            ProviderEnvConfig::from_lookup(lookup).context("Failed to load provider config")?;
        let model = ModelEnvConfig::from_lookup(lookup);
        let signal = SignalEnvConfig::from_lookup(lookup).context("Failed to load signal config")?;

        Ok(Self {
            mode,
            providers,
            model,
            signal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config.mode, Mode::Yahoo);
        assert_eq!(config.providers.news_source, NewsSource::Rss);
        assert_eq!(config.model.seed, 42);
        assert_eq!(config.signal.cache_ttl_secs, 3600);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(Mode::from_str("CSV").unwrap(), Mode::Csv);
        assert_eq!(Mode::from_str(" mock ").unwrap(), Mode::Mock);

        let err = Config::from_lookup(&lookup_from(&[("MODE", "binance")])).unwrap_err();
        assert!(err.to_string().contains("Invalid MODE: binance"));
    }

    #[test]
    fn test_parse_or() {
        let lookup = lookup_from(&[("A", " 12 "), ("B", "x")]);
        assert_eq!(parse_or(&lookup, "A", 1usize), 12);
        assert_eq!(parse_or(&lookup, "B", 1usize), 1);
        assert!(parse_or(&lookup, "C", true));
    }
}

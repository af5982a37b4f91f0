//! Data source configuration parsing from environment variables.

use super::{Lookup, read_or};
use crate::infrastructure::alpaca::DEFAULT_ALPACA_DATA_URL;
use crate::infrastructure::news::DEFAULT_NEWS_RSS_URL;
use crate::infrastructure::yahoo::chart::DEFAULT_YAHOO_BASE_URL;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Where headlines come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewsSource {
    Rss,
    Alpaca,
    None,
}

impl FromStr for NewsSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rss" => Ok(NewsSource::Rss),
            "alpaca" => Ok(NewsSource::Alpaca),
            "none" | "off" => Ok(NewsSource::None),
            _ => anyhow::bail!(
                "Invalid NEWS_SOURCE: {}. Must be 'rss', 'alpaca' or 'none'",
                s
            ),
        }
    }
}

/// Provider endpoints and credentials
#[derive(Debug, Clone)]
pub struct ProviderEnvConfig {
    pub yahoo_base_url: String,
    pub news_rss_url: String,
    pub alpaca_api_key: String,
    pub alpaca_secret_key: String,
    pub alpaca_data_url: String,
    pub csv_data_dir: PathBuf,
    pub news_source: NewsSource,
}

impl Default for ProviderEnvConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            news_rss_url: DEFAULT_NEWS_RSS_URL.to_string(),
            alpaca_api_key: String::new(),
            alpaca_secret_key: String::new(),
            alpaca_data_url: DEFAULT_ALPACA_DATA_URL.to_string(),
            csv_data_dir: PathBuf::from("data"),
            news_source: NewsSource::Rss,
        }
    }
}

impl ProviderEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let news_source = NewsSource::from_str(&read_or(lookup, "NEWS_SOURCE", "rss"))
            .context("Failed to parse NEWS_SOURCE")?;

        Ok(Self {
            yahoo_base_url: read_or(lookup, "YAHOO_BASE_URL", DEFAULT_YAHOO_BASE_URL),
            news_rss_url: read_or(lookup, "NEWS_RSS_URL", DEFAULT_NEWS_RSS_URL),
            alpaca_api_key: lookup("ALPACA_API_KEY").unwrap_or_default(),
            alpaca_secret_key: lookup("ALPACA_SECRET_KEY").unwrap_or_default(),
            alpaca_data_url: read_or(lookup, "ALPACA_DATA_URL", DEFAULT_ALPACA_DATA_URL),
            csv_data_dir: PathBuf::from(read_or(lookup, "CSV_DATA_DIR", "data")),
            news_source,
        })
    }

    pub fn has_alpaca_credentials(&self) -> bool {
        !self.alpaca_api_key.trim().is_empty() && !self.alpaca_secret_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_provider_config_defaults() {
        let config = ProviderEnvConfig::from_lookup(&lookup_from(&[])).unwrap();
        assert_eq!(config.news_source, NewsSource::Rss);
        assert_eq!(config.yahoo_base_url, "https://query1.finance.yahoo.com");
        assert_eq!(config.csv_data_dir, PathBuf::from("data"));
        assert!(!config.has_alpaca_credentials());
    }

    #[test]
    fn test_invalid_news_source_is_rejected() {
        let err = ProviderEnvConfig::from_lookup(&lookup_from(&[("NEWS_SOURCE", "twitter")]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid NEWS_SOURCE: twitter"));
    }

    #[test]
    fn test_alpaca_credentials() {
        let config = ProviderEnvConfig::from_lookup(&lookup_from(&[
            ("ALPACA_API_KEY", "key"),
            ("ALPACA_SECRET_KEY", "secret"),
            ("NEWS_SOURCE", "Alpaca"),
        ]))
        .unwrap();
        assert!(config.has_alpaca_credentials());
        assert_eq!(config.news_source, NewsSource::Alpaca);
    }
}

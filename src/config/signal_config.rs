//! Pipeline and cache settings from environment variables.

use super::{Lookup, parse_or, read_or};
use crate::application::signal::service::available_cores;
use crate::application::signal::SignalSettings;
use crate::domain::market::HistoryPeriod;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalEnvConfig {
    pub history_period: HistoryPeriod,
    pub min_history_bars: usize,
    pub min_training_rows: usize,
    pub news_limit: usize,
    pub cache_enabled: bool,
    pub cache_ttl_secs: u64,
    pub max_concurrent_trainings: usize,
    pub scan_concurrency: usize,
}

impl Default for SignalEnvConfig {
    fn default() -> Self {
        Self {
            history_period: HistoryPeriod::TwoYears,
            min_history_bars: 200,
            min_training_rows: 30,
            news_limit: 5,
            cache_enabled: true,
            cache_ttl_secs: 3600,
            max_concurrent_trainings: available_cores(),
            scan_concurrency: 4,
        }
    }
}

impl SignalEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let defaults = Self::default();
        let history_period = HistoryPeriod::from_str(&read_or(lookup, "HISTORY_PERIOD", "2y"))
            .context("Failed to parse HISTORY_PERIOD")?;

        Ok(Self {
            history_period,
            min_history_bars: parse_or(lookup, "MIN_HISTORY_BARS", defaults.min_history_bars),
            min_training_rows: parse_or(lookup, "MIN_TRAINING_ROWS", defaults.min_training_rows),
            news_limit: parse_or(lookup, "NEWS_LIMIT", defaults.news_limit),
            cache_enabled: parse_or(lookup, "SIGNAL_CACHE_ENABLED", defaults.cache_enabled),
            cache_ttl_secs: parse_or(lookup, "SIGNAL_CACHE_TTL_SECS", defaults.cache_ttl_secs),
            max_concurrent_trainings: parse_or(
                lookup,
                "MAX_CONCURRENT_TRAININGS",
                defaults.max_concurrent_trainings,
            )
            .max(1),
            scan_concurrency: parse_or(lookup, "SCAN_CONCURRENCY", defaults.scan_concurrency)
                .max(1),
        })
    }

    /// `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_enabled
            .then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn to_signal_settings(&self) -> SignalSettings {
        SignalSettings {
            history_period: self.history_period,
            min_history_bars: self.min_history_bars,
            min_training_rows: self.min_training_rows,
            news_limit: self.news_limit,
            max_concurrent_trainings: self.max_concurrent_trainings,
            scan_concurrency: self.scan_concurrency,
            ..SignalSettings::default()
        }
    }
}

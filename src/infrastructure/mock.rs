use crate::domain::errors::ProviderError;
use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::ports::{NewsProvider, PriceHistoryProvider};
use crate::domain::signal::NewsItem;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::debug;

const PROVIDER: &str = "Mock";
const TRADING_DAYS_PER_YEAR: usize = 252;
const MAX_SYNTHETIC_YEARS: usize = 10;

fn symbol_seed(symbol: &str) -> u64 {
    // FNV-1a, stable across runs and platforms
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn trading_days(period: HistoryPeriod) -> usize {
    match period.calendar_days() {
        Some(days) => days as usize * TRADING_DAYS_PER_YEAR / 365,
        None => MAX_SYNTHETIC_YEARS * TRADING_DAYS_PER_YEAR,
    }
}

/// Seeded random-walk daily bars ending at `end`, weekdays only.
///
/// The same symbol, period and end date always produce the same series.
pub fn synthetic_history(symbol: &str, period: HistoryPeriod, end: NaiveDate) -> Vec<PriceBar> {
    let n = trading_days(period);
    let mut rng = StdRng::seed_from_u64(symbol_seed(symbol));

    let mut dates = Vec::with_capacity(n);
    let mut day = end;
    while dates.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    dates.reverse();

    let drift = rng.random_range(-0.0005..0.001);
    let mut close: f64 = rng.random_range(20.0..400.0);

    dates
        .into_iter()
        .map(|date| {
            let open = close;
            close = (open * (1.0 + drift + rng.random_range(-0.02..0.02))).max(0.01);
            let high = open.max(close) * (1.0 + rng.random_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.random_range(0.0..0.01));
            PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: rng.random_range(500_000.0..5_000_000.0_f64).round(),
            }
        })
        .collect()
}

/// In-memory price history for tests and offline runs.
///
/// Unknown symbols yield an empty history, or a synthetic random walk when
/// `synthetic` is enabled.
#[derive(Default)]
pub struct MockPriceHistoryProvider {
    bars: HashMap<String, Vec<PriceBar>>,
    synthetic_until: Option<NaiveDate>,
    synthetic: bool,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockPriceHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider that generates a random walk for every symbol.
    pub fn synthetic() -> Self {
        Self {
            synthetic: true,
            ..Self::default()
        }
    }

    /// Provider whose every call fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_bars(mut self, symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        self.bars.insert(symbol.into(), bars);
        self
    }

    /// Pins the last synthetic bar to `end` instead of today.
    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.synthetic_until = Some(end);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for MockPriceHistoryProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.failure {
            return Err(ProviderError::Request {
                provider: PROVIDER,
                reason: reason.clone(),
            });
        }

        if let Some(bars) = self.bars.get(symbol) {
            return Ok(bars.clone());
        }

        if self.synthetic {
            let end = self
                .synthetic_until
                .unwrap_or_else(|| Utc::now().date_naive());
            debug!("MockPriceHistoryProvider: synthesizing {} ({})", symbol, period);
            return Ok(synthetic_history(symbol, period, end));
        }

        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "Mock"
    }
}

/// In-memory news keyed by symbol; records every symbol it is asked for.
#[derive(Default)]
pub struct MockNewsProvider {
    news: HashMap<String, Vec<NewsItem>>,
    failure: Option<String>,
    requests: Mutex<Vec<String>>,
}

impl MockNewsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn with_titles(mut self, symbol: impl Into<String>, titles: &[&str]) -> Self {
        let items = titles
            .iter()
            .map(|title| NewsItem {
                title: Some(title.to_string()),
                link: None,
            })
            .collect();
        self.news.insert(symbol.into(), items);
        self
    }

    pub fn with_items(mut self, symbol: impl Into<String>, items: Vec<NewsItem>) -> Self {
        self.news.insert(symbol.into(), items);
        self
    }

    pub fn requested_symbols(&self) -> Vec<String> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl NewsProvider for MockNewsProvider {
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ProviderError> {
        match self.requests.lock() {
            Ok(mut guard) => guard.push(symbol.to_string()),
            Err(poisoned) => poisoned.into_inner().push(symbol.to_string()),
        }

        if let Some(reason) = &self.failure {
            return Err(ProviderError::Request {
                provider: PROVIDER,
                reason: reason.clone(),
            });
        }

        Ok(self.news.get(symbol).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "MockNews"
    }
}

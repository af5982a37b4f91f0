use super::cache::SignalCache;
use super::fusion::fuse;
use super::reasoning::explain;
use crate::application::features::{
    IndicatorSettings, LABEL_HORIZON, LabeledSeries, compute_features, label_rows,
};
use crate::application::ml::{RandomForestSignalModel, SignalModel};
use crate::application::sentiment::NewsCollector;
use crate::domain::errors::SignalError;
use crate::domain::market::HistoryPeriod;
use crate::domain::ports::{NewsProvider, PriceHistoryProvider};
use crate::domain::signal::{SignalMetrics, SignalResult};
use anyhow::{Result, anyhow};
use chrono::Utc;
use futures::{StreamExt, stream};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const INSUFFICIENT_DATA_REASON: &str = "Insufficient data for analysis.";

/// Pipeline knobs
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSettings {
    pub history_period: HistoryPeriod,
    /// Fewer bars than this yields a NEUTRAL result.
    pub min_history_bars: usize,
    /// Fewer labeled rows than this yields a NEUTRAL result.
    pub min_training_rows: usize,
    pub news_limit: usize,
    pub indicators: IndicatorSettings,
    pub max_concurrent_trainings: usize,
    pub scan_concurrency: usize,
}

impl Default for SignalSettings {
    fn default() -> Self {
        Self {
            history_period: HistoryPeriod::TwoYears,
            min_history_bars: 200,
            min_training_rows: 30,
            news_limit: 5,
            indicators: IndicatorSettings::default(),
            max_concurrent_trainings: available_cores(),
            scan_concurrency: 4,
        }
    }
}

pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Trims and upper-cases a ticker.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Signal pipeline: history -> features -> model -> news fusion -> signal.
pub struct SignalService {
    prices: Arc<dyn PriceHistoryProvider>,
    news: NewsCollector,
    model: Arc<dyn SignalModel>,
    cache: Option<SignalCache>,
    settings: SignalSettings,
    training_slots: Arc<Semaphore>,
}

impl SignalService {
    pub fn builder() -> SignalServiceBuilder {
        SignalServiceBuilder::default()
    }

    pub fn settings(&self) -> &SignalSettings {
        &self.settings
    }

    pub fn cache(&self) -> Option<&SignalCache> {
        self.cache.as_ref()
    }

    /// Buy/sell/hold signal for `symbol`.
    ///
    /// Never fails: insufficient history yields NEUTRAL and any pipeline
    /// failure yields ERROR with the error message as reason.
    pub async fn predict_signal(&self, symbol: &str) -> SignalResult {
        let symbol = normalize_symbol(symbol);
        if symbol.is_empty() {
            return SignalResult::error(symbol, SignalError::InvalidSymbol.to_string());
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&symbol) {
                return hit;
            }
            let purged = cache.purge_expired();
            if purged > 0 {
                debug!("SignalService: purged {} stale cache entries", purged);
            }
        }

        let started = Instant::now();
        let result = match self.compute(&symbol).await {
            Ok(result) => result,
            Err(e) => {
                warn!("SignalService: pipeline failed for {}: {}", symbol, e);
                SignalResult::error(symbol.clone(), e.to_string())
            }
        };

        info!(
            "SignalService: {} -> {} ({:.1}%) in {:?}",
            symbol,
            result.signal,
            result.confidence,
            started.elapsed()
        );

        if let Some(cache) = &self.cache {
            cache.insert(symbol, result.clone());
        }

        result
    }

    /// Runs `predict_signal` for every symbol, preserving input order.
    pub async fn scan<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<SignalResult> {
        stream::iter(symbols.iter())
            .map(|symbol| self.predict_signal(symbol.as_ref()))
            .buffered(self.settings.scan_concurrency.max(1))
            .collect()
            .await
    }

    async fn compute(&self, symbol: &str) -> Result<SignalResult, SignalError> {
        let bars = self
            .prices
            .fetch_history(symbol, self.settings.history_period)
            .await
            .map_err(|source| SignalError::PriceHistory {
                symbol: symbol.to_string(),
                source,
            })?;

        debug!(
            "SignalService: {} returned {} bars for {} ({})",
            self.prices.name(),
            bars.len(),
            symbol,
            self.settings.history_period
        );

        if bars.len() < self.settings.min_history_bars {
            info!(
                "SignalService: {} has {} bars (< {}), returning NEUTRAL",
                symbol,
                bars.len(),
                self.settings.min_history_bars
            );
            return Ok(SignalResult::neutral(symbol, INSUFFICIENT_DATA_REASON));
        }

        let rows = compute_features(&bars, &self.settings.indicators)?;
        let series = match label_rows(&rows, LABEL_HORIZON) {
            Some(series) if series.training.len() >= self.settings.min_training_rows.max(1) => {
                series
            }
            other => {
                info!(
                    "SignalService: {} has {} training rows (< {}), returning NEUTRAL",
                    symbol,
                    other.map(|s| s.training.len()).unwrap_or(0),
                    self.settings.min_training_rows
                );
                return Ok(SignalResult::neutral(symbol, INSUFFICIENT_DATA_REASON));
            }
        };
        let latest = series.latest;

        let (model_probability, report) =
            tokio::join!(self.train_and_score(series), self.news.collect(symbol));
        let model_probability = model_probability?;

        let fused = fuse(model_probability, report.score);
        debug!(
            "SignalService: {} model={:.3} sentiment={:.2} final={:.3}",
            symbol, fused.model_probability, fused.sentiment_score, fused.final_probability
        );

        Ok(SignalResult {
            symbol: symbol.to_string(),
            signal: fused.signal(),
            confidence: fused.confidence(),
            reason: explain(&latest, &fused, &report),
            metrics: Some(SignalMetrics::from(&latest)),
            news: report.headlines,
            generated_at: Utc::now(),
        })
    }

    /// Fits the model off the async runtime, bounded by the training slots.
    async fn train_and_score(&self, series: LabeledSeries) -> Result<f64, SignalError> {
        let _permit = Arc::clone(&self.training_slots)
            .acquire_owned()
            .await
            .map_err(|e| SignalError::Worker(e.to_string()))?;

        let model = Arc::clone(&self.model);
        debug!(
            "SignalService: training {} on {} rows ({:.0}% rising)",
            model.name(),
            series.training.len(),
            series.positive_ratio() * 100.0
        );

        tokio::task::spawn_blocking(move || model.fit_predict(&series.training, &series.latest))
            .await
            .map_err(|e| SignalError::Worker(e.to_string()))?
    }
}

#[derive(Default)]
pub struct SignalServiceBuilder {
    prices: Option<Arc<dyn PriceHistoryProvider>>,
    news: Option<Arc<dyn NewsProvider>>,
    model: Option<Arc<dyn SignalModel>>,
    cache_ttl: Option<Option<Duration>>,
    settings: Option<SignalSettings>,
}

impl SignalServiceBuilder {
    pub fn price_provider(mut self, provider: Arc<dyn PriceHistoryProvider>) -> Self {
        self.prices = Some(provider);
        self
    }

    pub fn news_provider(mut self, provider: Arc<dyn NewsProvider>) -> Self {
        self.news = Some(provider);
        self
    }

    pub fn model(mut self, model: Arc<dyn SignalModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// `None` disables the result cache.
    pub fn cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    pub fn settings(mut self, settings: SignalSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<SignalService> {
        let prices = self
            .prices
            .ok_or_else(|| anyhow!("price_provider is required"))?;
        let news = self
            .news
            .ok_or_else(|| anyhow!("news_provider is required"))?;
        let model = self
            .model
            .unwrap_or_else(|| Arc::new(RandomForestSignalModel::default()));
        let settings = self.settings.unwrap_or_default();
        let cache = self
            .cache_ttl
            .unwrap_or(Some(Duration::from_secs(3600)))
            .map(SignalCache::new);

        let slots = settings.max_concurrent_trainings.max(1);
        info!(
            "SignalService: prices={}, news={}, model={}, cache={:?}, training slots={}",
            prices.name(),
            news.name(),
            model.name(),
            cache.as_ref().map(|c| c.ttl()),
            slots
        );

        Ok(SignalService {
            prices,
            news: NewsCollector::new(news, settings.news_limit),
            model,
            cache,
            training_slots: Arc::new(Semaphore::new(slots)),
            settings,
        })
    }
}

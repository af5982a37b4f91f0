use crate::domain::errors::SignalError;
use crate::domain::features::FeatureRow;
use crate::domain::market::PriceBar;
use ta::Next;
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage, FastStochastic, MovingAverageConvergenceDivergence,
    OnBalanceVolume, SimpleMovingAverage,
};
use tracing::warn;

/// Indicator windows used to build feature rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSettings {
    pub rsi_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub fast_sma_period: usize,
    pub trend_sma_period: usize,
    pub ema_period: usize,
    pub stoch_period: usize,
    pub stoch_smoothing: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub atr_period: usize,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            fast_sma_period: 50,
            trend_sma_period: 200,
            ema_period: 20,
            stoch_period: 14,
            stoch_smoothing: 3,
            bb_period: 20,
            bb_std_dev: 2.0,
            atr_period: 14,
        }
    }
}

impl IndicatorSettings {
    /// Number of bars that must be seen before the first complete row.
    pub fn warmup_len(&self) -> usize {
        [
            self.rsi_period,
            self.macd_slow_period + self.macd_signal_period - 1,
            self.fast_sma_period,
            self.trend_sma_period,
            self.ema_period,
            self.stoch_period + self.stoch_smoothing - 1,
            self.bb_period,
            self.atr_period,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// RSI with Wilder's smoothing (alpha = 1/period).
///
/// Seeded at the first bar with a zero change; defined once `period` bars
/// have been seen.
pub struct WilderRsi {
    period: usize,
    prev_close: Option<f64>,
    avg_gain: f64,
    avg_loss: f64,
    count: usize,
}

impl WilderRsi {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            avg_gain: 0.0,
            avg_loss: 0.0,
            count: 0,
        }
    }

    pub fn next(&mut self, close: f64) -> Option<f64> {
        let (gain, loss) = match self.prev_close {
            Some(prev) => {
                let change = close - prev;
                (change.max(0.0), (-change).max(0.0))
            }
            None => (0.0, 0.0),
        };
        self.prev_close = Some(close);

        if self.count == 0 {
            self.avg_gain = gain;
            self.avg_loss = loss;
        } else {
            let alpha = 1.0 / self.period as f64;
            self.avg_gain += alpha * (gain - self.avg_gain);
            self.avg_loss += alpha * (loss - self.avg_loss);
        }
        self.count += 1;

        if self.count < self.period {
            return None;
        }

        let rsi = if self.avg_loss == 0.0 {
            if self.avg_gain == 0.0 { 50.0 } else { 100.0 }
        } else {
            let rs = self.avg_gain / self.avg_loss;
            100.0 - 100.0 / (1.0 + rs)
        };
        Some(rsi)
    }
}

/// Average True Range with Wilder's smoothing.
///
/// The first value is the plain mean of the first `period` true ranges.
pub struct WilderAtr {
    period: usize,
    prev_close: Option<f64>,
    tr_sum: f64,
    atr: Option<f64>,
    count: usize,
}

impl WilderAtr {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            tr_sum: 0.0,
            atr: None,
            count: 0,
        }
    }

    pub fn next(&mut self, high: f64, low: f64, close: f64) -> Option<f64> {
        let tr = match self.prev_close {
            Some(prev_close) => (high - low)
                .max((high - prev_close).abs())
                .max((low - prev_close).abs()),
            None => high - low,
        };
        self.prev_close = Some(close);
        self.count += 1;

        let n = self.period as f64;
        match self.atr {
            Some(prev) => self.atr = Some((prev * (n - 1.0) + tr) / n),
            None => {
                self.tr_sum += tr;
                if self.count == self.period {
                    self.atr = Some(self.tr_sum / n);
                }
            }
        }
        self.atr
    }
}

fn indicator_error(name: &str, err: impl std::fmt::Debug) -> SignalError {
    SignalError::Indicator(format!("invalid {} parameters: {:?}", name, err))
}

/// Streaming feature builder: feed bars in chronological order.
pub struct IndicatorEngine {
    warmup: usize,
    bars_seen: usize,
    rsi: WilderRsi,
    macd: MovingAverageConvergenceDivergence,
    sma_fast: SimpleMovingAverage,
    sma_trend: SimpleMovingAverage,
    ema: ExponentialMovingAverage,
    stoch: FastStochastic,
    stoch_smooth: SimpleMovingAverage,
    bb: BollingerBands,
    atr: WilderAtr,
    obv: OnBalanceVolume,
}

impl IndicatorEngine {
    pub fn new(settings: &IndicatorSettings) -> Result<Self, SignalError> {
        if settings.rsi_period == 0 || settings.atr_period == 0 {
            return Err(SignalError::Indicator(
                "RSI and ATR periods must be > 0".to_string(),
            ));
        }

        Ok(Self {
            warmup: settings.warmup_len(),
            bars_seen: 0,
            rsi: WilderRsi::new(settings.rsi_period),
            macd: MovingAverageConvergenceDivergence::new(
                settings.macd_fast_period,
                settings.macd_slow_period,
                settings.macd_signal_period,
            )
            .map_err(|e| indicator_error("MACD", e))?,
            sma_fast: SimpleMovingAverage::new(settings.fast_sma_period)
                .map_err(|e| indicator_error("fast SMA", e))?,
            sma_trend: SimpleMovingAverage::new(settings.trend_sma_period)
                .map_err(|e| indicator_error("trend SMA", e))?,
            ema: ExponentialMovingAverage::new(settings.ema_period)
                .map_err(|e| indicator_error("EMA", e))?,
            stoch: FastStochastic::new(settings.stoch_period)
                .map_err(|e| indicator_error("stochastic", e))?,
            stoch_smooth: SimpleMovingAverage::new(settings.stoch_smoothing)
                .map_err(|e| indicator_error("stochastic smoothing", e))?,
            bb: BollingerBands::new(settings.bb_period, settings.bb_std_dev)
                .map_err(|e| indicator_error("Bollinger", e))?,
            atr: WilderAtr::new(settings.atr_period),
            obv: OnBalanceVolume::new(),
        })
    }

    pub fn warmup_len(&self) -> usize {
        self.warmup
    }

    /// Advances every indicator by one bar.
    ///
    /// Returns `None` while any windowed indicator is still warming up.
    pub fn update(&mut self, bar: &PriceBar) -> Option<FeatureRow> {
        // Every indicator must see every bar, so evaluate all before deciding.
        let rsi = self.rsi.next(bar.close);
        let macd = self.macd.next(bar.close);
        let sma_50 = self.sma_fast.next(bar.close);
        let sma_200 = self.sma_trend.next(bar.close);
        let ema_20 = self.ema.next(bar.close);
        let stoch_raw = self.stoch.next(bar);
        let stoch_k = self.stoch_smooth.next(stoch_raw);
        let bb = self.bb.next(bar.close);
        let atr = self.atr.next(bar.high, bar.low, bar.close);
        let obv = self.obv.next(bar);
        self.bars_seen += 1;

        if self.bars_seen < self.warmup {
            return None;
        }

        let row = FeatureRow {
            date: bar.date,
            rsi: rsi?,
            macd: macd.macd,
            macd_signal: macd.signal,
            sma_50,
            sma_200,
            ema_20,
            stoch_k,
            atr: atr?,
            obv,
            bb_upper: bb.upper,
            bb_lower: bb.lower,
            close: bar.close,
        };

        row.is_complete().then_some(row)
    }
}

/// Builds one feature row per bar once the warm-up window is filled.
///
/// Bars with non-finite values are skipped; rows with any undefined
/// indicator are dropped rather than filled.
pub fn compute_features(
    bars: &[PriceBar],
    settings: &IndicatorSettings,
) -> Result<Vec<FeatureRow>, SignalError> {
    let mut engine = IndicatorEngine::new(settings)?;
    let mut rows = Vec::with_capacity(bars.len().saturating_sub(engine.warmup_len()) + 1);

    for bar in bars {
        if !bar.is_finite() {
            warn!("IndicatorEngine: skipping non-finite bar on {}", bar.date);
            continue;
        }
        if let Some(row) = engine.update(bar) {
            rows.push(row);
        }
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: i64, close: f64, range: f64, volume: f64) -> PriceBar {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        PriceBar {
            date: start + chrono::Duration::days(day),
            open: close,
            high: close + range,
            low: close - range,
            close,
            volume,
        }
    }

    fn rising_bars(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| bar(i as i64, 100.0 + i as f64, 1.0, 1_000.0))
            .collect()
    }

    fn wavy_bars(n: usize) -> Vec<PriceBar> {
        (0..n)
            .map(|i| {
                let x = i as f64;
                let close = 100.0 + 0.05 * x + 8.0 * (x / 9.0).sin() + 3.0 * (x / 2.3).cos();
                bar(i as i64, close, 1.5, 10_000.0 + 500.0 * (x / 5.0).sin())
            })
            .collect()
    }

    #[test]
    fn test_default_warmup_is_trend_sma() {
        assert_eq!(IndicatorSettings::default().warmup_len(), 200);
    }

    #[test]
    fn test_row_count_matches_warmup() {
        let settings = IndicatorSettings::default();
        let rows = compute_features(&rising_bars(300), &settings).unwrap();
        assert_eq!(rows.len(), 300 - 199);
        assert!(rows.iter().all(|r| r.is_complete()));

        let rows = compute_features(&rising_bars(200), &settings).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_short_history_emits_nothing() {
        let rows = compute_features(&rising_bars(150), &IndicatorSettings::default()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rising_series_momentum() {
        let rows = compute_features(&rising_bars(300), &IndicatorSettings::default()).unwrap();
        let last = rows.last().unwrap();

        assert_eq!(last.rsi, 100.0);
        assert!(last.macd > 0.0);
        assert!(last.close > last.sma_200);
        assert!(last.sma_50 > last.sma_200);
        assert!(last.stoch_k > 90.0, "stoch_k = {}", last.stoch_k);
        // Every up-close adds the full volume
        assert!(last.obv >= 299.0 * 1_000.0);
    }

    #[test]
    fn test_sma_matches_arithmetic_mean() {
        let bars = wavy_bars(260);
        let rows = compute_features(&bars, &IndicatorSettings::default()).unwrap();
        let last = rows.last().unwrap();

        let tail = &bars[bars.len() - 50..];
        let mean = tail.iter().map(|b| b.close).sum::<f64>() / 50.0;
        assert!((last.sma_50 - mean).abs() < 1e-9);

        let tail = &bars[bars.len() - 200..];
        let mean = tail.iter().map(|b| b.close).sum::<f64>() / 200.0;
        assert!((last.sma_200 - mean).abs() < 1e-9);
    }

    #[test]
    fn test_bands_bracket_the_average() {
        let rows = compute_features(&wavy_bars(260), &IndicatorSettings::default()).unwrap();
        for row in &rows {
            assert!(row.bb_upper > row.bb_lower);
            assert!((0.0..=100.0).contains(&row.rsi));
            assert!((0.0..=100.0).contains(&row.stoch_k));
            assert!(row.atr > 0.0);
        }
    }

    #[test]
    fn test_no_look_ahead() {
        let bars = wavy_bars(280);
        let settings = IndicatorSettings::default();
        let full = compute_features(&bars, &settings).unwrap();
        let prefix = compute_features(&bars[..240], &settings).unwrap();

        assert_eq!(prefix.len(), 41);
        for (a, b) in prefix.iter().zip(full.iter()) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_non_finite_bars_are_skipped() {
        let mut bars = rising_bars(301);
        bars[150].close = f64::NAN;
        let rows = compute_features(&bars, &IndicatorSettings::default()).unwrap();
        assert_eq!(rows.len(), 300 - 199);
        assert!(rows.iter().all(|r| r.is_complete()));
    }

    #[test]
    fn test_wilder_atr_constant_range() {
        let mut atr = WilderAtr::new(14);
        let mut last = None;
        for _ in 0..30 {
            last = atr.next(101.0, 99.0, 100.0);
        }
        assert!((last.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_wilder_atr_reacts_to_volatility() {
        let mut atr = WilderAtr::new(14);
        for _ in 0..20 {
            atr.next(101.0, 99.0, 100.0);
        }
        // TR jumps to 20: (2 * 13 + 20) / 14
        let value = atr.next(110.0, 90.0, 100.0).unwrap();
        assert!((value - 46.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn test_wilder_rsi_warmup_and_bounds() {
        let mut rsi = WilderRsi::new(14);
        for i in 0..13 {
            assert!(rsi.next(100.0 + i as f64).is_none());
        }
        assert_eq!(rsi.next(113.0), Some(100.0));

        let mut flat = WilderRsi::new(14);
        let mut value = None;
        for _ in 0..20 {
            value = flat.next(50.0);
        }
        assert_eq!(value, Some(50.0));

        let mut falling = WilderRsi::new(14);
        let mut value = None;
        for i in 0..40 {
            value = falling.next(200.0 - i as f64);
        }
        assert_eq!(value, Some(0.0));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = IndicatorSettings {
            fast_sma_period: 0,
            ..Default::default()
        };
        assert!(matches!(
            IndicatorEngine::new(&settings),
            Err(SignalError::Indicator(_))
        ));
    }
}

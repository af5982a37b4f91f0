use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Ordered list of model feature names.
/// This order MUST match `FeatureRow::model_features`.
pub const FEATURE_NAMES: &[&str] = &[
    "rsi",
    "macd",
    "macd_signal",
    "sma_50",
    "sma_200",
    "ema_20",
    "stoch_k",
    "atr",
    "obv",
];

/// Technical indicator snapshot for one trading day.
///
/// Only emitted once every indicator is defined for that day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    pub ema_20: f64,
    pub stoch_k: f64,
    pub atr: f64,
    pub obv: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub close: f64,
}

impl FeatureRow {
    /// Model input vector, in `FEATURE_NAMES` order.
    pub fn model_features(&self) -> Vec<f64> {
        vec![
            self.rsi,
            self.macd,
            self.macd_signal,
            self.sma_50,
            self.sma_200,
            self.ema_20,
            self.stoch_k,
            self.atr,
            self.obv,
        ]
    }

    pub fn is_complete(&self) -> bool {
        [
            self.rsi,
            self.macd,
            self.macd_signal,
            self.sma_50,
            self.sma_200,
            self.ema_20,
            self.stoch_k,
            self.atr,
            self.obv,
            self.bb_upper,
            self.bb_lower,
            self.close,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A feature row with its forward-return label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub row: FeatureRow,
    /// Close `LABEL_HORIZON` sessions later exceeded this close.
    pub target: bool,
}

impl LabeledRow {
    pub fn target_value(&self) -> f64 {
        if self.target { 1.0 } else { 0.0 }
    }
}

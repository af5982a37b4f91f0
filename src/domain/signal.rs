use crate::domain::features::FeatureRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
    #[serde(rename = "NEUTRAL")]
    Neutral,
    #[serde(rename = "ERROR")]
    Error,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrongBuy => write!(f, "STRONG BUY"),
            Self::Buy => write!(f, "BUY"),
            Self::Hold => write!(f, "HOLD"),
            Self::Sell => write!(f, "SELL"),
            Self::StrongSell => write!(f, "STRONG SELL"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl Signal {
    /// True for the five signals produced by the model policy.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Neutral | Self::Error)
    }

    pub fn is_bullish(&self) -> bool {
        matches!(self, Self::StrongBuy | Self::Buy)
    }

    pub fn is_bearish(&self) -> bool {
        matches!(self, Self::StrongSell | Self::Sell)
    }
}

/// Raw news record as returned by a provider; either field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: Option<String>,
}

/// Snapshot of the latest feature row shown alongside a signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalMetrics {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub sma_200: f64,
    pub close: f64,
}

impl From<&FeatureRow> for SignalMetrics {
    fn from(row: &FeatureRow) -> Self {
        Self {
            rsi: row.rsi,
            macd: row.macd,
            macd_signal: row.macd_signal,
            sma_200: row.sma_200,
            close: row.close,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    pub symbol: String,
    pub signal: Signal,
    /// Final probability of a rise, as a percentage (0-100).
    pub confidence: f64,
    pub reason: String,
    pub metrics: Option<SignalMetrics>,
    pub news: Vec<Headline>,
    pub generated_at: DateTime<Utc>,
}

impl SignalResult {
    pub fn neutral(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::empty(symbol, Signal::Neutral, reason)
    }

    pub fn error(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::empty(symbol, Signal::Error, reason)
    }

    fn empty(symbol: impl Into<String>, signal: Signal, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            signal,
            confidence: 0.0,
            reason: reason.into(),
            metrics: None,
            news: Vec::new(),
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_labels() {
        assert_eq!(Signal::StrongBuy.to_string(), "STRONG BUY");
        assert_eq!(Signal::StrongSell.to_string(), "STRONG SELL");
        assert_eq!(
            serde_json::to_string(&Signal::StrongBuy).unwrap(),
            "\"STRONG BUY\""
        );
        assert_eq!(
            serde_json::from_str::<Signal>("\"HOLD\"").unwrap(),
            Signal::Hold
        );
    }

    #[test]
    fn test_error_result_is_empty() {
        let result = SignalResult::error("AAPL", "boom");
        assert_eq!(result.signal, Signal::Error);
        assert_eq!(result.confidence, 0.0);
        assert!(result.metrics.is_none());
        assert!(result.news.is_empty());
        assert!(!result.signal.is_actionable());
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One daily OHLCV session of a single symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// True when every price and the volume are finite numbers.
    pub fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

// Lets `ta` indicators consume bars directly.
impl ta::Open for PriceBar {
    fn open(&self) -> f64 {
        self.open
    }
}

impl ta::High for PriceBar {
    fn high(&self) -> f64 {
        self.high
    }
}

impl ta::Low for PriceBar {
    fn low(&self) -> f64 {
        self.low
    }
}

impl ta::Close for PriceBar {
    fn close(&self) -> f64 {
        self.close
    }
}

impl ta::Volume for PriceBar {
    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Lookback window requested from a price-history provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryPeriod {
    OneYear,
    #[default]
    TwoYears,
    FiveYears,
    Max,
}

impl HistoryPeriod {
    /// Range token understood by the Yahoo chart endpoint.
    pub fn as_range(&self) -> &'static str {
        match self {
            Self::OneYear => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::Max => "max",
        }
    }

    /// Calendar days covered, `None` for the full history.
    pub fn calendar_days(&self) -> Option<i64> {
        match self {
            Self::OneYear => Some(365),
            Self::TwoYears => Some(730),
            Self::FiveYears => Some(1826),
            Self::Max => None,
        }
    }

    /// First date inside the window that ends at `end`.
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        self.calendar_days()
            .map(|days| end - chrono::Duration::days(days))
    }
}

impl fmt::Display for HistoryPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_range())
    }
}

impl FromStr for HistoryPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1y" => Ok(Self::OneYear),
            "2y" => Ok(Self::TwoYears),
            "5y" => Ok(Self::FiveYears),
            "max" => Ok(Self::Max),
            _ => anyhow::bail!(
                "Invalid history period: {}. Must be '1y', '2y', '5y' or 'max'",
                s
            ),
        }
    }
}

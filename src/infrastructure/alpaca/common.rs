use crate::domain::market::PriceBar;
use chrono::DateTime;
use reqwest_middleware::RequestBuilder;
use serde::{Deserialize, Serialize};

pub const PROVIDER: &str = "Alpaca";
pub const DEFAULT_ALPACA_DATA_URL: &str = "https://data.alpaca.markets";

/// API key pair sent with every Alpaca data request
#[derive(Debug, Clone)]
pub struct AlpacaCredentials {
    pub api_key: String,
    pub secret_key: String,
}

impl AlpacaCredentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("APCA-API-KEY-ID", &self.api_key)
            .header("APCA-API-SECRET-KEY", &self.secret_key)
    }
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct AlpacaBar {
    #[serde(rename = "t")]
    pub timestamp: String,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

impl AlpacaBar {
    /// `None` when the timestamp is not RFC 3339.
    pub fn to_price_bar(&self) -> Option<PriceBar> {
        let date = DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()?
            .date_naive();
        Some(PriceBar {
            date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_bar_conversion() {
        let bar: AlpacaBar = serde_json::from_str(
            r#"{"t":"2024-03-01T05:00:00Z","o":179.55,"h":180.53,"l":177.38,"c":179.66,"v":73563082,"n":1,"vw":179.1}"#,
        )
        .unwrap();
        let price = bar.to_price_bar().unwrap();
        assert_eq!(price.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(price.volume, 73_563_082.0);

        let broken = AlpacaBar {
            timestamp: "yesterday".to_string(),
            ..bar
        };
        assert!(broken.to_price_bar().is_none());
    }
}

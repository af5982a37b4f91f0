use super::common::{AlpacaBar, AlpacaCredentials, DEFAULT_ALPACA_DATA_URL, PROVIDER};
use crate::domain::errors::ProviderError;
use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::core::{HttpClientFactory, decode_json, endpoint_url, fetch_text};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Start date used for `HistoryPeriod::Max`; the IEX feed has nothing older.
const EARLIEST_BAR: (i32, u32, u32) = (2016, 1, 1);

#[derive(Debug, Deserialize)]
struct AlpacaBarResponse {
    #[serde(default)]
    bars: Option<HashMap<String, Vec<AlpacaBar>>>,
    next_page_token: Option<String>,
}

/// Daily bars from the Alpaca market data API.
pub struct AlpacaPriceHistoryProvider {
    client: ClientWithMiddleware,
    credentials: AlpacaCredentials,
    data_base_url: String,
}

impl AlpacaPriceHistoryProvider {
    pub fn new(credentials: AlpacaCredentials, data_base_url: impl Into<String>) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            credentials,
            data_base_url: data_base_url.into(),
        }
    }

    pub fn with_default_url(credentials: AlpacaCredentials) -> Self {
        Self::new(credentials, DEFAULT_ALPACA_DATA_URL)
    }
}

fn window_start(period: HistoryPeriod, today: NaiveDate) -> NaiveDate {
    let (y, m, d) = EARLIEST_BAR;
    let earliest = NaiveDate::from_ymd_opt(y, m, d).unwrap_or(today);
    period
        .start_date(today)
        .map_or(earliest, |start| start.max(earliest))
}

#[async_trait]
impl PriceHistoryProvider for AlpacaPriceHistoryProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let start = window_start(period, Utc::now().date_naive());

        let mut all_bars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query_params = vec![
                ("symbols", symbol.to_string()),
                ("timeframe", "1Day".to_string()),
                ("start", start.to_string()),
                ("adjustment", "all".to_string()),
                ("feed", "iex".to_string()),
                ("limit", "10000".to_string()),
            ];
            if let Some(token) = &page_token {
                query_params.push(("page_token", token.clone()));
            }

            let url = endpoint_url(PROVIDER, &self.data_base_url, "/v2/stocks/bars", &query_params)?;
            debug!("AlpacaPriceHistoryProvider: GET {}", url);

            let request = self.credentials.authorize(self.client.get(url));
            let body = fetch_text(PROVIDER, request).await?;
            let page: AlpacaBarResponse = decode_json(PROVIDER, &body)?;

            if let Some(bars) = page.bars.as_ref().and_then(|b| b.get(symbol)) {
                for bar in bars {
                    match bar.to_price_bar() {
                        Some(price) => all_bars.push(price),
                        None => warn!(
                            "AlpacaPriceHistoryProvider: skipping bar with timestamp {:?} for {}",
                            bar.timestamp, symbol
                        ),
                    }
                }
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        debug!(
            "AlpacaPriceHistoryProvider: {} bars for {} since {}",
            all_bars.len(),
            symbol,
            start
        );
        Ok(all_bars)
    }

    fn name(&self) -> &str {
        "Alpaca"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 30).unwrap();
        assert_eq!(
            window_start(HistoryPeriod::TwoYears, today),
            NaiveDate::from_ymd_opt(2023, 7, 1).unwrap()
        );
        assert_eq!(
            window_start(HistoryPeriod::Max, today),
            NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()
        );
    }

    #[test]
    fn test_page_decoding() {
        let body = r#"{"bars":{"AAPL":[{"t":"2024-03-01T05:00:00Z","o":1.0,"h":2.0,"l":0.5,"c":1.5,"v":100}]},"next_page_token":"abc"}"#;
        let page: AlpacaBarResponse = decode_json(PROVIDER, body).unwrap();
        assert_eq!(page.bars.unwrap()["AAPL"].len(), 1);
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let empty: AlpacaBarResponse =
            decode_json(PROVIDER, r#"{"bars":null,"next_page_token":null}"#).unwrap();
        assert!(empty.bars.is_none());
    }
}

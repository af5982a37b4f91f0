use crate::domain::errors::ProviderError;
use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::ports::PriceHistoryProvider;
use crate::infrastructure::core::{HttpClientFactory, decode_json, endpoint_url, fetch_text};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, info};

const PROVIDER: &str = "Yahoo";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

impl ChartQuote {
    fn bar_at(&self, i: usize) -> Option<[f64; 5]> {
        let pick = |series: &[Option<f64>]| series.get(i).copied().flatten();
        Some([
            pick(&self.open)?,
            pick(&self.high)?,
            pick(&self.low)?,
            pick(&self.close)?,
            pick(&self.volume)?,
        ])
    }
}

/// Decodes a v8 chart payload into daily bars.
///
/// Sessions with any missing OHLCV field are dropped. Dates are taken in the
/// exchange's local time. A "Not Found" chart error is an empty history.
pub fn parse_chart(body: &str) -> Result<Vec<PriceBar>, ProviderError> {
    let envelope: ChartEnvelope = decode_json(PROVIDER, body)?;

    if let Some(error) = envelope.chart.error {
        if error.code == "Not Found" {
            return Ok(Vec::new());
        }
        return Err(ProviderError::Request {
            provider: PROVIDER,
            reason: format!(
                "chart error {}: {}",
                error.code,
                error.description.unwrap_or_default()
            ),
        });
    }

    let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some([open, high, low, close, volume]) = quote.bar_at(i) else {
            continue;
        };
        let Some(local) = DateTime::from_timestamp(ts + offset, 0) else {
            continue;
        };
        bars.push(PriceBar {
            date: local.date_naive(),
            open,
            high,
            low,
            close,
            volume,
        });
    }

    Ok(bars)
}

/// Daily history from the Yahoo Finance chart endpoint.
pub struct YahooPriceHistoryProvider {
    client: ClientWithMiddleware,
    base_url: String,
}

impl YahooPriceHistoryProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            base_url: base_url.into(),
        }
    }

    /// Chart URL with `symbol` appended as a single escaped path segment.
    pub fn chart_url(&self, symbol: &str, period: HistoryPeriod) -> Result<Url, ProviderError> {
        let mut url = endpoint_url(
            PROVIDER,
            &self.base_url,
            "/v8/finance/chart",
            &[
                ("range", period.as_range().to_string()),
                ("interval", "1d".to_string()),
            ],
        )?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Request {
                provider: PROVIDER,
                reason: format!("base URL {} cannot take a path", self.base_url),
            })?
            .push(symbol);
        Ok(url)
    }
}

impl Default for YahooPriceHistoryProvider {
    fn default() -> Self {
        Self::new(DEFAULT_YAHOO_BASE_URL)
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooPriceHistoryProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let url = self.chart_url(symbol, period)?;
        debug!("YahooPriceHistoryProvider: GET {}", url);

        let body = match fetch_text(PROVIDER, self.client.get(url)).await {
            Ok(body) => body,
            Err(ProviderError::Status {
                status: 404, body, ..
            }) => body,
            Err(e) => return Err(e),
        };

        let bars = parse_chart(&body)?;
        if bars.is_empty() {
            info!("YahooPriceHistoryProvider: no history for {}", symbol);
        }
        Ok(bars)
    }

    fn name(&self) -> &str {
        "Yahoo"
    }
}

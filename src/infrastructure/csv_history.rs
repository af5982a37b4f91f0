use crate::domain::errors::ProviderError;
use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::ports::PriceHistoryProvider;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const PROVIDER: &str = "CSV";

#[derive(Debug, Deserialize)]
struct CsvBar {
    #[serde(alias = "Date")]
    date: NaiveDate,
    #[serde(alias = "Open")]
    open: Option<f64>,
    #[serde(alias = "High")]
    high: Option<f64>,
    #[serde(alias = "Low")]
    low: Option<f64>,
    #[serde(alias = "Close")]
    close: Option<f64>,
    #[serde(alias = "Volume")]
    volume: Option<f64>,
}

impl CsvBar {
    fn into_price_bar(self) -> Option<PriceBar> {
        Some(PriceBar {
            date: self.date,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume?,
        })
    }
}

/// Parses `date,open,high,low,close,volume` rows, sorted by date.
///
/// Rows with an empty price or volume cell are skipped.
pub fn parse_history(body: &str) -> Result<Vec<PriceBar>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut bars = Vec::new();
    for (line, record) in reader.deserialize::<CsvBar>().enumerate() {
        let record = record.map_err(|e| ProviderError::Decode {
            provider: PROVIDER,
            reason: format!("row {}: {}", line + 1, e),
        })?;
        match record.into_price_bar() {
            Some(bar) => bars.push(bar),
            None => debug!("CsvPriceHistoryProvider: skipping incomplete row {}", line + 1),
        }
    }

    bars.sort_by_key(|bar| bar.date);
    Ok(bars)
}

/// Keeps the bars inside `period`, counted back from the last bar.
pub fn trim_to_period(bars: Vec<PriceBar>, period: HistoryPeriod) -> Vec<PriceBar> {
    let Some(start) = bars.last().and_then(|last| period.start_date(last.date)) else {
        return bars;
    };
    bars.into_iter().filter(|bar| bar.date > start).collect()
}

/// Daily history read from `{dir}/{SYMBOL}.csv`.
pub struct CsvPriceHistoryProvider {
    data_dir: PathBuf,
}

impl CsvPriceHistoryProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }
}

#[async_trait]
impl PriceHistoryProvider for CsvPriceHistoryProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let path = self.path_for(symbol);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("CsvPriceHistoryProvider: no file for {} at {:?}", symbol, path);
                return Ok(Vec::new());
            }
            Err(source) => {
                warn!("CsvPriceHistoryProvider: cannot read {:?}: {}", path, source);
                return Err(ProviderError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };

        let bars = trim_to_period(parse_history(&body)?, period);
        debug!(
            "CsvPriceHistoryProvider: {} bars for {} ({})",
            bars.len(),
            symbol,
            period
        );
        Ok(bars)
    }

    fn name(&self) -> &str {
        "CSV"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Date,Open,High,Low,Close,Adj Close,Volume
2024-01-03,184.22,185.88,183.43,184.25,183.5,58414500
2024-01-02,187.15,188.44,183.89,185.64,184.9,82488700
2024-01-04,182.15,183.09,180.88,,181.1,71983600
";

    #[test]
    fn test_parse_history_sorts_and_skips_gaps() {
        let bars = parse_history(SAMPLE).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 184.25);
    }

    #[test]
    fn test_parse_history_rejects_bad_dates() {
        let err = parse_history("date,open,high,low,close,volume\nsoon,1,1,1,1,1\n").unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[test]
    fn test_trim_to_period_is_relative_to_last_bar() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars: Vec<PriceBar> = (0..1000)
            .map(|i| PriceBar {
                date: start + chrono::Duration::days(i),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                volume: 1.0,
            })
            .collect();

        assert_eq!(trim_to_period(bars.clone(), HistoryPeriod::OneYear).len(), 365);
        assert_eq!(trim_to_period(bars.clone(), HistoryPeriod::Max).len(), 1000);
        assert_eq!(trim_to_period(bars, HistoryPeriod::FiveYears).len(), 1000);
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvPriceHistoryProvider::new(dir.path());
        let bars = provider
            .fetch_history("NOPE", HistoryPeriod::TwoYears)
            .await
            .unwrap();
        assert!(bars.is_empty());
    }

    #[tokio::test]
    async fn test_reads_symbol_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("AAPL.csv")).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let provider = CsvPriceHistoryProvider::new(dir.path());
        let bars = provider
            .fetch_history("AAPL", HistoryPeriod::OneYear)
            .await
            .unwrap();
        assert_eq!(bars.len(), 2);
    }
}

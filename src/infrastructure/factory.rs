use crate::application::ml::RandomForestSignalModel;
use crate::application::signal::SignalService;
use crate::config::{Config, Mode, NewsSource};
use crate::domain::ports::{NewsProvider, PriceHistoryProvider};
use crate::infrastructure::alpaca::{AlpacaCredentials, AlpacaNewsProvider, AlpacaPriceHistoryProvider};
use crate::infrastructure::csv_history::CsvPriceHistoryProvider;
use crate::infrastructure::mock::{MockNewsProvider, MockPriceHistoryProvider};
use crate::infrastructure::news::{DisabledNewsProvider, RssNewsProvider};
use crate::infrastructure::yahoo::YahooPriceHistoryProvider;
use anyhow::{Context, Result};
use std::sync::Arc;

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_price_provider(config: &Config) -> Result<Arc<dyn PriceHistoryProvider>> {
        let provider: Arc<dyn PriceHistoryProvider> = match config.mode {
            Mode::Yahoo => Arc::new(YahooPriceHistoryProvider::new(
                config.providers.yahoo_base_url.clone(),
            )),
            Mode::Alpaca => Arc::new(AlpacaPriceHistoryProvider::new(
                Self::alpaca_credentials(config).context("MODE=alpaca")?,
                config.providers.alpaca_data_url.clone(),
            )),
            Mode::Csv => Arc::new(CsvPriceHistoryProvider::new(
                config.providers.csv_data_dir.clone(),
            )),
            Mode::Mock => Arc::new(MockPriceHistoryProvider::synthetic()),
        };
        Ok(provider)
    }

    /// Mock mode stays offline and ignores `NEWS_SOURCE`.
    pub fn create_news_provider(config: &Config) -> Result<Arc<dyn NewsProvider>> {
        if config.mode == Mode::Mock {
            return Ok(Arc::new(MockNewsProvider::new()));
        }

        let provider: Arc<dyn NewsProvider> = match config.providers.news_source {
            NewsSource::Rss => Arc::new(RssNewsProvider::new(
                config.providers.news_rss_url.clone(),
            )),
            NewsSource::Alpaca => Arc::new(AlpacaNewsProvider::new(
                Self::alpaca_credentials(config).context("NEWS_SOURCE=alpaca")?,
                config.providers.alpaca_data_url.clone(),
                config.signal.news_limit,
            )),
            NewsSource::None => Arc::new(DisabledNewsProvider),
        };
        Ok(provider)
    }

    pub fn create_signal_service(config: &Config) -> Result<SignalService> {
        SignalService::builder()
            .price_provider(Self::create_price_provider(config)?)
            .news_provider(Self::create_news_provider(config)?)
            .model(Arc::new(RandomForestSignalModel::new(
                config.model.to_forest_parameters(),
            )))
            .settings(config.signal.to_signal_settings())
            .cache_ttl(config.signal.cache_ttl())
            .build()
    }

    fn alpaca_credentials(config: &Config) -> Result<AlpacaCredentials> {
        if !config.providers.has_alpaca_credentials() {
            anyhow::bail!("ALPACA_API_KEY and ALPACA_SECRET_KEY must be set");
        }
        Ok(AlpacaCredentials::new(
            config.providers.alpaca_api_key.clone(),
            config.providers.alpaca_secret_key.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lookup;

    fn config(pairs: &'static [(&'static str, &'static str)]) -> Config {
        let lookup: Box<Lookup> = Box::new(move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        });
        Config::from_lookup(lookup.as_ref()).unwrap()
    }

    #[test]
    fn test_mock_mode_is_offline() {
        let config = config(&[("MODE", "mock"), ("NEWS_SOURCE", "rss")]);
        assert_eq!(
            ServiceFactory::create_price_provider(&config).unwrap().name(),
            "Mock"
        );
        assert_eq!(
            ServiceFactory::create_news_provider(&config).unwrap().name(),
            "MockNews"
        );
        assert!(ServiceFactory::create_signal_service(&config).is_ok());
    }

    #[test]
    fn test_alpaca_requires_credentials() {
        let config = config(&[("MODE", "alpaca")]);
        let err = ServiceFactory::create_price_provider(&config)
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("ALPACA_API_KEY"));
    }

    #[test]
    fn test_news_source_selection() {
        let config = config(&[("MODE", "csv"), ("NEWS_SOURCE", "none")]);
        assert_eq!(
            ServiceFactory::create_news_provider(&config).unwrap().name(),
            "Disabled"
        );
        assert_eq!(
            ServiceFactory::create_price_provider(&config).unwrap().name(),
            "CSV"
        );
    }
}

use crate::domain::errors::ProviderError;
use crate::domain::market::{HistoryPeriod, PriceBar};
use crate::domain::signal::NewsItem;
use async_trait::async_trait;

// Need async_trait for async functions in object-safe traits
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Chronological daily bars for `symbol`.
    ///
    /// An unknown symbol yields an empty history rather than an error.
    async fn fetch_history(
        &self,
        symbol: &str,
        period: HistoryPeriod,
    ) -> Result<Vec<PriceBar>, ProviderError>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Recent news for `symbol`, newest first.
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ProviderError>;

    fn name(&self) -> &str;
}

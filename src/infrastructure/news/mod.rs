pub mod rss;

use crate::domain::errors::ProviderError;
use crate::domain::ports::NewsProvider;
use crate::domain::signal::NewsItem;
use async_trait::async_trait;

pub use self::rss::{DEFAULT_NEWS_RSS_URL, RssNewsProvider};

/// News source that never returns anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNewsProvider;

#[async_trait]
impl NewsProvider for DisabledNewsProvider {
    async fn fetch_news(&self, _symbol: &str) -> Result<Vec<NewsItem>, ProviderError> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "Disabled"
    }
}

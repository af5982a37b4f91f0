use crate::domain::errors::ProviderError;
use crate::domain::ports::NewsProvider;
use crate::domain::signal::NewsItem;
use crate::infrastructure::core::{HttpClientFactory, fetch_text};
use async_trait::async_trait;
use reqwest::Url;
use reqwest_middleware::ClientWithMiddleware;
use rss::Channel;
use tracing::debug;
use url::form_urlencoded;

const PROVIDER: &str = "RSS";
pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";
pub const DEFAULT_NEWS_RSS_URL: &str =
    "https://feeds.finance.yahoo.com/rss/2.0/headline?s={symbol}&region=US&lang=en-US";

/// Per-symbol headlines from an RSS feed.
///
/// The feed URL is a template in which `{symbol}` is replaced by the ticker.
pub struct RssNewsProvider {
    url_template: String,
    client: ClientWithMiddleware,
}

impl RssNewsProvider {
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            client: HttpClientFactory::create_client(),
        }
    }

    /// Feed URL for `symbol`, percent-encoded so tickers like `M&M.NS` stay intact.
    pub fn feed_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let encoded: String = form_urlencoded::byte_serialize(symbol.as_bytes()).collect();
        let raw = self.url_template.replace(SYMBOL_PLACEHOLDER, &encoded);
        Url::parse(&raw).map_err(|e| ProviderError::Request {
            provider: PROVIDER,
            reason: format!("invalid feed URL {}: {}", raw, e),
        })
    }
}

impl Default for RssNewsProvider {
    fn default() -> Self {
        Self::new(DEFAULT_NEWS_RSS_URL)
    }
}

/// Items of an RSS 2.0 document, in feed order.
pub fn parse_feed(body: &str) -> Result<Vec<NewsItem>, ProviderError> {
    let channel = Channel::read_from(body.as_bytes()).map_err(|e| ProviderError::Decode {
        provider: PROVIDER,
        reason: e.to_string(),
    })?;

    Ok(channel
        .items()
        .iter()
        .map(|item| NewsItem {
            title: item.title().map(str::to_string),
            link: item.link().map(str::to_string),
        })
        .collect())
}

#[async_trait]
impl NewsProvider for RssNewsProvider {
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ProviderError> {
        let url = self.feed_url(symbol)?;
        debug!("RssNewsProvider: polling {}", url);

        let body = fetch_text(PROVIDER, self.client.get(url)).await?;
        let items = parse_feed(&body)?;
        debug!("RssNewsProvider: {} items for {}", items.len(), symbol);
        Ok(items)
    }

    fn name(&self) -> &str {
        "RSS"
    }
}

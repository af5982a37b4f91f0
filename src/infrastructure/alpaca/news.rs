use super::common::{AlpacaCredentials, DEFAULT_ALPACA_DATA_URL, PROVIDER};
use crate::domain::errors::ProviderError;
use crate::domain::ports::NewsProvider;
use crate::domain::signal::NewsItem;
use crate::infrastructure::core::{HttpClientFactory, decode_json, endpoint_url, fetch_text};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct AlpacaNewsResponse {
    #[serde(default)]
    news: Vec<AlpacaArticle>,
}

#[derive(Debug, Deserialize)]
struct AlpacaArticle {
    headline: Option<String>,
    url: Option<String>,
}

/// Recent articles from the Alpaca news API, newest first.
pub struct AlpacaNewsProvider {
    client: ClientWithMiddleware,
    credentials: AlpacaCredentials,
    data_base_url: String,
    limit: usize,
}

impl AlpacaNewsProvider {
    pub fn new(
        credentials: AlpacaCredentials,
        data_base_url: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            client: HttpClientFactory::create_client(),
            credentials,
            data_base_url: data_base_url.into(),
            limit: limit.max(1),
        }
    }

    pub fn with_default_url(credentials: AlpacaCredentials, limit: usize) -> Self {
        Self::new(credentials, DEFAULT_ALPACA_DATA_URL, limit)
    }
}

fn to_items(response: AlpacaNewsResponse) -> Vec<NewsItem> {
    response
        .news
        .into_iter()
        .map(|article| NewsItem {
            title: article.headline,
            link: article.url,
        })
        .collect()
}

#[async_trait]
impl NewsProvider for AlpacaNewsProvider {
    async fn fetch_news(&self, symbol: &str) -> Result<Vec<NewsItem>, ProviderError> {
        let url = endpoint_url(
            PROVIDER,
            &self.data_base_url,
            "/v1beta1/news",
            &[
                ("symbols", symbol.to_string()),
                ("limit", self.limit.to_string()),
                ("sort", "desc".to_string()),
            ],
        )?;
        debug!("AlpacaNewsProvider: GET {}", url);

        let request = self.credentials.authorize(self.client.get(url));
        let body = fetch_text(PROVIDER, request).await?;
        Ok(to_items(decode_json(PROVIDER, &body)?))
    }

    fn name(&self) -> &str {
        "AlpacaNews"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_articles_map_to_items() {
        let body = r#"{"news":[
            {"id":1,"headline":"Apple shares surge","url":"https://example.com/a","created_at":"2024-03-01T12:00:00Z"},
            {"id":2,"headline":null,"url":""}
        ],"next_page_token":null}"#;
        let items = to_items(decode_json(PROVIDER, body).unwrap());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title.as_deref(), Some("Apple shares surge"));
        assert!(items[1].title.is_none());
    }
}

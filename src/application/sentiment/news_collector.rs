use super::keyword_scorer::KeywordSentimentScorer;
use crate::domain::ports::NewsProvider;
use crate::domain::signal::{Headline, NewsItem};
use std::sync::Arc;
use tracing::{debug, warn};

/// Headlines gathered for one request and their sentiment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentimentReport {
    /// Mean keyword contribution, in [-1, 1].
    pub score: f64,
    pub headlines: Vec<Headline>,
}

impl SentimentReport {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Strips a market suffix such as `.NS`, if present.
pub fn base_symbol(symbol: &str) -> Option<&str> {
    let (base, suffix) = symbol.rsplit_once('.')?;
    (!base.is_empty() && !suffix.is_empty()).then_some(base)
}

/// Turns raw provider items into headlines.
///
/// Only the first `limit` items are considered; items without a usable
/// title are skipped.
pub fn extract_headlines(items: &[NewsItem], limit: usize) -> Vec<Headline> {
    items
        .iter()
        .take(limit)
        .filter_map(|item| {
            let title = item.title.as_deref()?.trim();
            if title.is_empty() {
                return None;
            }
            let link = item
                .link
                .as_deref()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string);
            Some(Headline {
                title: title.to_string(),
                link,
            })
        })
        .collect()
}

/// Fetches recent headlines and scores them.
///
/// Never fails: provider errors degrade to an empty report.
pub struct NewsCollector {
    provider: Arc<dyn NewsProvider>,
    scorer: KeywordSentimentScorer,
    limit: usize,
}

impl NewsCollector {
    pub fn new(provider: Arc<dyn NewsProvider>, limit: usize) -> Self {
        Self {
            provider,
            scorer: KeywordSentimentScorer::new(),
            limit,
        }
    }

    pub async fn collect(&self, symbol: &str) -> SentimentReport {
        let mut items = match self.provider.fetch_news(symbol).await {
            Ok(items) => items,
            Err(e) => {
                warn!(
                    "NewsCollector: {} failed for {}: {}. Continuing without news.",
                    self.provider.name(),
                    symbol,
                    e
                );
                return SentimentReport::empty();
            }
        };

        // Listings like TCS.NS often only carry news under the bare ticker
        let fallback = if items.is_empty() {
            base_symbol(symbol)
        } else {
            None
        };
        if let Some(base) = fallback {
            debug!("NewsCollector: no news for {}, retrying as {}", symbol, base);
            items = match self.provider.fetch_news(base).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(
                        "NewsCollector: {} failed for {}: {}. Continuing without news.",
                        self.provider.name(),
                        base,
                        e
                    );
                    return SentimentReport::empty();
                }
            };
        }

        let headlines = extract_headlines(&items, self.limit);
        let score = self.scorer.score(&headlines);
        debug!(
            "NewsCollector: {} headlines for {} (score {:.2})",
            headlines.len(),
            symbol,
            score
        );

        SentimentReport { score, headlines }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: Option<&str>, link: Option<&str>) -> NewsItem {
        NewsItem {
            title: title.map(str::to_string),
            link: link.map(str::to_string),
        }
    }

    #[test]
    fn test_base_symbol() {
        assert_eq!(base_symbol("TCS.NS"), Some("TCS"));
        assert_eq!(base_symbol("RELIANCE.BO"), Some("RELIANCE"));
        assert_eq!(base_symbol("AAPL"), None);
        assert_eq!(base_symbol(".NS"), None);
        assert_eq!(base_symbol("AAPL."), None);
    }

    #[test]
    fn test_extract_skips_malformed_items() {
        let items = vec![
            item(Some("Shares surge"), Some("https://example.com/a")),
            item(None, Some("https://example.com/b")),
            item(Some("   "), None),
            item(Some("Guidance cut"), Some("")),
        ];
        let headlines = extract_headlines(&items, 5);

        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[0].link.as_deref(), Some("https://example.com/a"));
        assert_eq!(headlines[1].title, "Guidance cut");
        assert_eq!(headlines[1].link, None);
    }

    #[test]
    fn test_extract_limits_before_filtering() {
        let mut items: Vec<NewsItem> = (0..4).map(|_| item(None, None)).collect();
        items.extend((0..4).map(|i| item(Some(&format!("Story {}", i)), None)));

        // Only the first five items are looked at
        let headlines = extract_headlines(&items, 5);
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].title, "Story 0");
    }
}

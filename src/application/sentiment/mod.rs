pub mod keyword_scorer;
pub mod news_collector;

pub use keyword_scorer::KeywordSentimentScorer;
pub use news_collector::{NewsCollector, SentimentReport};

//! Keyword-based headline sentiment.
//!
//! Each headline title is lower-cased and checked for financial keywords by
//! substring. A title with any bullish keyword counts +1; otherwise any
//! bearish keyword counts -1; otherwise 0. Bullish matches win ties.
//!
//! # Example
//! ```
//! use stockpulse::application::sentiment::KeywordSentimentScorer;
//!
//! let scorer = KeywordSentimentScorer::new();
//! assert_eq!(scorer.score_title("Shares surge on record profit"), 1);
//! ```

use crate::domain::signal::Headline;

pub const BULLISH_KEYWORDS: &[&str] = &[
    "surge", "jump", "gain", "record", "bull", "buy", "profit", "growth", "beat", "strong",
];

pub const BEARISH_KEYWORDS: &[&str] = &[
    "drop", "fall", "loss", "crash", "bear", "sell", "miss", "down", "weak", "risk",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSentimentScorer;

impl KeywordSentimentScorer {
    pub fn new() -> Self {
        Self
    }

    /// Contribution of a single title: +1, -1 or 0.
    pub fn score_title(&self, title: &str) -> i32 {
        let title_lower = title.to_lowercase();

        if BULLISH_KEYWORDS.iter().any(|k| title_lower.contains(k)) {
            1
        } else if BEARISH_KEYWORDS.iter().any(|k| title_lower.contains(k)) {
            -1
        } else {
            0
        }
    }

    /// Mean contribution over `headlines`, in [-1, 1]. Zero when empty.
    pub fn score(&self, headlines: &[Headline]) -> f64 {
        if headlines.is_empty() {
            return 0.0;
        }

        let total: i32 = headlines.iter().map(|h| self.score_title(&h.title)).sum();
        total as f64 / headlines.len() as f64
    }
}

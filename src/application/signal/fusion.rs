use crate::domain::signal::Signal;

/// Weight applied to the sentiment score before it nudges the probability.
pub const SENTIMENT_WEIGHT: f64 = 0.1;
/// Largest absolute sentiment adjustment.
pub const MAX_SENTIMENT_ADJUSTMENT: f64 = 0.2;

pub const STRONG_BUY_ABOVE: f64 = 0.70;
pub const BUY_ABOVE: f64 = 0.55;
pub const STRONG_SELL_BELOW: f64 = 0.30;
pub const SELL_BELOW: f64 = 0.45;

/// Model output combined with the news adjustment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusedProbability {
    pub model_probability: f64,
    pub sentiment_score: f64,
    pub sentiment_adjustment: f64,
    pub final_probability: f64,
}

impl FusedProbability {
    pub fn signal(&self) -> Signal {
        classify(self.final_probability)
    }

    /// Final probability as a percentage.
    pub fn confidence(&self) -> f64 {
        self.final_probability * 100.0
    }
}

pub fn fuse(model_probability: f64, sentiment_score: f64) -> FusedProbability {
    let sentiment_adjustment = (sentiment_score * SENTIMENT_WEIGHT)
        .clamp(-MAX_SENTIMENT_ADJUSTMENT, MAX_SENTIMENT_ADJUSTMENT);
    let final_probability = (model_probability + sentiment_adjustment).clamp(0.0, 1.0);

    FusedProbability {
        model_probability,
        sentiment_score,
        sentiment_adjustment,
        final_probability,
    }
}

/// Maps a final probability to a signal; first matching band wins.
pub fn classify(final_probability: f64) -> Signal {
    if final_probability > STRONG_BUY_ABOVE {
        Signal::StrongBuy
    } else if final_probability > BUY_ABOVE {
        Signal::Buy
    } else if final_probability < STRONG_SELL_BELOW {
        Signal::StrongSell
    } else if final_probability < SELL_BELOW {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

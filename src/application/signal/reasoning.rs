use super::fusion::FusedProbability;
use crate::application::sentiment::SentimentReport;
use crate::domain::features::FeatureRow;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Technical commentary for the latest row, in fixed order:
/// RSI band, MACD vs signal, trend vs SMA200, band breakout (if any).
pub fn technical_commentary(row: &FeatureRow) -> Vec<String> {
    let mut reasons = Vec::with_capacity(4);

    if row.rsi < RSI_OVERSOLD {
        reasons.push(format!(
            "RSI is oversold ({:.1}), suggesting a potential bounce.",
            row.rsi
        ));
    } else if row.rsi > RSI_OVERBOUGHT {
        reasons.push(format!(
            "RSI is overbought ({:.1}), suggesting a potential pullback.",
            row.rsi
        ));
    } else {
        reasons.push(format!("RSI is neutral ({:.1}).", row.rsi));
    }

    if row.macd > row.macd_signal {
        reasons.push("MACD is above the signal line (Bullish).".to_string());
    } else {
        reasons.push("MACD is below the signal line (Bearish).".to_string());
    }

    if row.close > row.sma_200 {
        reasons.push("Price is above the 200-day SMA (Long-term Bullish).".to_string());
    } else {
        reasons.push("Price is below the 200-day SMA (Long-term Bearish).".to_string());
    }

    if row.close < row.bb_lower {
        reasons.push(
            "Price broke below Lower Bollinger Band (Potential Reversal/Oversold).".to_string(),
        );
    } else if row.close > row.bb_upper {
        reasons.push(
            "Price broke above Upper Bollinger Band (Strong Momentum/Overbought).".to_string(),
        );
    }

    reasons
}

pub fn confidence_line(fused: &FusedProbability) -> String {
    format!(
        "Model Confidence: {:.1}% (Technical: {:.1}%, News Adj: {:+.1}%)",
        fused.final_probability * 100.0,
        fused.model_probability * 100.0,
        fused.sentiment_adjustment * 100.0
    )
}

/// `None` when headlines exist but net out to zero.
pub fn sentiment_line(report: &SentimentReport) -> Option<String> {
    if report.score != 0.0 {
        let label = if report.score > 0.0 { "Bullish" } else { "Bearish" };
        Some(format!(
            "News Sentiment: {} (Score: {:.2})",
            label, report.score
        ))
    } else if report.headlines.is_empty() {
        Some("News: No recent news found.".to_string())
    } else {
        None
    }
}

/// Full human-readable justification for a signal.
pub fn explain(row: &FeatureRow, fused: &FusedProbability, report: &SentimentReport) -> String {
    let mut reason = technical_commentary(row).join(" ");
    reason.push_str("\n\n");
    reason.push_str(&confidence_line(fused));

    if let Some(line) = sentiment_line(report) {
        reason.push('\n');
        reason.push_str(&line);
    }

    reason
}

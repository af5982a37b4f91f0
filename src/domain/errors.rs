use thiserror::Error;

/// Errors raised by price-history and news adapters
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} request failed: {reason}")]
    Request {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to decode {provider} payload: {reason}")]
    Decode {
        provider: &'static str,
        reason: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a signal computation.
///
/// These never escape `SignalService::predict_signal`; they are rendered as
/// an `ERROR` result whose reason is the error message.
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("Symbol must not be empty")]
    InvalidSymbol,

    #[error("Price history unavailable for {symbol}: {source}")]
    PriceHistory {
        symbol: String,
        #[source]
        source: ProviderError,
    },

    #[error("Indicator computation failed: {0}")]
    Indicator(String),

    #[error("Model training failed: {0}")]
    Training(String),

    #[error("Model prediction failed: {0}")]
    Prediction(String),

    #[error("Training worker aborted: {0}")]
    Worker(String),
}

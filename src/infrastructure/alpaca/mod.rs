pub mod common;
pub mod history;
pub mod news;

pub use common::{AlpacaBar, AlpacaCredentials, DEFAULT_ALPACA_DATA_URL};
pub use history::AlpacaPriceHistoryProvider;
pub use news::AlpacaNewsProvider;

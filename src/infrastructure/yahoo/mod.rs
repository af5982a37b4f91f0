pub mod chart;

pub use chart::{YahooPriceHistoryProvider, parse_chart};

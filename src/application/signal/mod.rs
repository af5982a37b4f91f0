pub mod cache;
pub mod fusion;
pub mod reasoning;
pub mod service;

pub use cache::SignalCache;
pub use fusion::{FusedProbability, classify, fuse};
pub use service::{SignalService, SignalServiceBuilder, SignalSettings, normalize_symbol};

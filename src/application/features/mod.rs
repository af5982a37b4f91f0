pub mod indicator_engine;
pub mod labeling;

pub use indicator_engine::{IndicatorEngine, IndicatorSettings, compute_features};
pub use labeling::{LABEL_HORIZON, LabeledSeries, label_rows};

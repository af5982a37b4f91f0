pub mod predictor;
pub mod random_forest;

pub use predictor::SignalModel;
pub use random_forest::{ForestParameters, RandomForestSignalModel};

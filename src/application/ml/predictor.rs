use crate::domain::errors::SignalError;
use crate::domain::features::{FeatureRow, LabeledRow};

/// Interface for rise-probability models
pub trait SignalModel: Send + Sync {
    /// Train a fresh model on `training` and score `latest`.
    ///
    /// Returns the probability (0.0 to 1.0) that the close rises over the
    /// label horizon. No state may survive between calls.
    fn fit_predict(&self, training: &[LabeledRow], latest: &FeatureRow)
    -> Result<f64, SignalError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

use super::predictor::SignalModel;
use crate::domain::errors::SignalError;
use crate::domain::features::{FeatureRow, LabeledRow};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

/// Random forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForestParameters {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParameters {
    fn default() -> Self {
        Self {
            n_trees: 30,
            max_depth: 10,
            min_samples_split: 10,
            seed: 42,
        }
    }
}

/// Random forest fitted on the 0/1 rise label.
///
/// Leaves hold the share of rising samples they saw, so the forest average
/// is an estimate of the class-1 probability. A new forest is fitted on
/// every call; nothing is kept between requests.
pub struct RandomForestSignalModel {
    params: ForestParameters,
}

impl RandomForestSignalModel {
    pub fn new(params: ForestParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParameters {
        &self.params
    }
}

impl Default for RandomForestSignalModel {
    fn default() -> Self {
        Self::new(ForestParameters::default())
    }
}

impl SignalModel for RandomForestSignalModel {
    fn fit_predict(
        &self,
        training: &[LabeledRow],
        latest: &FeatureRow,
    ) -> Result<f64, SignalError> {
        if training.is_empty() {
            return Err(SignalError::Training("no labeled rows to train on".to_string()));
        }

        let x: Vec<Vec<f64>> = training.iter().map(|r| r.row.model_features()).collect();
        let y: Vec<f64> = training.iter().map(LabeledRow::target_value).collect();

        let x_matrix = DenseMatrix::from_2d_vec(&x)
            .map_err(|e| SignalError::Training(format!("Matrix creation failed: {}", e)))?;

        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.params.n_trees)
            .with_max_depth(self.params.max_depth)
            .with_min_samples_split(self.params.min_samples_split)
            .with_seed(self.params.seed);

        debug!(
            "RandomForestSignalModel: fitting {} trees on {} rows (seed {})",
            self.params.n_trees,
            x.len(),
            self.params.seed
        );

        let model: RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>> =
            RandomForestRegressor::fit(&x_matrix, &y, params)
                .map_err(|e| SignalError::Training(e.to_string()))?;

        let input_matrix = DenseMatrix::from_2d_vec(&vec![latest.model_features()])
            .map_err(|e| SignalError::Prediction(format!("Matrix creation failed: {}", e)))?;

        let predictions = model
            .predict(&input_matrix)
            .map_err(|e| SignalError::Prediction(e.to_string()))?;

        let probability = predictions
            .first()
            .copied()
            .ok_or_else(|| SignalError::Prediction("No prediction returned".to_string()))?;

        if !probability.is_finite() {
            return Err(SignalError::Prediction(format!(
                "model returned non-finite probability {}",
                probability
            )));
        }

        Ok(probability.clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        "SmartCore Random Forest"
    }
}

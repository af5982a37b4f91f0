//! Random forest hyperparameters from environment variables.

use super::{Lookup, parse_or};
use crate::application::ml::ForestParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelEnvConfig {
    pub n_trees: usize,
    pub max_depth: u16,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ModelEnvConfig {
    fn default() -> Self {
        let params = ForestParameters::default();
        Self {
            n_trees: params.n_trees,
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            seed: params.seed,
        }
    }
}

impl ModelEnvConfig {
    pub fn from_lookup(lookup: &Lookup) -> Self {
        let defaults = Self::default();
        Self {
            n_trees: parse_or(lookup, "MODEL_N_TREES", defaults.n_trees).max(1),
            max_depth: parse_or(lookup, "MODEL_MAX_DEPTH", defaults.max_depth).max(1),
            min_samples_split: parse_or(
                lookup,
                "MODEL_MIN_SAMPLES_SPLIT",
                defaults.min_samples_split,
            )
            .max(2),
            seed: parse_or(lookup, "MODEL_SEED", defaults.seed),
        }
    }

    pub fn to_forest_parameters(&self) -> ForestParameters {
        ForestParameters {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::lookup_from;

    #[test]
    fn test_model_config_defaults() {
        let config = ModelEnvConfig::from_lookup(&lookup_from(&[]));
        assert_eq!(config.to_forest_parameters(), ForestParameters::default());
    }

    #[test]
    fn test_model_config_overrides_and_fallbacks() {
        let config = ModelEnvConfig::from_lookup(&lookup_from(&[
            ("MODEL_N_TREES", "100"),
            ("MODEL_MAX_DEPTH", "deep"),
            ("MODEL_SEED", "7"),
        ]));
        assert_eq!(config.n_trees, 100);
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.seed, 7);
    }
}

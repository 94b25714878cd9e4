//! Gradient boosting over CART trees
//!
//! MSE boosting on the {0, SCALE} encoded churn target. Training-time
//! prediction updates use the exact integer formula the inference path uses,
//! so a trained model reproduces its own training scores bit for bit.

use std::collections::BTreeSet;

use churnlab_core::{ChurnError, EncodedDataset, Model, Result, Tree, SCALE};

use crate::cart::{CartBuilder, TreeParams};

/// Hessian of the squared-error loss per sample, in quantized units.
pub(crate) const HESSIAN_UNIT: i64 = 1000;

/// Boosting configuration. Defaults are the library-default hyperparameters;
/// no tuning is part of this system's contract.
#[derive(Clone, Debug, serde::Serialize)]
pub struct GbdtConfig {
    pub num_trees: usize,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Learning rate in micro units (100_000 = 0.1)
    pub learning_rate: i64,
    /// Quantization step for candidate thresholds
    pub quant_step: i64,
}

impl Default for GbdtConfig {
    fn default() -> Self {
        Self {
            num_trees: 64,
            max_depth: 6,
            min_samples_leaf: 32,
            learning_rate: 100_000,
            quant_step: 1000,
        }
    }
}

/// Deterministic GBDT trainer. Training and artifact persistence are
/// separate operations; see `ModelStore` for the latter.
pub struct GbdtTrainer {
    config: GbdtConfig,
}

impl GbdtTrainer {
    pub fn new(config: GbdtConfig) -> Self {
        Self { config }
    }

    /// Fit a classifier on the training partition.
    pub fn train(&self, data: &EncodedDataset) -> Result<Model> {
        if data.is_empty() {
            return Err(ChurnError::Training("training partition is empty".into()));
        }

        let classes: BTreeSet<i64> = data.targets.iter().copied().collect();
        if classes.len() < 2 {
            return Err(ChurnError::Training(format!(
                "training targets contain {} distinct class(es), need at least 2",
                classes.len()
            )));
        }

        let n = data.len();
        let bias = self.mean_target(&data.targets);
        let mut predictions = vec![bias; n];
        let mut trees = Vec::with_capacity(self.config.num_trees);

        for round in 0..self.config.num_trees {
            // MSE gradients: prediction - target; constant hessian.
            let gradients: Vec<i64> = predictions
                .iter()
                .zip(&data.targets)
                .map(|(&p, &t)| p.saturating_sub(t))
                .collect();
            let hessians = vec![HESSIAN_UNIT; n];

            let params = TreeParams {
                max_depth: self.config.max_depth,
                min_samples_leaf: self.config.min_samples_leaf,
                quant_step: self.config.quant_step,
            };
            let tree = CartBuilder::new(&data.features, &gradients, &hessians, params)
                .build(self.config.learning_rate);

            self.apply_tree(&tree, data, &mut predictions);
            tracing::debug!(round = round + 1, total = self.config.num_trees, "boosting round complete");
            trees.push(tree);
        }

        let model = Model {
            version: 1,
            scale: SCALE,
            trees,
            bias,
            feature_count: data.feature_count,
            dataset_hash: data.content_hash()?,
        };
        model.validate()?;
        Ok(model)
    }

    fn mean_target(&self, targets: &[i64]) -> i64 {
        let sum: i128 = targets.iter().map(|&t| t as i128).sum();
        (sum / targets.len() as i128) as i64
    }

    /// Advance training predictions with the same weighted-leaf formula
    /// `Model::score` uses.
    fn apply_tree(&self, tree: &Tree, data: &EncodedDataset, predictions: &mut [i64]) {
        for (pred, row) in predictions.iter_mut().zip(&data.features) {
            let leaf = tree.evaluate(row);
            let contribution = (leaf as i128 * tree.weight as i128 / SCALE as i128) as i64;
            *pred = pred.saturating_add(contribution);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class_data() -> EncodedDataset {
        EncodedDataset {
            features: vec![
                vec![0, 5 * SCALE],
                vec![0, 8 * SCALE],
                vec![SCALE, 60 * SCALE],
                vec![SCALE, 70 * SCALE],
            ],
            targets: vec![0, 0, SCALE, SCALE],
            feature_count: 2,
        }
    }

    fn small_config() -> GbdtConfig {
        GbdtConfig {
            num_trees: 16,
            max_depth: 2,
            min_samples_leaf: 1,
            ..GbdtConfig::default()
        }
    }

    #[test]
    fn test_train_separates_classes() {
        let data = two_class_data();
        let model = GbdtTrainer::new(small_config()).train(&data).unwrap();

        assert_eq!(model.num_trees(), 16);
        assert_eq!(model.feature_count, 2);
        assert_eq!(model.predict_class(&data.features[0]), 0);
        assert_eq!(model.predict_class(&data.features[3]), 1);
    }

    #[test]
    fn test_bias_is_mean_target() {
        let data = two_class_data();
        let model = GbdtTrainer::new(small_config()).train(&data).unwrap();
        assert_eq!(model.bias, SCALE / 2);
    }

    #[test]
    fn test_training_is_deterministic() {
        let data = two_class_data();
        let a = GbdtTrainer::new(small_config()).train(&data).unwrap();
        let b = GbdtTrainer::new(small_config()).train(&data).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash_hex().unwrap(), b.hash_hex().unwrap());
    }

    #[test]
    fn test_single_class_rejected() {
        let data = EncodedDataset {
            features: vec![vec![0], vec![SCALE]],
            targets: vec![0, 0],
            feature_count: 1,
        };
        let err = GbdtTrainer::new(small_config()).train(&data).unwrap_err();
        assert!(matches!(err, ChurnError::Training(_)));
    }

    #[test]
    fn test_empty_partition_rejected() {
        let data = EncodedDataset {
            features: vec![],
            targets: vec![],
            feature_count: 0,
        };
        let err = GbdtTrainer::new(small_config()).train(&data).unwrap_err();
        assert!(matches!(err, ChurnError::Training(_)));
    }

    #[test]
    fn test_model_records_dataset_hash() {
        let data = two_class_data();
        let model = GbdtTrainer::new(small_config()).train(&data).unwrap();
        assert_eq!(model.dataset_hash, data.content_hash().unwrap());
    }
}

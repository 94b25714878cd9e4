//! GBDT model with deterministic inference
//!
//! Integer-only ensemble scoring plus the binary decision rule used for
//! churn classification. Serialization goes through canonical JSON so the
//! blake3 model hash is reproducible across platforms.

use serde::{Deserialize, Serialize};

use super::tree::Tree;
use crate::errors::{ChurnError, Result};
use crate::serde_canon::{hash_canonical_hex, to_canonical_json};

/// Fixed-point scale factor: 1e6 (micro precision).
pub const SCALE: i64 = 1_000_000;

/// A trained churn classifier.
///
/// All values are fixed-point integers scaled by `scale`. The raw ensemble
/// output is a regression score over the {0, SCALE} encoded target; scores at
/// or above `scale / 2` classify as the positive class.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    /// Model format version (always 1 for now)
    pub version: i32,

    /// Fixed-point scale factor
    pub scale: i64,

    /// Boosted regression trees
    pub trees: Vec<Tree>,

    /// Bias term: mean encoded target of the training partition
    pub bias: i64,

    /// Width of the feature vectors this model was trained on
    pub feature_count: usize,

    /// Content hash of the training partition, for artifact/data matching
    pub dataset_hash: String,
}

impl Model {
    /// Structural validation; runs on every load.
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ChurnError::InvalidModel(format!(
                "unsupported model version {}",
                self.version
            )));
        }
        if self.scale <= 0 {
            return Err(ChurnError::InvalidModel(format!(
                "invalid scale {}",
                self.scale
            )));
        }
        if self.feature_count == 0 {
            return Err(ChurnError::InvalidModel("feature_count is zero".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ChurnError::InvalidModel(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    /// Deterministic raw score for one feature vector:
    /// `bias + sum(leaf * tree_weight / scale)`.
    pub fn score(&self, features: &[i64]) -> i64 {
        let mut sum = self.bias;
        for tree in &self.trees {
            let leaf = tree.evaluate(features);
            let contribution = (leaf as i128 * tree.weight as i128 / self.scale as i128) as i64;
            sum = sum.saturating_add(contribution);
        }
        sum
    }

    /// Binary class code for one feature vector: 1 when the score reaches
    /// the midpoint of the encoded target range, else 0.
    pub fn predict_class(&self, features: &[i64]) -> u32 {
        u32::from(self.score(features) >= self.scale / 2)
    }

    /// Serialize to canonical JSON (sorted keys, no whitespace).
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(to_canonical_json(self)?)
    }

    /// Blake3 hash of the canonical JSON representation, hex-encoded.
    pub fn hash_hex(&self) -> Result<String> {
        Ok(hash_canonical_hex(self)?)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

//! Evaluation metrics on the held-out partition
//!
//! Accuracy is an exact-match count; AUC is the tie-aware pairwise ranking
//! probability over raw scores. Both are computed in integers and exposed as
//! floats only for display.

use churnlab_core::{ChurnError, EncodedDataset, Model, Result, SCALE};

/// Classification quality on a held-out partition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub correct: usize,
    pub total: usize,
    /// AUC in micro units (500_000 = 0.5)
    pub auc_micro: i64,
}

impl Metrics {
    /// Accuracy as a percentage.
    pub fn accuracy_pct(&self) -> f64 {
        100.0 * self.correct as f64 / self.total as f64
    }

    /// Raw AUC score in [0, 1].
    pub fn auc(&self) -> f64 {
        self.auc_micro as f64 / SCALE as f64
    }
}

/// Score the held-out partition and compute accuracy and AUC.
pub fn evaluate(model: &Model, test: &EncodedDataset) -> Result<Metrics> {
    if test.is_empty() {
        return Err(ChurnError::Training("held-out partition is empty".into()));
    }

    let mut correct = 0usize;
    let mut positives = Vec::new();
    let mut negatives = Vec::new();

    for (row, &target) in test.features.iter().zip(&test.targets) {
        let score = model.score(row);
        let actual = target >= SCALE / 2;
        let predicted = score >= SCALE / 2;
        if predicted == actual {
            correct += 1;
        }
        if actual {
            positives.push(score);
        } else {
            negatives.push(score);
        }
    }

    Ok(Metrics {
        correct,
        total: test.len(),
        auc_micro: pairwise_auc_micro(&positives, &negatives),
    })
}

/// Probability that a random positive outranks a random negative, with half
/// credit for ties. Defined as 0.5 when either class is absent.
fn pairwise_auc_micro(positives: &[i64], negatives: &[i64]) -> i64 {
    if positives.is_empty() || negatives.is_empty() {
        return SCALE / 2;
    }

    // Units of one half: a win counts 2, a tie counts 1.
    let mut half_units: u128 = 0;
    for &p in positives {
        for &n in negatives {
            half_units += match p.cmp(&n) {
                std::cmp::Ordering::Greater => 2,
                std::cmp::Ordering::Equal => 1,
                std::cmp::Ordering::Less => 0,
            };
        }
    }

    let pairs = positives.len() as u128 * negatives.len() as u128;
    (half_units * SCALE as u128 / (2 * pairs)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use churnlab_core::{Node, Tree};

    /// Model that echoes its single feature as the score.
    fn identity_model() -> Model {
        // A stump sending feature 0 below/above SCALE/2 to matching leaves
        // would lose score resolution, so use leaves equal to the feature
        // split regions' representative scores.
        Model {
            version: 1,
            scale: SCALE,
            trees: vec![Tree::new(
                vec![
                    Node::internal(0, 0, SCALE / 2 - 1, 1, 2),
                    Node::leaf(1, 0),
                    Node::leaf(2, SCALE),
                ],
                SCALE,
            )],
            bias: 0,
            feature_count: 1,
            dataset_hash: String::new(),
        }
    }

    #[test]
    fn test_perfect_classifier() {
        let test = EncodedDataset {
            features: vec![vec![0], vec![0], vec![SCALE], vec![SCALE]],
            targets: vec![0, 0, SCALE, SCALE],
            feature_count: 1,
        };
        let metrics = evaluate(&identity_model(), &test).unwrap();

        assert_eq!(metrics.correct, 4);
        assert_eq!(metrics.accuracy_pct(), 100.0);
        assert_eq!(metrics.auc_micro, SCALE);
    }

    #[test]
    fn test_inverted_classifier() {
        let test = EncodedDataset {
            features: vec![vec![0], vec![SCALE]],
            targets: vec![SCALE, 0],
            feature_count: 1,
        };
        let metrics = evaluate(&identity_model(), &test).unwrap();

        assert_eq!(metrics.correct, 0);
        assert_eq!(metrics.auc_micro, 0);
    }

    #[test]
    fn test_constant_scores_give_half_auc() {
        let constant = Model {
            version: 1,
            scale: SCALE,
            trees: vec![Tree::new(vec![Node::leaf(0, 0)], SCALE)],
            bias: SCALE / 2,
            feature_count: 1,
            dataset_hash: String::new(),
        };
        let test = EncodedDataset {
            features: vec![vec![0], vec![SCALE]],
            targets: vec![0, SCALE],
            feature_count: 1,
        };
        let metrics = evaluate(&constant, &test).unwrap();

        // Ties everywhere: AUC 0.5; constant score SCALE/2 predicts class 1.
        assert_eq!(metrics.auc_micro, SCALE / 2);
        assert_eq!(metrics.correct, 1);
    }

    #[test]
    fn test_single_class_partition_auc_defined() {
        let test = EncodedDataset {
            features: vec![vec![0], vec![0]],
            targets: vec![0, 0],
            feature_count: 1,
        };
        let metrics = evaluate(&identity_model(), &test).unwrap();
        assert_eq!(metrics.auc_micro, SCALE / 2);
        assert_eq!(metrics.correct, 2);
    }

    #[test]
    fn test_empty_partition_rejected() {
        let test = EncodedDataset {
            features: vec![],
            targets: vec![],
            feature_count: 1,
        };
        assert!(matches!(
            evaluate(&identity_model(), &test),
            Err(ChurnError::Training(_))
        ));
    }
}

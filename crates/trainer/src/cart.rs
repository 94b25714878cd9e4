//! Exact-greedy CART tree construction
//!
//! Builds one regression tree per boosting round from gradients and hessians,
//! fixed-point only. Candidate thresholds are quantized, and equal-gain
//! splits are resolved by a total order so the tree shape is deterministic.

use std::collections::BTreeMap;

use churnlab_core::{Node, Tree};

use crate::deterministic::SplitTieBreaker;
use crate::trainer::HESSIAN_UNIT;

/// Per-tree growth limits.
#[derive(Clone, Debug)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub quant_step: i64,
}

#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: i64,
    gain: i64,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: i64, gain: i64, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold, node_id),
        }
    }
}

/// Builds a single regression tree over borrowed training state.
pub struct CartBuilder<'a> {
    params: TreeParams,
    features: &'a [Vec<i64>],
    gradients: &'a [i64],
    hessians: &'a [i64],
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<i64>],
        gradients: &'a [i64],
        hessians: &'a [i64],
        params: TreeParams,
    ) -> Self {
        assert_eq!(features.len(), gradients.len());
        assert_eq!(features.len(), hessians.len());

        let feature_count = features.first().map_or(0, |row| row.len());
        Self {
            params,
            features,
            gradients,
            hessians,
            feature_count,
        }
    }

    /// Build the tree; the caller attaches the ensemble weight.
    pub fn build(&self, weight: i64) -> Tree {
        let mut nodes = Vec::new();
        let indices: Vec<usize> = (0..self.features.len()).collect();
        self.build_node(&indices, 0, &mut nodes, 0);
        Tree::new(nodes, weight)
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>, node_id: usize) -> i32 {
        let current = nodes.len() as i32;
        let leaf_value = self.leaf_value(indices);

        if depth >= self.params.max_depth || indices.len() < 2 * self.params.min_samples_leaf {
            nodes.push(Node::leaf(current, leaf_value));
            return current;
        }

        let Some(split) = self.find_best_split(indices, node_id) else {
            nodes.push(Node::leaf(current, leaf_value));
            return current;
        };

        let (left_rows, right_rows) = self.partition(indices, split.feature_idx, split.threshold);
        if left_rows.len() < self.params.min_samples_leaf
            || right_rows.len() < self.params.min_samples_leaf
        {
            nodes.push(Node::leaf(current, leaf_value));
            return current;
        }

        // Children are appended after the split node; patch the links once
        // both subtrees exist.
        nodes.push(Node::internal(
            current,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));
        let left = self.build_node(&left_rows, depth + 1, nodes, node_id * 2 + 1);
        let right = self.build_node(&right_rows, depth + 1, nodes, node_id * 2 + 2);
        nodes[current as usize].left = left;
        nodes[current as usize].right = right;

        current
    }

    fn find_best_split(&self, indices: &[usize], node_id: usize) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;

        for feature_idx in 0..self.feature_count {
            for threshold in self.quantized_thresholds(indices, feature_idx) {
                let (left, right) = self.partition(indices, feature_idx, threshold);
                if left.len() < self.params.min_samples_leaf
                    || right.len() < self.params.min_samples_leaf
                {
                    continue;
                }

                let gain = self.split_gain(&left, &right, indices);
                let candidate = SplitCandidate::new(feature_idx, threshold, gain, node_id);

                best = match best {
                    None => Some(candidate),
                    Some(current) => {
                        if gain > current.gain
                            || (gain == current.gain && candidate.tie_breaker < current.tie_breaker)
                        {
                            Some(candidate)
                        } else {
                            Some(current)
                        }
                    }
                };
            }
        }

        best
    }

    /// Distinct quantized values of one feature across the node's rows.
    fn quantized_thresholds(&self, indices: &[usize], feature_idx: usize) -> Vec<i64> {
        let mut values = BTreeMap::new();
        for &idx in indices {
            let val = self.features[idx][feature_idx];
            let quantized = (val / self.params.quant_step) * self.params.quant_step;
            values.insert(quantized, ());
        }
        values.into_keys().collect()
    }

    fn partition(&self, indices: &[usize], feature_idx: usize, threshold: i64) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &idx in indices {
            if self.features[idx][feature_idx] <= threshold {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }
        (left, right)
    }

    /// Gain = G_left^2/H_left + G_right^2/H_right - G_parent^2/H_parent,
    /// in i128 to avoid overflow.
    fn split_gain(&self, left: &[usize], right: &[usize], parent: &[usize]) -> i64 {
        let term = |rows: &[usize]| -> i64 {
            let (g, h) = self.sums(rows);
            if h > 0 {
                ((g as i128 * g as i128) / h as i128) as i64
            } else {
                0
            }
        };

        term(left)
            .saturating_add(term(right))
            .saturating_sub(term(parent))
    }

    fn sums(&self, indices: &[usize]) -> (i64, i64) {
        let mut sum_g = 0i64;
        let mut sum_h = 0i64;
        for &idx in indices {
            sum_g = sum_g.saturating_add(self.gradients[idx]);
            sum_h = sum_h.saturating_add(self.hessians[idx]);
        }
        (sum_g, sum_h)
    }

    /// Optimal leaf value -G/H, rescaled from hessian units.
    fn leaf_value(&self, indices: &[usize]) -> i64 {
        let (sum_g, sum_h) = self.sums(indices);
        if sum_h == 0 {
            return 0;
        }
        -((sum_g as i128 * HESSIAN_UNIT as i128) / sum_h as i128) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 2,
            min_samples_leaf: 1,
            quant_step: 1000,
        }
    }

    #[test]
    fn test_splits_separable_gradients() {
        let features = vec![
            vec![100_000, 200_000],
            vec![200_000, 300_000],
            vec![300_000, 400_000],
            vec![400_000, 500_000],
        ];
        let gradients = vec![-1000, -500, 500, 1000];
        let hessians = vec![HESSIAN_UNIT; 4];

        let builder = CartBuilder::new(&features, &gradients, &hessians, params());
        let tree = builder.build(100_000);

        assert!(tree.validate().is_ok());
        assert!(tree.nodes.len() > 1, "tree should have split at least once");
        // Low-feature rows carry negative gradients, so their leaf is positive.
        assert!(tree.evaluate(&features[0]) > tree.evaluate(&features[3]));
    }

    #[test]
    fn test_single_row_becomes_leaf() {
        let features = vec![vec![100_000]];
        let gradients = vec![-1000];
        let hessians = vec![HESSIAN_UNIT];

        let builder = CartBuilder::new(&features, &gradients, &hessians, params());
        let tree = builder.build(100_000);

        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.evaluate(&features[0]), 1000); // -(-1000)/1 sample
    }

    #[test]
    fn test_deterministic_shape() {
        let features = vec![
            vec![1_000_000, 0],
            vec![0, 1_000_000],
            vec![1_000_000, 1_000_000],
            vec![0, 0],
        ];
        let gradients = vec![500_000, -500_000, 500_000, -500_000];
        let hessians = vec![HESSIAN_UNIT; 4];

        let builder = CartBuilder::new(&features, &gradients, &hessians, params());
        let a = builder.build(100_000);
        let b = builder.build(100_000);
        assert_eq!(a, b);
    }
}

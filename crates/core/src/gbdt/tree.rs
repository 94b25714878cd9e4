//! Decision tree structures for GBDT inference
//!
//! Integer-only tree nodes and traversal. All thresholds and leaf values are
//! fixed-point integers at micro precision.

use serde::{Deserialize, Serialize};

/// A decision tree node, internal or leaf.
///
/// Internal nodes carry `feature_idx >= 0` and child indices; leaf nodes use
/// `feature_idx == -1` and carry the prediction in `leaf`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Node {
    /// Node ID (equals its index in the tree's node vector)
    pub id: i32,

    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Split threshold (fixed-point integer)
    pub threshold: i64,

    /// Leaf value (Some for leaf nodes only)
    pub leaf: Option<i64>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, value: i64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0,
            leaf: Some(value),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single regression tree; node 0 is the root. The tree weight carries the
/// ensemble learning rate in micro units, applied at scoring time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tree {
    pub nodes: Vec<Node>,
    pub weight: i64,
}

impl Tree {
    pub fn new(nodes: Vec<Node>, weight: i64) -> Self {
        Self { nodes, weight }
    }

    /// Traverse the tree on a feature vector; `<=` goes left. Malformed
    /// references evaluate to 0 rather than panicking (validation catches
    /// them up front on load).
    pub fn evaluate(&self, features: &[i64]) -> i64 {
        let mut idx = 0usize;

        loop {
            let Some(node) = self.nodes.get(idx) else {
                return 0;
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or(0);
            }

            let Some(&value) = features.get(node.feature_idx as usize) else {
                return 0;
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            if next < 0 {
                return 0;
            }
            idx = next as usize;
        }
    }

    /// Structural validation: child indices in range, internal nodes have a
    /// feature, leaves have a value.
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.leaf.is_none() {
                    return Err(format!("leaf node {i} has no value"));
                }
                continue;
            }

            if node.left < 0 || node.left as usize >= self.nodes.len() {
                return Err(format!("node {i} has invalid left child {}", node.left));
            }
            if node.right < 0 || node.right as usize >= self.nodes.len() {
                return Err(format!("node {i} has invalid right child {}", node.right));
            }
            if node.feature_idx < 0 {
                return Err(format!(
                    "internal node {i} has invalid feature index {}",
                    node.feature_idx
                ));
            }
        }

        Ok(())
    }
}

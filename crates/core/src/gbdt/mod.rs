//! Integer-only GBDT classifier
//!
//! Deterministic inference with zero floating-point operations: same input,
//! same output, on every platform. Models serialize to canonical JSON
//! (sorted keys) so the blake3 model hash is reproducible.
//!
//! The ensemble is a sum of regression trees over the {0, SCALE} encoded
//! churn target; `Model::predict_class` applies the midpoint decision rule.

pub mod model;
pub mod tree;

pub use model::{Model, SCALE};
pub use tree::{Node, Tree};

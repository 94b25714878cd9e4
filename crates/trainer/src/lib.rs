//! Deterministic GBDT trainer for the churn classifier
//!
//! Exact-greedy CART boosting in fixed-point arithmetic: identical data and
//! configuration produce a byte-identical model on every platform and run.

pub mod cart;
pub mod deterministic;
pub mod metrics;
pub mod split;
pub mod trainer;

pub use deterministic::{xxhash64_i64, SplitTieBreaker};
pub use metrics::{evaluate, Metrics};
pub use split::{train_test_split, TrainTestSplit, DEFAULT_SEED};
pub use trainer::{GbdtConfig, GbdtTrainer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

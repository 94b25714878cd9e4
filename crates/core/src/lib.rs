//! Core types for the churn classification demo
//!
//! Provides the data model and deterministic building blocks shared by the
//! offline trainer and the web UI:
//!
//! - `dataset`: CSV table loading and typed customer records
//! - `encoding`: the label-encoding table (one source of truth for batch
//!   encoding, manual input, and target decoding)
//! - `gbdt`: integer-only Gradient Boosted Decision Tree model and inference
//! - `store`: durable save/load of a trained model artifact
//! - `serde_canon`: canonical JSON serialization for hashing
//! - `errors`: the crate-wide error taxonomy

pub mod dataset;
pub mod encoding;
pub mod errors;
pub mod gbdt;
pub mod serde_canon;
pub mod store;

pub use dataset::{DataTable, Dataset, Record};
pub use encoding::{encode_dataset, CustomerInput, EncodedDataset, EncodingTable};
pub use errors::{ChurnError, Result};
pub use gbdt::{Model, Node, Tree, SCALE};
pub use store::ModelStore;

/// Crate version string for health reporting and artifacts
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

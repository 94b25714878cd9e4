//! Churn Lab offline trainer CLI
//!
//! Loads the customer CSV, fits the encoding table, trains a deterministic
//! GBDT classifier, reports held-out metrics, and saves the model artifact.

use anyhow::{Context, Result};
use churnlab_trainer::{evaluate, train_test_split, GbdtConfig, GbdtTrainer, DEFAULT_SEED};
use churnlab_core::{encode_dataset, DataTable, Dataset, EncodingTable, ModelStore};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "churnlab-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic GBDT trainer for customer churn", long_about = None)]
struct Args {
    /// Input customer CSV (header row with the churn schema columns)
    #[arg(short, long)]
    input: PathBuf,

    /// Output model artifact path
    #[arg(short, long, default_value = "models/churn.json")]
    output: PathBuf,

    /// Number of boosting trees
    #[arg(long, default_value = "64")]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "6")]
    max_depth: usize,

    /// Minimum samples per leaf
    #[arg(long, default_value = "32")]
    min_samples_leaf: usize,

    /// Learning rate (micro units, 100000 = 0.1)
    #[arg(long, default_value = "100000")]
    learning_rate: i64,

    /// Quantization step for split thresholds
    #[arg(long, default_value = "1000")]
    quant_step: i64,

    /// Seed for the deterministic train/test shuffle
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: i64,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Churn Lab trainer v{}", env!("CARGO_PKG_VERSION"));

    info!("Loading dataset from: {}", args.input.display());
    let table = DataTable::from_csv(&args.input).context("Failed to load CSV")?;
    let (rows, cols) = table.shape();
    info!("Loaded table with {rows} rows, {cols} columns");

    let dataset = Dataset::from_table(&table).context("Failed to extract schema columns")?;
    let encoder = EncodingTable::fit(&dataset).context("Failed to fit encoding table")?;
    let encoded = encode_dataset(&dataset, &encoder).context("Failed to encode dataset")?;

    let split = train_test_split(&encoded, args.seed);
    info!(
        "Split with seed {}: {} train rows, {} test rows",
        args.seed,
        split.train.len(),
        split.test.len()
    );

    let config = GbdtConfig {
        num_trees: args.trees,
        max_depth: args.max_depth,
        min_samples_leaf: args.min_samples_leaf,
        learning_rate: args.learning_rate,
        quant_step: args.quant_step,
    };
    info!(
        "Training configuration: trees={} max_depth={} min_samples_leaf={} learning_rate={} quant_step={}",
        config.num_trees, config.max_depth, config.min_samples_leaf, config.learning_rate, config.quant_step
    );

    let model = GbdtTrainer::new(config).train(&split.train)?;
    info!(
        "Training complete: {} trees, bias {}, model hash {}",
        model.num_trees(),
        model.bias,
        model.hash_hex()?
    );

    let metrics = evaluate(&model, &split.test)?;
    info!(
        "Held-out metrics: accuracy {:.2}% ({}/{}), AUC {}",
        metrics.accuracy_pct(),
        metrics.correct,
        metrics.total,
        metrics.auc()
    );

    let store = ModelStore::new(&args.output);
    store.save(&model).context("Failed to save model artifact")?;
    info!("Model saved to: {}", args.output.display());

    Ok(())
}

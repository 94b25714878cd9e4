//! Pipeline orchestration for the web UI
//!
//! One explicit function runs the whole flow per interaction: load CSV ->
//! fit encoding -> split -> train -> evaluate -> persist artifact. The
//! freshly trained model is the single source of truth for both the metrics
//! panel and manual predictions; the persisted artifact exists for reuse
//! across restarts and only warms the cache when it still matches the data.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use churnlab_core::serde_canon::to_canonical_json;
use churnlab_core::{
    encode_dataset, CustomerInput, DataTable, Dataset, EncodingTable, Model, ModelStore, Result,
};
use churnlab_trainer::{evaluate, train_test_split, GbdtConfig, GbdtTrainer, Metrics};

use crate::cache::{MemoCache, MemoKey};

/// Everything the pipeline needs to run, fixed at startup.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub dataset_path: PathBuf,
    pub artifact_path: PathBuf,
    pub trainer: GbdtConfig,
    pub split_seed: i64,
}

/// The result of one full pipeline run, shared across interactions via the
/// memo cache.
pub struct PipelineOutput {
    pub table: DataTable,
    pub encoder: EncodingTable,
    pub model: Model,
    pub metrics: Metrics,
}

fn memo_key(csv: &str, config: &PipelineConfig) -> Result<MemoKey> {
    let trainer_json = to_canonical_json(&config.trainer)?;
    Ok(MemoKey::compute(&[
        csv.as_bytes(),
        trainer_json.as_bytes(),
        &config.split_seed.to_le_bytes(),
    ]))
}

/// Run the pipeline, reusing the memoized output when the CSV bytes and
/// configuration are unchanged. On a fresh run the trained model is saved
/// to the artifact store before returning.
pub fn run_pipeline(
    config: &PipelineConfig,
    cache: &MemoCache<PipelineOutput>,
) -> Result<Arc<PipelineOutput>> {
    let csv = fs::read_to_string(&config.dataset_path)?;
    let key = memo_key(&csv, config)?;

    if let Some(hit) = cache.get(&key) {
        tracing::debug!("pipeline inputs unchanged, reusing memoized output");
        return Ok(hit);
    }

    let table = DataTable::parse(&csv)?;
    let dataset = Dataset::from_table(&table)?;
    let encoder = EncodingTable::fit(&dataset)?;
    let encoded = encode_dataset(&dataset, &encoder)?;
    let split = train_test_split(&encoded, config.split_seed);

    tracing::info!(
        train_rows = split.train.len(),
        test_rows = split.test.len(),
        "training churn classifier"
    );
    let model = GbdtTrainer::new(config.trainer.clone()).train(&split.train)?;
    let metrics = evaluate(&model, &split.test)?;

    ModelStore::new(&config.artifact_path).save(&model)?;

    let output = Arc::new(PipelineOutput {
        table,
        encoder,
        model,
        metrics,
    });
    cache.put(key, Arc::clone(&output));
    Ok(output)
}

/// Try to skip the first training run by reloading the persisted artifact.
/// The artifact is only trusted when its recorded dataset hash matches the
/// training partition derived from the current CSV; hyperparameter changes
/// still force a retrain because they change the memo key on first request.
pub fn warm_from_artifact(
    config: &PipelineConfig,
    cache: &MemoCache<PipelineOutput>,
) -> Result<bool> {
    let store = ModelStore::new(&config.artifact_path);
    if !store.exists() {
        return Ok(false);
    }
    let model = store.load()?;

    let csv = fs::read_to_string(&config.dataset_path)?;
    let table = DataTable::parse(&csv)?;
    let dataset = Dataset::from_table(&table)?;
    let encoder = EncodingTable::fit(&dataset)?;
    let encoded = encode_dataset(&dataset, &encoder)?;
    let split = train_test_split(&encoded, config.split_seed);

    if model.dataset_hash != split.train.content_hash()? {
        tracing::info!("persisted artifact does not match current dataset, ignoring");
        return Ok(false);
    }

    let metrics = evaluate(&model, &split.test)?;
    let key = memo_key(&csv, config)?;
    cache.put(
        key,
        Arc::new(PipelineOutput {
            table,
            encoder,
            model,
            metrics,
        }),
    );
    Ok(true)
}

/// Classify one manually entered record with the pipeline's model and
/// encoding table, returning the display label.
pub fn classify(output: &PipelineOutput, input: &CustomerInput) -> Result<String> {
    let features = output.encoder.encode_features(input)?;
    let code = output.model.predict_class(&features);
    Ok(output.encoder.decode_target(code)?.to_string())
}

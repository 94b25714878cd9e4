//! Durable model artifact storage
//!
//! Single-file, single-writer persistence for a trained model: canonical
//! JSON plus a blake3 hex sidecar. `save` overwrites, `load` validates.
//! No versioning and no locking; callers must train-and-save at least once
//! before relying on `load`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{ChurnError, Result};
use crate::gbdt::Model;

/// Handle to the persisted classifier artifact.
#[derive(Clone, Debug)]
pub struct ModelStore {
    path: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn hash_path(&self) -> PathBuf {
        self.path.with_extension("hash")
    }

    /// Overwrite the artifact (and its hash sidecar) with this model.
    pub fn save(&self, model: &Model) -> Result<()> {
        model.validate()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = model.to_canonical_json()?;
        fs::write(&self.path, &json)?;

        let hash = hex::encode(blake3::hash(json.as_bytes()).as_bytes());
        fs::write(self.hash_path(), &hash)?;

        tracing::info!(path = %self.path.display(), hash = %hash, "model artifact saved");
        Ok(())
    }

    /// Reload the persisted model. Fails with
    /// [`ChurnError::ArtifactMissing`] when nothing has been saved yet.
    pub fn load(&self) -> Result<Model> {
        if !self.path.exists() {
            return Err(ChurnError::ArtifactMissing(self.path.clone()));
        }

        let json = fs::read_to_string(&self.path)?;
        let model: Model = serde_json::from_str(&json)?;
        model.validate()?;
        Ok(model)
    }
}

//! Model Store
//!
//! Persists a fitted [`ClassifierModel`] as an opaque bincode blob and
//! resolves which classifier a process should serve with at startup. The
//! resolution is a three-tier fallback: the primary artifact, then a legacy
//! artifact from an earlier training run, then no model at all — in which
//! case the caller substitutes the heuristic classifier. A missing model is
//! a degraded mode, never a startup failure.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::forest::ClassifierModel;

/// Artifact format version; bumped when the model layout changes
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Errors reading or writing a model artifact
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Versioned wrapper written to disk
#[derive(Serialize, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    model: ClassifierModel,
}

/// Which classifier the process resolved at startup
#[derive(Debug)]
pub enum LoadOutcome {
    /// The primary artifact loaded
    Loaded(ClassifierModel),
    /// The primary artifact was unusable but the legacy artifact loaded
    LoadedLegacy(ClassifierModel),
    /// No artifact was usable; serve with the heuristic fallback
    Unavailable,
}

/// Serialize `model` to `path`, creating parent directories as needed
pub fn save_model(path: &Path, model: &ClassifierModel) -> Result<(), StoreError> {
    let artifact = ModelArtifact {
        format_version: MODEL_FORMAT_VERSION,
        model: model.clone(),
    };
    let bytes = bincode::serialize(&artifact).map_err(|e| StoreError::Encode(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, &bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), "Model artifact written");
    Ok(())
}

/// Load and version-check a model artifact from `path`
pub fn load_model(path: &Path) -> Result<ClassifierModel, StoreError> {
    let bytes = fs::read(path)?;
    let artifact: ModelArtifact =
        bincode::deserialize(&bytes).map_err(|e| StoreError::Decode(e.to_string()))?;

    if artifact.format_version != MODEL_FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: artifact.format_version,
            expected: MODEL_FORMAT_VERSION,
        });
    }
    Ok(artifact.model)
}

/// Resolve the classifier to serve with: primary artifact, then legacy
/// artifact, then none.
///
/// Load failures are logged and absorbed here; they must never prevent the
/// process from serving predictions.
pub fn resolve(primary: &Path, legacy: &Path) -> LoadOutcome {
    match load_model(primary) {
        Ok(model) => {
            info!(path = %primary.display(), trees = model.num_trees(), "Loaded model artifact");
            return LoadOutcome::Loaded(model);
        }
        Err(e) => {
            warn!(path = %primary.display(), error = %e, "Primary model unavailable");
        }
    }

    match load_model(legacy) {
        Ok(model) => {
            info!(path = %legacy.display(), trees = model.num_trees(), "Loaded legacy model artifact");
            LoadOutcome::LoadedLegacy(model)
        }
        Err(e) => {
            warn!(
                path = %legacy.display(),
                error = %e,
                "No model artifact found; serving with the heuristic fallback classifier"
            );
            LoadOutcome::Unavailable
        }
    }
}

//! Model artifact loader
//!
//! Reads the manifest, verifies checksums, parses the five JSON artifacts
//! and validates them against each other. Any failure is fatal: there is no
//! partial-capability mode.

use super::manifest::{ArtifactEntry, ArtifactManifest};
use super::{LogisticModel, OneHotEncoder, TextPipeline};
use crate::context::{ArtifactProvenance, InferenceContext};
use crate::types::{ArtifactError, DefectClassifier};
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Load a complete inference context from an artifact directory
pub fn load_inference_context(dir: &Path) -> Result<InferenceContext, ArtifactError> {
    if !dir.is_dir() {
        return Err(ArtifactError::NotFound(dir.to_path_buf()));
    }

    let manifest = ArtifactManifest::load(dir)?;
    let files = &manifest.artifacts;

    let stage1: TextPipeline = read_artifact(dir, &files.stage1)?;
    let stage2_encoder: OneHotEncoder = read_artifact(dir, &files.stage2_encoder)?;
    let stage2: LogisticModel = read_artifact(dir, &files.stage2)?;
    let stage3_encoder: OneHotEncoder = read_artifact(dir, &files.stage3_encoder)?;
    let stage3: LogisticModel = read_artifact(dir, &files.stage3)?;

    info!(
        "Loaded stage-1 model: {} classes, {} vocabulary terms",
        stage1.classes().len(),
        stage1.vectorizer().vocabulary_len()
    );
    info!(
        "Loaded stage-2 model: {} classes; stage-3 model: {} classes",
        stage2.classes().len(),
        stage3.classes().len()
    );

    let context = InferenceContext::new(
        Arc::new(stage1),
        Arc::new(stage2_encoder),
        Arc::new(stage2),
        Arc::new(stage3_encoder),
        Arc::new(stage3),
    )
    .with_provenance(ArtifactProvenance {
        directory: dir.to_path_buf(),
        manifest: manifest.clone(),
    });

    context.validate()?;
    Ok(context)
}

/// Read, verify and parse one artifact
fn read_artifact<T: DeserializeOwned>(
    dir: &Path,
    entry: &ArtifactEntry,
) -> Result<T, ArtifactError> {
    let path = dir.join(&entry.file);
    let bytes = read_bytes(&path)?;

    if let Some(expected) = &entry.sha256 {
        verify_checksum(&path, &bytes, expected)?;
    }

    debug!("Parsing artifact {} ({} bytes)", path.display(), bytes.len());
    serde_json::from_slice(&bytes).map_err(|e| ArtifactError::Corrupt {
        path,
        message: e.to_string(),
    })
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::NotFound(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Lower-case hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

fn verify_checksum(path: &Path, bytes: &[u8], expected: &str) -> Result<(), ArtifactError> {
    let actual = sha256_hex(bytes);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ArtifactError::ChecksumMismatch {
            path: PathBuf::from(path),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

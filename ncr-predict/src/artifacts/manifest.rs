//! Artifact manifest (`manifest.toml`)
//!
//! ```toml
//! format_version = 1
//! description = "NCR cascade, fitted 2025-12"
//!
//! [artifacts.stage1]
//! file = "stage1_defect_model.json"
//! sha256 = "9f2c..."
//! ```
//!
//! The manifest is optional. Without it the default file names apply and no
//! checksums are verified.

use crate::types::ArtifactError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Manifest file name inside the artifact directory
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Supported manifest format version
pub const FORMAT_VERSION: u32 = 1;

/// Artifact directory description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub format_version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub artifacts: ArtifactFiles,
}

/// The five model files of a cascade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFiles {
    #[serde(default = "default_stage1")]
    pub stage1: ArtifactEntry,
    #[serde(default = "default_stage2_encoder")]
    pub stage2_encoder: ArtifactEntry,
    #[serde(default = "default_stage2")]
    pub stage2: ArtifactEntry,
    #[serde(default = "default_stage3_encoder")]
    pub stage3_encoder: ArtifactEntry,
    #[serde(default = "default_stage3")]
    pub stage3: ArtifactEntry,
}

/// One artifact file with an optional SHA-256 digest (lower-case hex)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl ArtifactEntry {
    fn named(file: &str) -> Self {
        Self {
            file: PathBuf::from(file),
            sha256: None,
        }
    }
}

fn default_stage1() -> ArtifactEntry {
    ArtifactEntry::named("stage1_defect_model.json")
}

fn default_stage2_encoder() -> ArtifactEntry {
    ArtifactEntry::named("stage2_encoder.json")
}

fn default_stage2() -> ArtifactEntry {
    ArtifactEntry::named("stage2_root_cause_model.json")
}

fn default_stage3_encoder() -> ArtifactEntry {
    ArtifactEntry::named("stage3_encoder.json")
}

fn default_stage3() -> ArtifactEntry {
    ArtifactEntry::named("stage3_corrective_action_model.json")
}

impl Default for ArtifactFiles {
    fn default() -> Self {
        Self {
            stage1: default_stage1(),
            stage2_encoder: default_stage2_encoder(),
            stage2: default_stage2(),
            stage3_encoder: default_stage3_encoder(),
            stage3: default_stage3(),
        }
    }
}

impl Default for ArtifactManifest {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            description: None,
            artifacts: ArtifactFiles::default(),
        }
    }
}

impl ArtifactManifest {
    /// Read `manifest.toml` from `dir`, or the default manifest if absent
    pub fn load(dir: &Path) -> Result<Self, ArtifactError> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            tracing::info!(
                "No {} in {}, using default artifact names",
                MANIFEST_FILE,
                dir.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;
        let manifest: Self = toml::from_str(&content).map_err(|e| ArtifactError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if manifest.format_version != FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion(manifest.format_version));
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_manifest_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let manifest = ArtifactManifest::load(dir.path()).unwrap();
        assert_eq!(manifest, ArtifactManifest::default());
        assert_eq!(
            manifest.artifacts.stage3.file,
            PathBuf::from("stage3_corrective_action_model.json")
        );
    }

    #[test]
    fn test_partial_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"
            format_version = 1

            [artifacts.stage1]
            file = "custom_stage1.json"
            sha256 = "abc123"
            "#,
        )
        .unwrap();

        let manifest = ArtifactManifest::load(dir.path()).unwrap();
        assert_eq!(manifest.artifacts.stage1.file, PathBuf::from("custom_stage1.json"));
        assert_eq!(manifest.artifacts.stage1.sha256.as_deref(), Some("abc123"));
        assert_eq!(manifest.artifacts.stage2, default_stage2());
    }

    #[test]
    fn test_unsupported_version() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "format_version = 7\n").unwrap();

        let err = ArtifactManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::UnsupportedVersion(7)));
    }

    #[test]
    fn test_corrupt_manifest() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "format_version = [").unwrap();

        let err = ArtifactManifest::load(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Corrupt { .. }));
    }
}

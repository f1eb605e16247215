//! Core Types and Trait Definitions for ncr-predict
//!
//! Defines the model seams of the three-stage cascade:
//! - **Stage 1:** `DefectClassifier` (normalized text → label + confidence)
//! - **Conditioning:** `CategoricalEncoder` (category tuple → feature vector)
//! - **Stages 2/3:** `LabelClassifier` (feature vector → label)
//!
//! All implementations are immutable after construction and must be
//! `Send + Sync` so a single loaded model set can serve concurrent callers.

use ncr_common::Category;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Common Types
// ============================================================================

/// Label with its class probability
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredLabel {
    pub label: Category,
    /// Maximum class probability (0.0-1.0)
    pub confidence: f32,
}

impl ScoredLabel {
    /// Create new scored label with clamped confidence (0.0-1.0)
    pub fn new(label: impl Into<Category>, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Dense model input
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn zeros(width: usize) -> Self {
        Self(vec![0.0; width])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

// ============================================================================
// Model Traits
// ============================================================================

/// Stage-1 classifier: normalized text → (defect category, confidence)
///
/// Must be deterministic: the same text always yields the same result.
pub trait DefectClassifier: Send + Sync {
    /// Trained label set, in model order
    fn classes(&self) -> &[String];

    /// Classify normalized text
    ///
    /// Total over all strings: text without any known feature still yields a
    /// label (typically with low confidence).
    fn classify_with_confidence(&self, text: &str) -> ScoredLabel;
}

/// Fitted categorical encoder for stage-2/3 conditioning
pub trait CategoricalEncoder: Send + Sync {
    /// Number of fields in each input tuple
    fn arity(&self) -> usize;

    /// Width of the produced feature vector
    fn width(&self) -> usize;

    /// Known categories of one field
    fn categories(&self, field: usize) -> Option<&[String]>;

    /// Encode a category tuple
    ///
    /// # Errors
    /// `PipelineError::Invariant` on wrong arity or an unseen category.
    fn encode(&self, fields: &[&str]) -> Result<FeatureVector, PipelineError>;
}

/// Stage-2/3 classifier: encoded features → label
pub trait LabelClassifier: Send + Sync {
    /// Trained label set, in model order
    fn classes(&self) -> &[String];

    /// Expected feature vector width
    fn input_width(&self) -> usize;

    /// Most probable label with its probability
    ///
    /// # Errors
    /// `PipelineError::Invariant` if the feature width does not match.
    fn predict_scored(&self, features: &FeatureVector) -> Result<ScoredLabel, PipelineError>;

    /// Most probable label
    fn predict(&self, features: &FeatureVector) -> Result<Category, PipelineError> {
        self.predict_scored(features).map(|scored| scored.label)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Inference-time failure
///
/// Gate and confidence rejections are NOT errors; they resolve to the
/// unknown triple. Only broken internal invariants surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Internal invariant violated (unseen category, shape mismatch)
    #[error("Invariant violation: {0}")]
    Invariant(String),
}

/// Model artifact load failure (fatal at start-up)
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// Artifact directory or file missing
    #[error("Artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    /// I/O error reading an artifact
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact content cannot be parsed
    #[error("Corrupt artifact {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    /// SHA-256 digest differs from the manifest
    #[error("Checksum mismatch for {}: expected {expected}, got {actual}", path.display())]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// Artifacts are individually valid but inconsistent with each other
    #[error("Invalid model: {0}")]
    Invalid(String),

    /// Manifest format version not supported
    #[error("Unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
}

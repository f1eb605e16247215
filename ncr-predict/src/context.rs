//! Inference context
//!
//! Holds the five immutable model handles of the cascade. Built once at
//! start-up (from artifacts or injected stubs) and shared read-only.

use crate::artifacts::ArtifactManifest;
use crate::types::{ArtifactError, CategoricalEncoder, DefectClassifier, LabelClassifier};
use ncr_common::UNKNOWN_LABEL;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// Where a context was loaded from
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactProvenance {
    pub directory: PathBuf,
    pub manifest: ArtifactManifest,
}

/// The five model handles
#[derive(Clone)]
pub struct InferenceContext {
    pub stage1: Arc<dyn DefectClassifier>,
    pub stage2_encoder: Arc<dyn CategoricalEncoder>,
    pub stage2: Arc<dyn LabelClassifier>,
    pub stage3_encoder: Arc<dyn CategoricalEncoder>,
    pub stage3: Arc<dyn LabelClassifier>,
    pub provenance: Option<ArtifactProvenance>,
}

impl std::fmt::Debug for InferenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceContext")
            .field("defect_classes", &self.stage1.classes())
            .field("root_cause_classes", &self.stage2.classes())
            .field("corrective_action_classes", &self.stage3.classes())
            .field("provenance", &self.provenance)
            .finish()
    }
}

impl InferenceContext {
    pub fn new(
        stage1: Arc<dyn DefectClassifier>,
        stage2_encoder: Arc<dyn CategoricalEncoder>,
        stage2: Arc<dyn LabelClassifier>,
        stage3_encoder: Arc<dyn CategoricalEncoder>,
        stage3: Arc<dyn LabelClassifier>,
    ) -> Self {
        Self {
            stage1,
            stage2_encoder,
            stage2,
            stage3_encoder,
            stage3,
            provenance: None,
        }
    }

    pub fn with_provenance(mut self, provenance: ArtifactProvenance) -> Self {
        self.provenance = Some(provenance);
        self
    }

    /// Check cross-model consistency
    ///
    /// Fatal:
    /// - a model label equal to the `unknown` sentinel
    /// - stage-2 encoder arity other than 1, stage-3 encoder arity other than 2
    /// - encoder width differing from the classifier it feeds
    ///
    /// Logged only: stage-1 labels missing from the stage-2 encoder, or
    /// stage-1/stage-2 labels missing from the stage-3 encoder. Such inputs
    /// surface as invariant violations at request time.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        for (stage, classes) in [
            ("stage1", self.stage1.classes()),
            ("stage2", self.stage2.classes()),
            ("stage3", self.stage3.classes()),
        ] {
            if classes.is_empty() {
                return Err(ArtifactError::Invalid(format!("{} has no classes", stage)));
            }
            if classes.iter().any(|c| c == UNKNOWN_LABEL) {
                return Err(ArtifactError::Invalid(format!(
                    "{} uses the reserved label '{}'",
                    stage, UNKNOWN_LABEL
                )));
            }
        }

        if self.stage2_encoder.arity() != 1 {
            return Err(ArtifactError::Invalid(format!(
                "stage2 encoder must take 1 field, takes {}",
                self.stage2_encoder.arity()
            )));
        }
        if self.stage3_encoder.arity() != 2 {
            return Err(ArtifactError::Invalid(format!(
                "stage3 encoder must take 2 fields, takes {}",
                self.stage3_encoder.arity()
            )));
        }

        if self.stage2_encoder.width() != self.stage2.input_width() {
            return Err(ArtifactError::Invalid(format!(
                "stage2 encoder width {} != classifier width {}",
                self.stage2_encoder.width(),
                self.stage2.input_width()
            )));
        }
        if self.stage3_encoder.width() != self.stage3.input_width() {
            return Err(ArtifactError::Invalid(format!(
                "stage3 encoder width {} != classifier width {}",
                self.stage3_encoder.width(),
                self.stage3.input_width()
            )));
        }

        warn_uncovered(
            "stage2 encoder",
            self.stage1.classes(),
            self.stage2_encoder.categories(0),
        );
        warn_uncovered(
            "stage3 encoder (defect field)",
            self.stage1.classes(),
            self.stage3_encoder.categories(0),
        );
        warn_uncovered(
            "stage3 encoder (root cause field)",
            self.stage2.classes(),
            self.stage3_encoder.categories(1),
        );

        Ok(())
    }
}

fn warn_uncovered(target: &str, produced: &[String], accepted: Option<&[String]>) {
    let accepted = accepted.unwrap_or(&[]);
    let missing: Vec<&str> = produced
        .iter()
        .filter(|label| !accepted.contains(label))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        warn!(
            "{} does not accept upstream labels [{}]; such predictions will fail",
            target,
            missing.join(", ")
        );
    }
}

//! Cascade Orchestrator
//!
//! Runs one description through the prediction cascade:
//!
//! ```text
//! START → NORMALIZED → GATE_CHECKED → STAGE1_DONE → STAGE2_DONE → STAGE3_DONE
//!              │                          │              │              │
//!              └──── gate failed ─────────┴── confidence below threshold ┴──→ UNKNOWN
//! ```
//!
//! Exactly one of `STAGE3_DONE` or `UNKNOWN` is reached per invocation. Gate
//! and confidence rejections are outcomes, not errors: they resolve to the
//! uniform unknown triple. Only invariant violations (an encoder refusing an
//! upstream label) are returned as `Err`.
//!
//! Stage 2 sees only the stage-1 label and stage 3 only the (stage 1,
//! stage 2) pair, so two descriptions that agree at stage 1 agree everywhere.

mod state;

pub use state::{CascadeState, UnknownCause};

use crate::context::InferenceContext;
use crate::text::{normalize, GateVerdict, MeaningfulnessGate};
use crate::types::{PipelineError, ScoredLabel};
use ncr_common::config::CascadeConfig;
use ncr_common::{Category, PredictionResult};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Default stage-1 unknown threshold
pub const UNKNOWN_THRESHOLD: f32 = 0.30;

/// Gate and threshold settings
///
/// Confidence comparisons are `confidence >= threshold` to pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeSettings {
    pub unknown_threshold: f32,
    pub root_cause_threshold: Option<f32>,
    pub corrective_action_threshold: Option<f32>,
    pub gate: MeaningfulnessGate,
}

impl Default for CascadeSettings {
    fn default() -> Self {
        Self {
            unknown_threshold: UNKNOWN_THRESHOLD,
            root_cause_threshold: None,
            corrective_action_threshold: None,
            gate: MeaningfulnessGate::default(),
        }
    }
}

impl From<&CascadeConfig> for CascadeSettings {
    fn from(config: &CascadeConfig) -> Self {
        Self {
            unknown_threshold: config.unknown_threshold,
            root_cause_threshold: config.root_cause_threshold,
            corrective_action_threshold: config.corrective_action_threshold,
            gate: MeaningfulnessGate::new(config.min_text_length, config.min_alpha_ratio),
        }
    }
}

/// Full record of one cascade run
#[derive(Debug, Clone, Serialize)]
pub struct CascadeTrace {
    pub result: PredictionResult,
    /// Text seen by stage 1
    pub normalized: String,
    /// `Stage3Done` or `Unknown`
    pub terminal: CascadeState,
    /// States visited, `Start` first, terminal last
    pub path: Vec<CascadeState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<UnknownCause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defect_confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause_confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrective_action_confidence: Option<f32>,
}

/// Records transitions while a run is in progress
struct Run {
    normalized: String,
    path: Vec<CascadeState>,
    defect_confidence: Option<f32>,
    root_cause_confidence: Option<f32>,
    corrective_action_confidence: Option<f32>,
}

impl Run {
    fn new() -> Self {
        Self {
            normalized: String::new(),
            path: vec![CascadeState::Start],
            defect_confidence: None,
            root_cause_confidence: None,
            corrective_action_confidence: None,
        }
    }

    fn enter(&mut self, state: CascadeState) {
        self.path.push(state);
    }

    fn unknown(mut self, cause: UnknownCause) -> CascadeTrace {
        debug!(
            "Cascade -> UNKNOWN from {:?}: {}",
            self.path.last().copied().unwrap_or(CascadeState::Start),
            cause.as_str()
        );
        self.path.push(CascadeState::Unknown);
        self.finish(PredictionResult::unknown(), CascadeState::Unknown, Some(cause))
    }

    fn finish(
        self,
        result: PredictionResult,
        terminal: CascadeState,
        cause: Option<UnknownCause>,
    ) -> CascadeTrace {
        CascadeTrace {
            result,
            normalized: self.normalized,
            terminal,
            path: self.path,
            cause,
            defect_confidence: self.defect_confidence,
            root_cause_confidence: self.root_cause_confidence,
            corrective_action_confidence: self.corrective_action_confidence,
        }
    }
}

/// Gate + three-stage classifier cascade
#[derive(Debug, Clone)]
pub struct CascadeOrchestrator {
    context: Arc<InferenceContext>,
    settings: CascadeSettings,
}

impl CascadeOrchestrator {
    pub fn new(context: Arc<InferenceContext>, settings: CascadeSettings) -> Self {
        Self { context, settings }
    }

    pub fn context(&self) -> &InferenceContext {
        &self.context
    }

    pub fn settings(&self) -> &CascadeSettings {
        &self.settings
    }

    /// Predict the category triple for one description
    pub fn predict(&self, description: &str) -> Result<PredictionResult, PipelineError> {
        self.run(description).map(|trace| trace.result)
    }

    /// Predict a batch; output has the same length and order as the input
    ///
    /// Items are independent and processed in parallel. The first invariant
    /// violation fails the batch.
    pub fn predict_batch<S>(&self, descriptions: &[S]) -> Result<Vec<PredictionResult>, PipelineError>
    where
        S: AsRef<str> + Sync,
    {
        descriptions
            .par_iter()
            .map(|d| self.predict(d.as_ref()))
            .collect()
    }

    /// Batch variant of [`run`](Self::run)
    pub fn run_batch<S>(&self, descriptions: &[S]) -> Result<Vec<CascadeTrace>, PipelineError>
    where
        S: AsRef<str> + Sync,
    {
        descriptions
            .par_iter()
            .map(|d| self.run(d.as_ref()))
            .collect()
    }

    /// Run the state machine and keep the full trace
    pub fn run(&self, description: &str) -> Result<CascadeTrace, PipelineError> {
        let mut run = Run::new();

        // START → NORMALIZED
        run.normalized = normalize(description);
        run.enter(CascadeState::Normalized);

        // NORMALIZED → GATE_CHECKED | UNKNOWN
        if let GateVerdict::Reject(reason) = self
            .settings
            .gate
            .evaluate_description(description, &run.normalized)
        {
            return Ok(run.unknown(UnknownCause::Gate(reason)));
        }
        run.enter(CascadeState::GateChecked);

        // GATE_CHECKED → STAGE1_DONE
        let defect = self.classify_defect(&run.normalized);
        run.defect_confidence = Some(defect.confidence);
        run.enter(CascadeState::Stage1Done);

        // STAGE1_DONE → UNKNOWN when below threshold
        if defect.confidence < self.settings.unknown_threshold {
            debug!(
                "Stage-1 confidence {:.3} below threshold {:.3} (label '{}')",
                defect.confidence, self.settings.unknown_threshold, defect.label
            );
            return Ok(run.unknown(UnknownCause::LowDefectConfidence));
        }

        // STAGE1_DONE → STAGE2_DONE
        let root_cause = self.classify_root_cause(&defect.label)?;
        run.root_cause_confidence = Some(root_cause.confidence);
        run.enter(CascadeState::Stage2Done);

        if below(root_cause.confidence, self.settings.root_cause_threshold) {
            return Ok(run.unknown(UnknownCause::LowRootCauseConfidence));
        }

        // STAGE2_DONE → STAGE3_DONE
        let action = self.classify_corrective_action(&defect.label, &root_cause.label)?;
        run.corrective_action_confidence = Some(action.confidence);

        if below(action.confidence, self.settings.corrective_action_threshold) {
            return Ok(run.unknown(UnknownCause::LowCorrectiveActionConfidence));
        }
        run.enter(CascadeState::Stage3Done);

        let result = PredictionResult::from_parts(defect.label, root_cause.label, action.label)
            .map_err(|e| PipelineError::Invariant(e.to_string()))?;
        debug!("Cascade -> STAGE3_DONE: {}", result);

        Ok(run.finish(result, CascadeState::Stage3Done, None))
    }

    /// Stage 1: normalized text → defect category with confidence
    pub fn classify_defect(&self, normalized: &str) -> ScoredLabel {
        self.context.stage1.classify_with_confidence(normalized)
    }

    /// Stage 2: defect category → root-cause category
    pub fn classify_root_cause(&self, defect: &Category) -> Result<ScoredLabel, PipelineError> {
        let features = self.context.stage2_encoder.encode(&[defect.as_str()])?;
        self.context.stage2.predict_scored(&features)
    }

    /// Stage 3: (defect, root cause) → corrective-action category
    pub fn classify_corrective_action(
        &self,
        defect: &Category,
        root_cause: &Category,
    ) -> Result<ScoredLabel, PipelineError> {
        let features = self
            .context
            .stage3_encoder
            .encode(&[defect.as_str(), root_cause.as_str()])?;
        self.context.stage3.predict_scored(&features)
    }
}

fn below(confidence: f32, threshold: Option<f32>) -> bool {
    threshold.is_some_and(|t| confidence < t)
}

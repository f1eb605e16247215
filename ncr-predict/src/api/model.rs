//! Model description endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::cascade::CascadeOrchestrator;
use crate::context::ArtifactProvenance;
use crate::AppState;

/// Label sets of the three stages
#[derive(Debug, Serialize)]
pub struct LabelSets {
    pub defect: Vec<String>,
    pub root_cause: Vec<String>,
    pub corrective_action: Vec<String>,
}

/// Active gate and confidence thresholds
#[derive(Debug, Serialize)]
pub struct Thresholds {
    pub unknown_threshold: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause_threshold: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrective_action_threshold: Option<f32>,
    pub min_text_length: usize,
    pub min_alpha_ratio: f32,
}

/// GET /model response
#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub labels: LabelSets,
    pub thresholds: Thresholds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ArtifactProvenance>,
    pub llm_fallback: bool,
}

impl ModelResponse {
    pub fn new(cascade: &CascadeOrchestrator, llm_fallback: bool) -> Self {
        let context = cascade.context();
        let settings = cascade.settings();

        Self {
            labels: LabelSets {
                defect: context.stage1.classes().to_vec(),
                root_cause: context.stage2.classes().to_vec(),
                corrective_action: context.stage3.classes().to_vec(),
            },
            thresholds: Thresholds {
                unknown_threshold: settings.unknown_threshold,
                root_cause_threshold: settings.root_cause_threshold,
                corrective_action_threshold: settings.corrective_action_threshold,
                min_text_length: settings.gate.min_text_length(),
                min_alpha_ratio: settings.gate.min_alpha_ratio(),
            },
            provenance: context.provenance.clone(),
            llm_fallback,
        }
    }
}

/// GET /model
pub async fn describe_model(State(state): State<AppState>) -> Json<ModelResponse> {
    Json(ModelResponse::new(&state.cascade, state.llm.is_some()))
}

/// Build model routes
pub fn model_routes() -> Router<AppState> {
    Router::new().route("/model", get(describe_model))
}

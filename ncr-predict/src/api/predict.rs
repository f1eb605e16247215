//! Prediction endpoints
//!
//! The cascade answers every request. The LLM is consulted only for
//! descriptions whose triple is unknown, and only when the request asks.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::llm::{predict_root_causes_batch, FreeTextPredictor};
use crate::report::PredictionReport;
use crate::{ApiError, ApiResult, AppState};

/// POST /predict request
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub description: String,
    /// Ask the LLM for a free-text root cause when the triple is unknown
    #[serde(default)]
    pub llm_fallback: bool,
}

/// POST /predict/batch request
#[derive(Debug, Deserialize)]
pub struct BatchPredictRequest {
    pub descriptions: Vec<String>,
    #[serde(default)]
    pub llm_fallback: bool,
}

/// POST /predict/batch response, same order as the request
#[derive(Debug, Serialize)]
pub struct BatchPredictResponse {
    pub results: Vec<PredictionReport>,
}

/// POST /predict
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictionReport>> {
    let llm = fallback_predictor(&state, request.llm_fallback)?;

    let trace = state.cascade.run(&request.description)?;
    let mut report = PredictionReport::new(&request.description, trace);

    if let Some(llm) = llm.filter(|_| report.is_unknown()) {
        debug!("Unknown triple, consulting {} for root cause", llm.name());
        let answer = predict_root_causes_batch(llm.as_ref(), &[request.description.as_str()]).await;
        report.llm_root_cause = answer.into_iter().next();
    }

    Ok(Json(report))
}

/// POST /predict/batch
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchPredictRequest>,
) -> ApiResult<Json<BatchPredictResponse>> {
    let llm = fallback_predictor(&state, request.llm_fallback)?;
    let descriptions = request.descriptions;

    // rayon fan-out stays off the async workers
    let cascade = state.cascade.clone();
    let (descriptions, traces) = tokio::task::spawn_blocking(move || {
        let traces = cascade.run_batch(&descriptions);
        (descriptions, traces)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Batch task failed: {}", e)))?;
    let traces = traces?;

    let mut results: Vec<PredictionReport> = descriptions
        .iter()
        .zip(traces)
        .map(|(description, trace)| PredictionReport::new(description, trace))
        .collect();

    let unknown_count = results.iter().filter(|r| r.is_unknown()).count();
    info!(
        "Batch of {} predicted, {} unknown",
        results.len(),
        unknown_count
    );

    if let Some(llm) = llm.filter(|_| unknown_count > 0) {
        let unknown: Vec<usize> = (0..results.len())
            .filter(|&i| results[i].is_unknown())
            .collect();
        let pending: Vec<&str> = unknown.iter().map(|&i| descriptions[i].as_str()).collect();
        let answers = predict_root_causes_batch(llm.as_ref(), &pending).await;
        for (index, answer) in unknown.into_iter().zip(answers) {
            results[index].llm_root_cause = Some(answer);
        }
    }

    Ok(Json(BatchPredictResponse { results }))
}

fn fallback_predictor(
    state: &AppState,
    requested: bool,
) -> ApiResult<Option<std::sync::Arc<dyn FreeTextPredictor>>> {
    if !requested {
        return Ok(None);
    }
    state
        .llm
        .clone()
        .map(Some)
        .ok_or_else(|| ApiError::BadRequest("LLM fallback is not configured".to_string()))
}

/// Build prediction routes
pub fn predict_routes() -> Router<AppState> {
    Router::new()
        .route("/predict", post(predict))
        .route("/predict/batch", post(predict_batch))
}

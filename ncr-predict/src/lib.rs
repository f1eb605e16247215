//! ncr-predict library interface
//!
//! Three-stage NCR classification cascade (defect → root cause →
//! corrective action) behind a text normalizer and meaningfulness gate,
//! plus the HTTP service and the optional LLM fallback boundary.

pub mod api;
pub mod artifacts;
pub mod cascade;
pub mod context;
pub mod error;
pub mod extractors;
pub mod input;
pub mod llm;
pub mod report;
pub mod text;
pub mod types;

pub use crate::cascade::{CascadeOrchestrator, CascadeSettings, CascadeTrace};
pub use crate::context::InferenceContext;
pub use crate::error::{ApiError, ApiResult};
pub use crate::report::PredictionReport;

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::llm::FreeTextPredictor;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Cascade over the loaded inference context
    pub cascade: Arc<CascadeOrchestrator>,
    /// Free-text fallback, present only when configured
    pub llm: Option<Arc<dyn FreeTextPredictor>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(cascade: Arc<CascadeOrchestrator>) -> Self {
        Self {
            cascade,
            llm: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn FreeTextPredictor>) -> Self {
        self.llm = Some(llm);
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::model_routes())
        .merge(api::predict_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

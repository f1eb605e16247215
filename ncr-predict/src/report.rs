//! Prediction report
//!
//! What the service and CLI emit for one description: the category triple,
//! how the cascade ended, and the side-channel heuristics (entities, keyword
//! defect type) that never influence the triple.

use crate::cascade::{CascadeState, CascadeTrace};
use crate::extractors::{extract_entities, keyword_defect_type, ExtractedEntities};
use ncr_common::{Category, PredictionResult};
use serde::Serialize;

/// One description's prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    #[serde(flatten)]
    pub result: PredictionResult,
    /// `STAGE3_DONE` or `UNKNOWN`
    pub outcome: CascadeState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defect_confidence: Option<f32>,
    /// Why the result is unknown, if it is
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<&'static str>,
    pub entities: ExtractedEntities,
    pub keyword_defect_type: Category,
    /// Free-text root cause from the LLM fallback, or `"Error: <msg>"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_root_cause: Option<String>,
}

impl PredictionReport {
    pub fn new(description: &str, trace: CascadeTrace) -> Self {
        Self {
            result: trace.result,
            outcome: trace.terminal,
            defect_confidence: trace.defect_confidence,
            rejection: trace.cause.map(|cause| cause.as_str()),
            entities: extract_entities(description),
            keyword_defect_type: keyword_defect_type(description),
            llm_root_cause: None,
        }
    }

    /// Replace description entities with ones taken from a wider source,
    /// such as the full NCR record
    pub fn with_entities(mut self, entities: ExtractedEntities) -> Self {
        self.entities = entities;
        self
    }

    pub fn is_unknown(&self) -> bool {
        self.result.is_unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::UnknownCause;
    use crate::text::RejectionReason;

    fn unknown_trace(cause: UnknownCause) -> CascadeTrace {
        CascadeTrace {
            result: PredictionResult::unknown(),
            normalized: String::new(),
            terminal: CascadeState::Unknown,
            path: vec![CascadeState::Start, CascadeState::Normalized, CascadeState::Unknown],
            cause: Some(cause),
            defect_confidence: None,
            root_cause_confidence: None,
            corrective_action_confidence: None,
        }
    }

    #[test]
    fn test_unknown_report_json() {
        let report = PredictionReport::new(
            "?? EM1782",
            unknown_trace(UnknownCause::Gate(RejectionReason::TooShort)),
        );
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["defect_category"], "unknown");
        assert_eq!(json["root_cause_category"], "unknown");
        assert_eq!(json["corrective_action_category"], "unknown");
        assert_eq!(json["outcome"], "UNKNOWN");
        assert_eq!(json["rejection"], "too_short");
        assert_eq!(json["entities"]["machines"][0], "EM1782");
        assert_eq!(json["keyword_defect_type"], "unknown");
        assert!(json.get("defect_confidence").is_none());
        assert!(json.get("llm_root_cause").is_none());
    }

    #[test]
    fn test_keyword_type_is_independent_of_result() {
        let report = PredictionReport::new(
            "deep scratch on surface",
            unknown_trace(UnknownCause::LowDefectConfidence),
        );
        assert!(report.is_unknown());
        assert_eq!(report.keyword_defect_type.as_str(), "surface");
    }

    #[test]
    fn test_with_entities_overrides_description_entities() {
        let record_entities = ExtractedEntities {
            operations: vec!["OP7200".to_string(), "OP7300".to_string()],
            ..ExtractedEntities::default()
        };
        let report = PredictionReport::new(
            "scratch after OP7200",
            unknown_trace(UnknownCause::LowDefectConfidence),
        )
        .with_entities(record_entities.clone());

        assert_eq!(report.entities, record_entities);
        assert_eq!(report.keyword_defect_type.as_str(), "surface");
    }
}

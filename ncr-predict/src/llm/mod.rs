//! Free-text root-cause prediction via an external LLM
//!
//! Boundary interface only: the categorical cascade never calls into this
//! module. The HTTP service consults it after the cascade has produced the
//! unknown triple and the caller asked for a fallback.

pub mod client;
pub mod prompt;

pub use client::DashScopeClient;
pub use prompt::{build_prediction_prompt, build_user_message, SYSTEM_PROMPT};

use async_trait::async_trait;
use ncr_common::record::{parse_ncr_csv_entry, DEFAULT_DELIMITER};
use thiserror::Error;
use tracing::warn;

/// LLM predictor errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// No API key configured
    #[error("DASHSCOPE_API_KEY environment variable not set")]
    MissingApiKey,

    /// Network error (connection, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success response from the service
    #[error("{0}")]
    Api(String),

    /// Response body not in the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Caller input could not be turned into a prompt
    #[error("Invalid input: {0}")]
    Input(#[from] ncr_common::Error),
}

/// Free-text root-cause predictor
#[async_trait]
pub trait FreeTextPredictor: Send + Sync {
    /// Predictor name for provenance
    fn name(&self) -> &'static str;

    /// Predict the most likely root cause of an NCR description
    async fn predict_root_cause(&self, description: &str) -> Result<String, LlmError>;
}

/// Predict the root cause of one production CSV line
///
/// The prompt is built from the record fields; the recorded root cause and
/// corrective action are never shown to the model.
pub async fn predict_root_cause_from_csv(
    predictor: &dyn FreeTextPredictor,
    csv_line: &str,
) -> Result<String, LlmError> {
    let record = parse_ncr_csv_entry(csv_line, DEFAULT_DELIMITER)?;
    let prompt = build_prediction_prompt(&record);
    predictor.predict_root_cause(&prompt).await
}

/// Predict root causes for many descriptions
///
/// Requests run sequentially. A failed item yields `"Error: <message>"` in
/// its slot and does not affect the others.
pub async fn predict_root_causes_batch<S: AsRef<str>>(
    predictor: &dyn FreeTextPredictor,
    descriptions: &[S],
) -> Vec<String> {
    let mut predictions = Vec::with_capacity(descriptions.len());
    for (index, description) in descriptions.iter().enumerate() {
        match predictor.predict_root_cause(description.as_ref()).await {
            Ok(prediction) => predictions.push(prediction),
            Err(e) => {
                warn!("Root-cause prediction {} failed: {}", index, e);
                predictions.push(format!("Error: {}", e));
            }
        }
    }
    predictions
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records prompts and fails on any prompt containing "FAIL"
    struct RecordingPredictor {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FreeTextPredictor for RecordingPredictor {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn predict_root_cause(&self, description: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(description.to_string());
            if description.contains("FAIL") {
                Err(LlmError::Api("DashScope API error: 500 - boom".to_string()))
            } else {
                Ok(format!("cause for {}", description.len()))
            }
        }
    }

    fn predictor() -> RecordingPredictor {
        RecordingPredictor {
            prompts: Mutex::new(Vec::new()),
        }
    }

    const EXAMPLE_LINE: &str = "AA1;AA1_003884;7200;CO2910 is non conforming;CO2910;120,2;-0,6;0,6;0;OP7200 DA;awaiting QA;CCCC-04-01;EM1782;12/23/25;1200;2/13/10;AAAA-02-06;12/13/25;NOT DETERMINED YET;Add manual tool calibration";

    #[tokio::test]
    async fn test_from_csv_sends_prompt_without_root_cause() {
        let predictor = predictor();
        let result = predict_root_cause_from_csv(&predictor, EXAMPLE_LINE).await;
        assert!(result.is_ok());

        let prompts = predictor.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("CO2910 is non conforming"));
        assert!(!prompts[0].contains("NOT DETERMINED YET"));
        assert!(!prompts[0].contains("Add manual tool calibration"));
    }

    #[tokio::test]
    async fn test_from_csv_rejects_bad_line() {
        let err = predict_root_cause_from_csv(&predictor(), "AA1;AA1_003884")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Input(_)));
        assert!(err.to_string().contains("Expected 20 columns"));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures() {
        let predictor = predictor();
        let results =
            predict_root_causes_batch(&predictor, &["first", "FAIL here", "third"]).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], "cause for 5");
        assert_eq!(results[1], "Error: DashScope API error: 500 - boom");
        assert_eq!(results[2], "cause for 5");
    }
}

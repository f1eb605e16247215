//! Category labels and the three-stage prediction triple
//!
//! A category is an opaque label owned by the model artifacts, plus one
//! reserved sentinel (`unknown`) injected by the cascade when no confident
//! prediction is possible.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved label signalling "no confident prediction possible"
pub const UNKNOWN_LABEL: &str = "unknown";

/// Defect, root-cause or corrective-action category label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    /// Wrap a label. The literal `unknown` yields the sentinel.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The reserved sentinel
    pub fn unknown() -> Self {
        Self(UNKNOWN_LABEL.to_string())
    }

    pub fn is_unknown(&self) -> bool {
        self.0 == UNKNOWN_LABEL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Category {
    fn from(label: String) -> Self {
        Self::new(label)
    }
}

/// Ordered triple (defect, root cause, corrective action)
///
/// Either all three members are real categories or all three are the
/// `unknown` sentinel. Mixed triples cannot be constructed or deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPrediction")]
pub struct PredictionResult {
    defect_category: Category,
    root_cause_category: Category,
    corrective_action_category: Category,
}

#[derive(Deserialize)]
struct RawPrediction {
    defect_category: Category,
    root_cause_category: Category,
    corrective_action_category: Category,
}

impl TryFrom<RawPrediction> for PredictionResult {
    type Error = Error;

    fn try_from(raw: RawPrediction) -> Result<Self> {
        Self::from_parts(
            raw.defect_category,
            raw.root_cause_category,
            raw.corrective_action_category,
        )
    }
}

impl PredictionResult {
    /// The uniform fallback triple `(unknown, unknown, unknown)`
    pub fn unknown() -> Self {
        Self {
            defect_category: Category::unknown(),
            root_cause_category: Category::unknown(),
            corrective_action_category: Category::unknown(),
        }
    }

    /// Build a triple, rejecting partial results
    ///
    /// # Errors
    /// Returns `Error::InvalidInput` when some but not all members are `unknown`.
    pub fn from_parts(
        defect: Category,
        root_cause: Category,
        corrective_action: Category,
    ) -> Result<Self> {
        let unknowns = [&defect, &root_cause, &corrective_action]
            .iter()
            .filter(|c| c.is_unknown())
            .count();

        if unknowns != 0 && unknowns != 3 {
            return Err(Error::InvalidInput(format!(
                "Partial prediction ({}, {}, {}): all members must be known or all unknown",
                defect, root_cause, corrective_action
            )));
        }

        Ok(Self {
            defect_category: defect,
            root_cause_category: root_cause,
            corrective_action_category: corrective_action,
        })
    }

    pub fn is_unknown(&self) -> bool {
        self.defect_category.is_unknown()
    }

    pub fn defect_category(&self) -> &Category {
        &self.defect_category
    }

    pub fn root_cause_category(&self) -> &Category {
        &self.root_cause_category
    }

    pub fn corrective_action_category(&self) -> &Category {
        &self.corrective_action_category
    }

    /// Borrow the triple as plain labels
    pub fn as_triple(&self) -> (&str, &str, &str) {
        (
            self.defect_category.as_str(),
            self.root_cause_category.as_str(),
            self.corrective_action_category.as_str(),
        )
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.defect_category, self.root_cause_category, self.corrective_action_category
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_triple() {
        let result = PredictionResult::unknown();
        assert!(result.is_unknown());
        assert_eq!(result.as_triple(), ("unknown", "unknown", "unknown"));
    }

    #[test]
    fn test_from_parts_all_known() {
        let result = PredictionResult::from_parts(
            "dimensional".into(),
            "tool wear".into(),
            "recalibrate tool".into(),
        )
        .unwrap();

        assert!(!result.is_unknown());
        assert_eq!(result.root_cause_category().as_str(), "tool wear");
    }

    #[test]
    fn test_from_parts_rejects_partial() {
        let err = PredictionResult::from_parts(
            "dimensional".into(),
            Category::unknown(),
            Category::unknown(),
        )
        .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_from_parts_all_unknown_is_fallback() {
        let result = PredictionResult::from_parts(
            Category::unknown(),
            Category::unknown(),
            Category::unknown(),
        )
        .unwrap();
        assert_eq!(result, PredictionResult::unknown());
    }

    #[test]
    fn test_deserialize_rejects_partial() {
        let json = r#"{"defect_category":"surface","root_cause_category":"unknown","corrective_action_category":"rework"}"#;
        assert!(serde_json::from_str::<PredictionResult>(json).is_err());
    }

    #[test]
    fn test_serialize_field_names() {
        let result = PredictionResult::unknown();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["defect_category"], "unknown");
        assert_eq!(value["corrective_action_category"], "unknown");
    }
}

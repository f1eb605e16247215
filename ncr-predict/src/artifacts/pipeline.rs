//! Stage-1 text pipeline artifact (TF-IDF → logistic regression)

use super::logistic::LogisticModel;
use super::tfidf::TfidfVectorizer;
use crate::types::{DefectClassifier, ScoredLabel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
struct PipelineSpec {
    vectorizer: TfidfVectorizer,
    classifier: LogisticModel,
}

/// Defect classifier over normalized description text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PipelineSpec")]
pub struct TextPipeline {
    vectorizer: TfidfVectorizer,
    classifier: LogisticModel,
}

impl TryFrom<PipelineSpec> for TextPipeline {
    type Error = String;

    fn try_from(spec: PipelineSpec) -> Result<Self, Self::Error> {
        Self::new(spec.vectorizer, spec.classifier)
    }
}

impl TextPipeline {
    /// # Errors
    /// Returns a description if the vectorizer and classifier widths differ.
    pub fn new(vectorizer: TfidfVectorizer, classifier: LogisticModel) -> Result<Self, String> {
        if vectorizer.n_features() != classifier.n_features() {
            return Err(format!(
                "vectorizer emits {} features but classifier expects {}",
                vectorizer.n_features(),
                classifier.n_features()
            ));
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    /// Full class distribution, in `classes()` order
    pub fn predict_proba(&self, text: &str) -> Vec<f64> {
        let row = self.vectorizer.transform(text);
        self.classifier.predict_proba_sparse(&row)
    }
}

impl DefectClassifier for TextPipeline {
    fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    fn classify_with_confidence(&self, text: &str) -> ScoredLabel {
        let probabilities = self.predict_proba(text);
        self.classifier.scored(&probabilities)
    }
}

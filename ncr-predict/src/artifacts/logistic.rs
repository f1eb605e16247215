//! Logistic-regression model artifact
//!
//! Exported as `{classes, coef, intercept}`. Multi-class models carry one
//! coefficient row per class and use softmax. Binary models carry a single
//! row scoring the second class and use the logistic sigmoid.

use crate::types::{FeatureVector, LabelClassifier, PipelineError, ScoredLabel};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Deserialize)]
struct LogisticSpec {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

/// Fitted linear classifier with probabilistic output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "LogisticSpec")]
pub struct LogisticModel {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

impl TryFrom<LogisticSpec> for LogisticModel {
    type Error = String;

    fn try_from(spec: LogisticSpec) -> Result<Self, Self::Error> {
        Self::new(spec.classes, spec.coef, spec.intercept)
    }
}

impl LogisticModel {
    /// Build and validate a model
    ///
    /// # Errors
    /// Returns a description of the first shape or content problem found.
    pub fn new(
        classes: Vec<String>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    ) -> Result<Self, String> {
        if classes.len() < 2 {
            return Err(format!("expected at least 2 classes, got {}", classes.len()));
        }

        let mut seen = HashSet::new();
        for class in &classes {
            if class.trim().is_empty() {
                return Err("empty class label".to_string());
            }
            if !seen.insert(class.as_str()) {
                return Err(format!("duplicate class label '{}'", class));
            }
        }

        let expected_rows = if classes.len() == 2 { 1 } else { classes.len() };
        if coef.len() != expected_rows {
            return Err(format!(
                "expected {} coefficient rows for {} classes, got {}",
                expected_rows,
                classes.len(),
                coef.len()
            ));
        }
        if intercept.len() != expected_rows {
            return Err(format!(
                "expected {} intercepts, got {}",
                expected_rows,
                intercept.len()
            ));
        }

        let width = coef[0].len();
        if width == 0 {
            return Err("coefficient rows are empty".to_string());
        }
        if coef.iter().any(|row| row.len() != width) {
            return Err("coefficient rows have differing widths".to_string());
        }
        if coef.iter().flatten().chain(&intercept).any(|v| !v.is_finite()) {
            return Err("non-finite coefficient".to_string());
        }

        Ok(Self {
            classes,
            coef,
            intercept,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of input features
    pub fn n_features(&self) -> usize {
        self.coef[0].len()
    }

    /// Class probabilities for a dense input
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let scores = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| b + row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>())
            .collect();
        self.link(scores)
    }

    /// Class probabilities for a sparse input of `(column, value)` pairs
    pub fn predict_proba_sparse(&self, x: &[(usize, f64)]) -> Vec<f64> {
        let scores = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| {
                b + x
                    .iter()
                    .map(|(i, v)| row.get(*i).copied().unwrap_or(0.0) * v)
                    .sum::<f64>()
            })
            .collect();
        self.link(scores)
    }

    /// Most probable class index and its probability (first index wins ties)
    pub fn best(probabilities: &[f64]) -> (usize, f64) {
        probabilities
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bp), (i, p)| {
                if p > bp {
                    (i, p)
                } else {
                    (bi, bp)
                }
            })
    }

    /// Scored label for a probability vector from this model
    pub fn scored(&self, probabilities: &[f64]) -> ScoredLabel {
        let (index, p) = Self::best(probabilities);
        ScoredLabel::new(self.classes[index].clone(), p as f32)
    }

    fn link(&self, scores: Vec<f64>) -> Vec<f64> {
        if self.classes.len() == 2 {
            let p1 = sigmoid(scores[0]);
            return vec![1.0 - p1, p1];
        }
        softmax(scores)
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: Vec<f64>) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

impl LabelClassifier for LogisticModel {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn input_width(&self) -> usize {
        self.n_features()
    }

    fn predict_scored(&self, features: &FeatureVector) -> Result<ScoredLabel, PipelineError> {
        if features.len() != self.n_features() {
            return Err(PipelineError::Invariant(format!(
                "feature width {} does not match model width {}",
                features.len(),
                self.n_features()
            )));
        }
        let probabilities = self.predict_proba(features.as_slice());
        Ok(self.scored(&probabilities))
    }
}

//! One-hot categorical encoder artifact
//!
//! Exported as `{"categories": [[field 0 labels...], [field 1 labels...]]}`.
//! The output is the concatenation of one indicator block per field. Unseen
//! categories are not tolerated: the cascade only ever feeds labels produced
//! by upstream models, so a miss means the artifacts disagree.

use crate::types::{CategoricalEncoder, FeatureVector, PipelineError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
struct OneHotSpec {
    categories: Vec<Vec<String>>,
}

/// Fitted one-hot encoder over a fixed tuple of fields
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "OneHotSpec")]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
    #[serde(skip)]
    offsets: Vec<usize>,
    #[serde(skip)]
    index: Vec<HashMap<String, usize>>,
}

impl TryFrom<OneHotSpec> for OneHotEncoder {
    type Error = String;

    fn try_from(spec: OneHotSpec) -> Result<Self, Self::Error> {
        Self::new(spec.categories)
    }
}

impl OneHotEncoder {
    /// Build an encoder from per-field category lists
    ///
    /// # Errors
    /// Returns a description if there are no fields, a field is empty, or a
    /// field lists the same category twice.
    pub fn new(categories: Vec<Vec<String>>) -> Result<Self, String> {
        if categories.is_empty() {
            return Err("encoder has no fields".to_string());
        }

        let mut offsets = Vec::with_capacity(categories.len());
        let mut index = Vec::with_capacity(categories.len());
        let mut offset = 0;

        for (field, labels) in categories.iter().enumerate() {
            if labels.is_empty() {
                return Err(format!("field {} has no categories", field));
            }
            let mut lookup = HashMap::with_capacity(labels.len());
            for (i, label) in labels.iter().enumerate() {
                if lookup.insert(label.clone(), i).is_some() {
                    return Err(format!("field {} lists '{}' twice", field, label));
                }
            }
            offsets.push(offset);
            index.push(lookup);
            offset += labels.len();
        }

        Ok(Self {
            categories,
            offsets,
            index,
        })
    }
}

impl CategoricalEncoder for OneHotEncoder {
    fn arity(&self) -> usize {
        self.categories.len()
    }

    fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    fn categories(&self, field: usize) -> Option<&[String]> {
        self.categories.get(field).map(Vec::as_slice)
    }

    fn encode(&self, fields: &[&str]) -> Result<FeatureVector, PipelineError> {
        if fields.len() != self.arity() {
            return Err(PipelineError::Invariant(format!(
                "encoder expects {} fields, got {}",
                self.arity(),
                fields.len()
            )));
        }

        let mut features = FeatureVector::zeros(self.width());
        for (field, value) in fields.iter().enumerate() {
            let position = self.index[field].get(*value).ok_or_else(|| {
                PipelineError::Invariant(format!(
                    "category '{}' unknown to encoder field {}",
                    value, field
                ))
            })?;
            features.as_mut_slice()[self.offsets[field] + position] = 1.0;
        }
        Ok(features)
    }
}

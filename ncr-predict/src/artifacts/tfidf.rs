//! TF-IDF vectorizer artifact
//!
//! Tokens are runs of two or more word characters on lower-cased text.
//! Word n-grams in `ngram_range` are joined with single spaces and looked up
//! in the fitted vocabulary. Term counts (optionally `1 + ln(tf)`) are scaled
//! by IDF and the row is L2-normalized.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

/// Row normalization applied after IDF weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

#[derive(Debug, Clone, Deserialize)]
struct TfidfSpec {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Norm,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TfidfSpec")]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    sublinear_tf: bool,
    norm: Norm,
}

impl TryFrom<TfidfSpec> for TfidfVectorizer {
    type Error = String;

    fn try_from(spec: TfidfSpec) -> Result<Self, Self::Error> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(format!("invalid ngram_range ({}, {})", min_n, max_n));
        }
        if spec.idf.is_empty() {
            return Err("idf vector is empty".to_string());
        }
        if spec.idf.iter().any(|w| !w.is_finite()) {
            return Err("non-finite idf weight".to_string());
        }
        if let Some((term, index)) = spec
            .vocabulary
            .iter()
            .find(|(_, &index)| index >= spec.idf.len())
        {
            return Err(format!(
                "vocabulary term '{}' maps to column {} beyond idf width {}",
                term,
                index,
                spec.idf.len()
            ));
        }

        Ok(Self {
            vocabulary: spec.vocabulary,
            idf: spec.idf,
            ngram_range: spec.ngram_range,
            sublinear_tf: spec.sublinear_tf,
            norm: spec.norm,
        })
    }
}

impl TfidfVectorizer {
    /// Number of output columns
    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Word tokens of `text`, lower-cased
    pub fn tokenize(text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        TOKEN
            .find_iter(&lowered)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Sparse TF-IDF row as `(column, weight)` pairs sorted by column
    pub fn transform(&self, text: &str) -> Vec<(usize, f64)> {
        let tokens = Self::tokenize(text);
        let (min_n, max_n) = self.ngram_range;

        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(&column) = self.vocabulary.get(&term) {
                    *counts.entry(column).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut row: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(column, tf)| {
                let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
                (column, tf * self.idf[column])
            })
            .collect();

        if self.norm == Norm::L2 {
            let length = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if length > 0.0 {
                for (_, w) in row.iter_mut() {
                    *w /= length;
                }
            }
        }

        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(json: &str) -> TfidfVectorizer {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_tokenize_drops_single_characters() {
        assert_eq!(
            TfidfVectorizer::tokenize("A dent on rib-3 x"),
            vec!["dent", "on", "rib"]
        );
    }

    #[test]
    fn test_transform_l2_normalized() {
        let v = vectorizer(r#"{"vocabulary":{"scratch":0,"dent":1},"idf":[1.0,1.0]}"#);
        let row = v.transform("scratch dent");
        assert_eq!(row.len(), 2);
        let expected = 1.0 / 2f64.sqrt();
        assert!((row[0].1 - expected).abs() < 1e-12);
        assert!((row[1].1 - expected).abs() < 1e-12);
    }

    #[test]
    fn test_transform_counts_and_idf() {
        let v = vectorizer(
            r#"{"vocabulary":{"scratch":0,"dent":1},"idf":[2.0,1.0],"norm":"none"}"#,
        );
        let row = v.transform("scratch scratch dent unseen");
        assert_eq!(row, vec![(0, 4.0), (1, 1.0)]);
    }

    #[test]
    fn test_sublinear_tf() {
        let v = vectorizer(
            r#"{"vocabulary":{"scratch":0},"idf":[1.0],"sublinear_tf":true,"norm":"none"}"#,
        );
        let row = v.transform("scratch scratch");
        assert!((row[0].1 - (1.0 + 2f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn test_bigrams() {
        let v = vectorizer(
            r#"{"vocabulary":{"out":0,"of tolerance":1},"idf":[1.0,1.0],"ngram_range":[1,2],"norm":"none"}"#,
        );
        let row = v.transform("out of tolerance");
        assert_eq!(row, vec![(0, 1.0), (1, 1.0)]);
    }

    #[test]
    fn test_no_known_terms_is_empty_row() {
        let v = vectorizer(r#"{"vocabulary":{"scratch":0},"idf":[1.0]}"#);
        assert!(v.transform("completely unrelated words").is_empty());
    }

    #[test]
    fn test_rejects_out_of_range_vocabulary() {
        let result = serde_json::from_str::<TfidfVectorizer>(
            r#"{"vocabulary":{"scratch":3},"idf":[1.0]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_bad_ngram_range() {
        let result = serde_json::from_str::<TfidfVectorizer>(
            r#"{"vocabulary":{},"idf":[1.0],"ngram_range":[2,1]}"#,
        );
        assert!(result.is_err());
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::{read_json, TextVectorizer};
use crate::error::ModelError;

/// Tokens of two or more word characters
static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\w\w+\b").unwrap()
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    None,
}

/// TF-IDF text vectorizer with a fixed vocabulary
///
/// Produces a dense vector with one component per vocabulary entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Norm,
}

fn default_lowercase() -> bool {
    true
}

impl TfidfVectorizer {
    /// Loads and validates a vectorizer exported as JSON
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let vectorizer: Self = read_json(path)?;
        vectorizer.validate()?;
        info!(
            "Loaded TF-IDF vectorizer with {} terms from {}",
            vectorizer.vocabulary.len(),
            path.display()
        );
        Ok(vectorizer)
    }

    /// Decodes and validates a vectorizer from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let vectorizer: Self = serde_json::from_str(json).map_err(ModelError::Decode)?;
        vectorizer.validate()?;
        Ok(vectorizer)
    }

    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    fn validate(&self) -> Result<(), ModelError> {
        if let Some((term, index)) = self.vocabulary.iter().find(|(_, index)| **index >= self.idf.len()) {
            return Err(ModelError::Invalid(format!(
                "term '{}' maps to column {} but only {} idf weights exist",
                term,
                index,
                self.idf.len()
            )));
        }
        Ok(())
    }
}

impl TextVectorizer for TfidfVectorizer {
    fn transform(&self, text: &str) -> Result<Vec<f64>, ModelError> {
        if self.idf.is_empty() {
            return Err(ModelError::Vectorize("vectorizer has an empty vocabulary".to_string()));
        }

        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut values: Vec<f64> = vec![0.0; self.idf.len()];
        for token in TOKEN_REGEX.find_iter(&text) {
            if let Some(slot) = self.vocabulary.get(token.as_str()).and_then(|&i| values.get_mut(i)) {
                *slot += 1.0;
            }
        }

        for (value, idf) in values.iter_mut().zip(&self.idf) {
            if *value > 0.0 {
                let tf = if self.sublinear_tf { 1.0 + value.ln() } else { *value };
                *value = tf * idf;
            }
        }

        if self.norm == Norm::L2 {
            let length = values.iter().map(|v| v * v).sum::<f64>().sqrt();
            if length > 0.0 {
                values.iter_mut().for_each(|v| *v /= length);
            }
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VECTORIZER: &str = r#"{
        "vocabulary": {"https": 0, "login": 1, "example": 2, "com": 3},
        "idf": [1.0, 2.0, 1.5, 1.0]
    }"#;

    #[test]
    fn test_transform_l2_normalized() {
        let vectorizer = TfidfVectorizer::from_json(VECTORIZER).unwrap();
        let values = vectorizer.transform("https://LOGIN.example.com/login").unwrap();

        assert_eq!(values.len(), 4);
        // Raw weights: https 1, login 2*2, example 1.5, com 1
        let norm = (1.0f64 + 16.0 + 2.25 + 1.0).sqrt();
        let expected = [1.0 / norm, 4.0 / norm, 1.5 / norm, 1.0 / norm];
        for (got, want) in values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_transform_without_norm_and_sublinear() {
        let json = r#"{
            "vocabulary": {"login": 0, "ab": 1},
            "idf": [2.0, 3.0],
            "lowercase": false,
            "sublinear_tf": true,
            "norm": "none"
        }"#;
        let vectorizer = TfidfVectorizer::from_json(json).unwrap();
        let values = vectorizer.transform("login login LOGIN a b").unwrap();

        assert!((values[0] - (1.0 + 2f64.ln()) * 2.0).abs() < 1e-12);
        // Single characters are not tokens
        assert_eq!(values[1], 0.0);
    }

    #[test]
    fn test_unknown_text_is_zero_vector() {
        let vectorizer = TfidfVectorizer::from_json(VECTORIZER).unwrap();
        assert_eq!(vectorizer.transform("zzz qqq").unwrap(), vec![0.0; 4]);
    }

    #[test]
    fn test_empty_vocabulary_fails_transform() {
        let vectorizer = TfidfVectorizer::from_json(r#"{"vocabulary": {}, "idf": []}"#).unwrap();
        assert!(matches!(vectorizer.transform("https://example.com"), Err(ModelError::Vectorize(_))));
    }

    #[test]
    fn test_rejects_out_of_range_vocabulary() {
        let json = r#"{"vocabulary": {"a": 3}, "idf": [1.0]}"#;
        assert!(matches!(TfidfVectorizer::from_json(json), Err(ModelError::Invalid(_))));
    }
}

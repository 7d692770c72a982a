use serde::Serialize;

use super::layout::{feature_index, FEATURE_COUNT};

/// Fixed-width numeric input of the URL classifier
///
/// Components follow `FEATURE_LAYOUT`. A vector whose every component is
/// `INVALID_SENTINEL` stands for a URL that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub const INVALID_SENTINEL: f64 = -1.0;

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// The all-sentinel vector produced for invalid URLs
    pub fn invalid() -> Self {
        Self::from_values([Self::INVALID_SENTINEL; FEATURE_COUNT])
    }

    pub fn is_invalid(&self) -> bool {
        self.values.iter().all(|&v| v == Self::INVALID_SENTINEL)
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.get(i))
    }
}

//! Inference dependencies of the classifier.
//!
//! Both models are trained offline and exported as JSON; the service only
//! evaluates them. They are loaded once at startup and shared read-only.

pub mod ensemble;
pub mod tfidf;

use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ModelError;
use crate::features::FeatureVector;

pub use ensemble::TreeEnsemble;
pub use tfidf::TfidfVectorizer;

/// A trained classifier mapping a feature vector to an integer label
pub trait LabelPredictor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<i64, ModelError>;
}

/// A text model turning raw URL text into a numeric vector
pub trait TextVectorizer: Send + Sync {
    fn transform(&self, text: &str) -> Result<Vec<f64>, ModelError>;
}

// Reads and decodes a JSON model artefact
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ModelError> {
    debug!("Loading model artefact from {}", path.display());
    let raw = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ModelError::Format {
        path: path.to_path_buf(),
        source,
    })
}

//! URL feature extraction for the classifier.

pub mod entropy;
pub mod extractor;
pub mod layout;
pub mod vector;

pub use entropy::shannon_entropy;
pub use extractor::extract_features;
pub use layout::{FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::FeatureVector;

//! Error types for URL parsing, redirect resolution and model inference.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decomposing a URL into its domain parts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UrlError {
    /// Input was empty or whitespace.
    #[error("URL cannot be empty")]
    Empty,

    /// The url crate rejected the input even after prefixing a scheme.
    #[error("URL parsing error: {0}")]
    Malformed(#[from] url::ParseError),

    /// The URL parsed but carries no host (e.g. `mailto:` style URIs).
    #[error("URL has no host component")]
    MissingHost,
}

/// Errors raised while following a shortener's redirect.
///
/// Never surfaced past the resolver: callers receive the `INCORRECT_URL` sentinel.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("redirect location header is not valid UTF-8")]
    InvalidLocation,
}

/// Errors raised by the classifier and text vectorizer.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode model file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode model: {0}")]
    Decode(#[source] serde_json::Error),

    /// The artefact decoded but violates a structural invariant.
    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("vectorization failed: {0}")]
    Vectorize(String),
}

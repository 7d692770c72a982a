use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of an `/analyze_url` request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl AnalyzeRequest {
    /// Extracts a usable URL from a raw request body
    ///
    /// Only a JSON object with a non-empty string `url` field qualifies;
    /// arrays, other JSON values and non-JSON bodies yield `None`.
    pub fn url_from_body(body: &[u8]) -> Option<String> {
        let value: Value = serde_json::from_slice(body).ok()?;
        let url = value.as_object()?.get("url")?.as_str()?;
        if url.trim().is_empty() {
            return None;
        }
        Some(url.to_string())
    }
}

/// Successful classification
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub url: String,      // URL after shortener resolution
    pub result: String,   // Human readable verdict
}

/// Returned with status 400 when the URL fails validation
#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidResponse {
    pub result: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response for health check endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub trusted_domains: usize,
    pub shorteners: usize,
}

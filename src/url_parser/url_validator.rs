use tracing::{debug, warn};

use super::parser::{parse_domain, ParsedDomain};

/// Outcome of validating a URL for classification
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub is_valid: bool,
    /// The normalized URL when parsing succeeded, otherwise the input unchanged
    pub url: String,
    pub parsed: Option<ParsedDomain>,
}

/// Validates that a URL resolves to a host with a known public suffix
///
/// Scheme-less input is normalized to `https://<host><path>`. Parsing failures
/// never propagate: they yield an invalid result carrying the original URL.
///
/// # Arguments
/// * `url` - The URL to validate
///
/// # Returns
/// * `Validation` - Validity flag, normalized URL and the parsed parts
pub fn validate_url(url: &str) -> Validation {
    let parsed = match parse_domain(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Rejected URL '{}': {}", url, e);
            return Validation {
                is_valid: false,
                url: url.to_string(),
                parsed: None,
            };
        }
    };

    let normalized = if parsed.scheme.is_none() {
        format!("https://{}{}", parsed.host, parsed.path)
    } else {
        url.to_string()
    };

    let is_valid = parsed.has_suffix();
    debug!("Validated '{}' as {} (normalized: {})", url, if is_valid { "valid" } else { "invalid" }, normalized);

    Validation {
        is_valid,
        url: normalized,
        parsed: Some(parsed),
    }
}

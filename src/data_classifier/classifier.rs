use std::collections::HashSet;
use tracing::{debug, trace};

use super::Verdict;
use crate::url_parser::parse_domain;

/// Registrable domains that are always considered safe
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "google.com", "wikipedia.org", "netflix.com", "microsoft.com", "youtube.com", "sxccal.edu",
    "facebook.com", "amazon.com", "amazon.in", "chatgpt.com", "openai.com", "claude.ai",
];

/// Payment URIs starting with this prefix are always considered safe
pub const UPI_PREFIX: &str = "upi://pay";

/// Pre-model override rules for known-good destinations
///
/// A decision from this policy is authoritative: the model is not consulted.
#[derive(Debug, Clone)]
pub struct TrustPolicy {
    trusted_domains: HashSet<String>,
    payment_prefix: String,
}

impl Default for TrustPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_DOMAINS.iter().copied(), UPI_PREFIX)
    }
}

impl TrustPolicy {
    pub fn new<I, S>(trusted_domains: I, payment_prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            trusted_domains: trusted_domains
                .into_iter()
                .map(|d| d.as_ref().trim().trim_matches('.').to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
            payment_prefix: payment_prefix.into(),
        }
    }

    pub fn trusted_domains(&self) -> &HashSet<String> {
        &self.trusted_domains
    }

    pub fn payment_prefix(&self) -> &str {
        &self.payment_prefix
    }

    /// Whether a registrable domain equals a trusted entry or sits under one
    ///
    /// Matching is anchored on a label boundary, so `evil-google.com` does
    /// not match `google.com`.
    pub fn is_trusted_domain(&self, registrable: &str) -> bool {
        let registrable = registrable.to_lowercase();
        self.trusted_domains.iter().any(|trusted| {
            registrable == *trusted
                || (registrable.len() > trusted.len()
                    && registrable.ends_with(trusted.as_str())
                    && registrable.as_bytes()[registrable.len() - trusted.len() - 1] == b'.')
        })
    }

    /// Returns `Some(Verdict::Safe)` for trusted domains and payment URIs, `None` otherwise
    ///
    /// # Arguments
    /// * `url` - The resolved URL
    ///
    /// # Returns
    /// * `Option<Verdict>` - The forced verdict, or None to defer to the model
    pub fn classify(&self, url: &str) -> Option<Verdict> {
        let registrable = parse_domain(url)
            .ok()
            .and_then(|parsed| parsed.registrable_domain());

        if let Some(registrable) = registrable {
            trace!("Checking registrable domain {} against trust list", registrable);
            if self.is_trusted_domain(&registrable) {
                debug!("Trusted domain {} overrides the model", registrable);
                return Some(Verdict::Safe);
            }
        }

        if url.starts_with(&self.payment_prefix) {
            debug!("Payment URI overrides the model: {}", url);
            return Some(Verdict::Safe);
        }

        None
    }
}

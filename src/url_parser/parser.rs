use psl::{List, Psl};
use std::net::IpAddr;
use tracing::{debug, trace, instrument};
use url::{Host, Url};

use crate::error::UrlError;

/// A URL decomposed around its public suffix
///
/// `suffix` is non-empty only when the host ends in a suffix listed in the
/// ICANN section of the Public Suffix List; an empty suffix marks the URL as
/// structurally invalid for classification.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedDomain {
    pub scheme: Option<String>, // None when the input carried no scheme
    pub host: String,           // Lower-cased host, trailing root dot removed
    pub subdomain: String,      // Labels left of the registrable label
    pub domain: String,         // Registrable label (second-level label)
    pub suffix: String,         // Public suffix, possibly multi-label ("co.uk")
    pub path: String,
}

impl ParsedDomain {
    /// Whether the host resolved to a known public suffix
    pub fn has_suffix(&self) -> bool {
        !self.suffix.is_empty()
    }

    /// Returns `domain.suffix`, or None when either part is missing
    pub fn registrable_domain(&self) -> Option<String> {
        if self.domain.is_empty() || self.suffix.is_empty() {
            return None;
        }
        Some(format!("{}.{}", self.domain, self.suffix))
    }

    /// Subdomain, domain and suffix joined with dots, skipping empty parts
    pub fn full_domain(&self) -> String {
        [self.subdomain.as_str(), self.domain.as_str(), self.suffix.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Parses a raw URL into scheme, subdomain, registrable label, suffix and path
///
/// Inputs without a scheme (`example.co.uk/login`, `localhost:8080`) are
/// re-parsed with an `https://` prefix. An unknown suffix is not an error:
/// the result simply carries an empty `suffix`.
///
/// # Arguments
/// * `raw` - The URL as received from the caller
///
/// # Returns
/// * `Result<ParsedDomain, UrlError>` - The decomposed URL, or an error when no host can be found
#[instrument(level = "trace", skip_all, fields(url = %raw))]
pub fn parse_domain(raw: &str) -> Result<ParsedDomain, UrlError> {
    let input = raw.trim();
    if input.is_empty() {
        return Err(UrlError::Empty);
    }

    let (scheme, parsed) = parse_with_scheme_fallback(input)?;

    let host = match parsed.host() {
        Some(Host::Domain(domain)) => domain.trim_end_matches('.').to_lowercase(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        None => return Err(UrlError::MissingHost),
    };
    if host.is_empty() {
        return Err(UrlError::MissingHost);
    }

    let (subdomain, domain, suffix) = if host.parse::<IpAddr>().is_ok() {
        trace!("Host {} is an IP literal", host);
        (String::new(), host.clone(), String::new())
    } else {
        split_host(&host)
    };

    debug!(
        "Parsed host {} into subdomain='{}' domain='{}' suffix='{}'",
        host, subdomain, domain, suffix
    );

    Ok(ParsedDomain {
        scheme,
        path: parsed.path().to_string(),
        host,
        subdomain,
        domain,
        suffix,
    })
}

// Parse as-is first; fall back to an https:// prefix when no scheme is present
fn parse_with_scheme_fallback(input: &str) -> Result<(Option<String>, Url), UrlError> {
    match Url::parse(input) {
        Ok(url) if url.host_str().is_some() => Ok((Some(url.scheme().to_string()), url)),
        // "localhost:8080" parses with "localhost" as the scheme and no host
        Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) if !input.contains("://") => {
            trace!("No scheme in '{}', retrying with https://", input);
            let url = Url::parse(&format!("https://{}", input))?;
            Ok((None, url))
        }
        Ok(_) => Err(UrlError::MissingHost),
        Err(e) => Err(e.into()),
    }
}

/// Splits a host into (subdomain, domain, suffix)
///
/// Without a known suffix the last label becomes the domain and the rest the
/// subdomain, leaving the suffix empty.
pub(crate) fn split_host(host: &str) -> (String, String, String) {
    match icann_suffix(host) {
        Some(suffix) => {
            let rest = host[..host.len() - suffix.len()].trim_end_matches('.');
            let (subdomain, domain) = rest.rsplit_once('.').unwrap_or(("", rest));
            (subdomain.to_string(), domain.to_string(), suffix)
        }
        None => {
            let (subdomain, domain) = host.rsplit_once('.').unwrap_or(("", host));
            (subdomain.to_string(), domain.to_string(), String::new())
        }
    }
}

// Longest ICANN suffix of `host`. Private-section entries ("github.io") are
// walked back label by label to the ICANN suffix that encloses them.
fn icann_suffix(host: &str) -> Option<String> {
    let mut candidate = host;
    loop {
        let suffix = List.suffix(candidate.as_bytes())?;
        if !suffix.is_known() {
            return None;
        }
        let text = &candidate[candidate.len() - suffix.as_bytes().len()..];
        if suffix.typ() != Some(psl::Type::Private) {
            return Some(text.to_string());
        }
        let (_, parent) = text.split_once('.')?;
        candidate = parent;
    }
}

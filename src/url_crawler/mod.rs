use reqwest::{
    header::{HeaderMap, HeaderValue, LOCATION, USER_AGENT},
    redirect::Policy,
    Client, Response,
};
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::error::ResolveError;
use crate::url_parser::parse_domain;

/// Sentinel returned when a shortened URL could not be resolved
pub const INCORRECT_URL: &str = "INCORRECT_URL";

// Constants for resolver configuration
const MAX_REDIRECTS: usize = 10;
const REQUEST_TIMEOUT: u64 = 10; // seconds
const REDIRECT_STATUSES: [u16; 5] = [301, 302, 303, 307, 308];

/// Host fragments of well-known URL shortening services
pub const DEFAULT_SHORTENERS: &[&str] = &[
    "tinyurl", "bit.ly", "goo.gl", "t.co", "ow.ly", "is.gd", "buff.ly", "shorte.st",
];

/// Configuration for shortener detection and redirect resolution
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Substrings matched against the URL host
    pub shorteners: Vec<String>,
    /// Timeout applied to each of the HEAD and GET attempts
    pub request_timeout: Duration,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl ResolverConfig {
    /// Creates a new resolver configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shortener host fragments
    ///
    /// Blank entries are dropped: an empty fragment would match every host.
    pub fn with_shorteners<I, S>(mut self, shorteners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shorteners = shorteners
            .into_iter()
            .map(|s| s.into().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// Sets the per-attempt request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the maximum number of redirect hops the transport follows
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Sets the user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            shorteners: DEFAULT_SHORTENERS.iter().map(|s| s.to_string()).collect(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT),
            max_redirects: MAX_REDIRECTS,
            user_agent: "PhishScan/1.0".to_string(),
        }
    }
}

/// Expands shortened URLs to their destination
///
/// URLs whose host matches no shortener fragment are returned untouched
/// without any network traffic. Shortened URLs get a HEAD probe first and a
/// redirect-following GET if the probe yields no redirect location.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    config: ResolverConfig,
    head_client: Client,
    get_client: Client,
}

impl RedirectResolver {
    /// Builds the HTTP clients for the given configuration
    ///
    /// # Arguments
    /// * `config` - Resolver configuration
    ///
    /// # Returns
    /// * `Result<RedirectResolver, ResolveError>` - The resolver, or an error if a client cannot be built
    pub fn new(config: ResolverConfig) -> Result<Self, ResolveError> {
        debug!(
            "Initializing redirect resolver: {} shorteners, timeout={:?}, max_redirects={}",
            config.shorteners.len(),
            config.request_timeout,
            config.max_redirects
        );

        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.user_agent) {
            headers.insert(USER_AGENT, value);
        } else {
            warn!("Invalid user agent string '{}', sending none", config.user_agent);
        }

        // The probe stops in front of non-HTTP targets (upi://, intent://) so
        // their Location header can be reported instead of failing the fetch
        let max_redirects = config.max_redirects;
        let probe_policy = Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                attempt.error("too many redirects")
            } else if matches!(attempt.url().scheme(), "http" | "https") {
                attempt.follow()
            } else {
                attempt.stop()
            }
        });

        let head_client = Client::builder()
            .redirect(probe_policy)
            .timeout(config.request_timeout)
            .default_headers(headers.clone())
            .build()
            .map_err(ResolveError::Client)?;

        let get_client = Client::builder()
            .redirect(Policy::limited(config.max_redirects))
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(ResolveError::Client)?;

        Ok(Self {
            config,
            head_client,
            get_client,
        })
    }

    /// Returns the active configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether the URL's host contains any configured shortener fragment
    pub fn is_shortened(&self, url: &str) -> bool {
        self.fetch_target(url).is_some()
    }

    // URL to fetch when the host is a shortener; scheme-less input gets https://
    fn fetch_target(&self, url: &str) -> Option<String> {
        let parsed = parse_domain(url).ok()?;
        let shortener = self
            .config
            .shorteners
            .iter()
            .find(|fragment| parsed.host.contains(fragment.as_str()))?;
        trace!("Host {} matches shortener '{}'", parsed.host, shortener);

        match parsed.scheme {
            Some(_) => Some(url.trim().to_string()),
            None => Some(format!("https://{}", url.trim())),
        }
    }

    /// Resolves a possibly shortened URL to its final destination
    ///
    /// Network failures are logged and collapsed into [`INCORRECT_URL`].
    ///
    /// # Arguments
    /// * `url` - The URL as received from the caller
    ///
    /// # Returns
    /// * `String` - The destination URL, the input unchanged, or `INCORRECT_URL`
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn resolve(&self, url: &str) -> String {
        let Some(target) = self.fetch_target(url) else {
            trace!("No shortener host, skipping resolution");
            return url.to_string();
        };

        match self.try_resolve(&target).await {
            Ok(resolved) => {
                info!("Resolved shortened URL {} -> {}", url, resolved);
                resolved
            }
            Err(e) => {
                warn!("Failed to resolve shortened URL {}: {}", url, e);
                INCORRECT_URL.to_string()
            }
        }
    }

    /// Performs the HEAD probe and GET fallback against a shortener URL
    ///
    /// # Arguments
    /// * `url` - Absolute URL of the shortener link
    ///
    /// # Returns
    /// * `Result<String, ResolveError>` - The destination URL or the network error
    pub async fn try_resolve(&self, url: &str) -> Result<String, ResolveError> {
        debug!("Sending HEAD request to {}", url);
        let head = self
            .head_client
            .head(url)
            .send()
            .await
            .map_err(|source| request_error(url, source))?;

        debug!("HEAD response status: {}", head.status());
        if let Some(location) = redirect_location(&head)? {
            debug!("Found redirect location: {}", location);
            return Ok(location);
        }

        debug!("No redirect location from HEAD, falling back to GET for {}", url);
        let get = self
            .get_client
            .get(url)
            .send()
            .await
            .map_err(|source| request_error(url, source))?;

        debug!("GET finished at {} with status {}", get.url(), get.status());
        Ok(get.url().to_string())
    }
}

// Location header of a redirect response, made absolute against the response URL
fn redirect_location(resp: &Response) -> Result<Option<String>, ResolveError> {
    if !REDIRECT_STATUSES.contains(&resp.status().as_u16()) {
        return Ok(None);
    }
    let Some(location) = resp.headers().get(LOCATION) else {
        warn!("Redirect status {} without Location header at {}", resp.status(), resp.url());
        return Ok(None);
    };
    let location = location.to_str().map_err(|e| {
        error!("Invalid redirect location header: {}", e);
        ResolveError::InvalidLocation
    })?;

    match resp.url().join(location) {
        Ok(absolute) => Ok(Some(absolute.to_string())),
        Err(e) => {
            trace!("Could not join location '{}' onto {}: {}", location, resp.url(), e);
            Ok(Some(location.to_string()))
        }
    }
}

fn request_error(url: &str, source: reqwest::Error) -> ResolveError {
    error!("Request to {} failed: {}", url, source);
    ResolveError::Request {
        url: url.to_string(),
        source,
    }
}

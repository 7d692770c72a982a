use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::data_classifier::classifier::{TrustPolicy, DEFAULT_TRUSTED_DOMAINS, UPI_PREFIX};
use crate::url_crawler::{ResolverConfig, DEFAULT_SHORTENERS};

/// Config file read when no path is given on the command line
pub const DEFAULT_CONFIG_FILE: &str = "phishscan.toml";

/// Prefix of environment overrides, e.g. `PHISHSCAN__SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "PHISHSCAN";

/// Service configuration, immutable once loaded
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub models: ModelSettings,
    pub policy: PolicySettings,
    pub resolver: ResolverSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to
    pub host: String,

    pub port: u16,

    /// Directory receiving the log files
    pub log_dir: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_dir: "logs".to_string(),
        }
    }
}

/// Locations of the exported inference models
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub classifier_path: PathBuf,
    pub vectorizer_path: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            classifier_path: PathBuf::from("models/url_classifier.json"),
            vectorizer_path: PathBuf::from("models/tfidf_vectorizer.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub trusted_domains: Vec<String>,
    pub shorteners: Vec<String>,
    pub payment_prefix: String,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            trusted_domains: DEFAULT_TRUSTED_DOMAINS.iter().map(|d| d.to_string()).collect(),
            shorteners: DEFAULT_SHORTENERS.iter().map(|s| s.to_string()).collect(),
            payment_prefix: UPI_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        let defaults = ResolverConfig::default();
        Self {
            timeout_secs: defaults.request_timeout.as_secs(),
            max_redirects: defaults.max_redirects,
            user_agent: defaults.user_agent,
        }
    }
}

impl Settings {
    /// Loads settings from defaults, an optional TOML file and the environment
    ///
    /// An explicitly given file must exist; the default file is optional.
    ///
    /// # Arguments
    /// * `path` - Config file given on the command line, if any
    ///
    /// # Returns
    /// * `Result<Settings>` - The merged settings or a load error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        debug!("Loading settings from {} (required: {})", file.display(), path.is_some());

        let settings = Config::builder()
            .add_source(File::from(file).required(path.is_some()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", file.display()))?
            .try_deserialize::<Settings>()
            .context("Failed to deserialize configuration")?;

        Ok(settings)
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::new()
            .with_shorteners(self.policy.shorteners.iter().cloned())
            .with_request_timeout(Duration::from_secs(self.resolver.timeout_secs))
            .with_max_redirects(self.resolver.max_redirects)
            .with_user_agent(self.resolver.user_agent.clone())
    }

    pub fn trust_policy(&self) -> TrustPolicy {
        TrustPolicy::new(&self.policy.trusted_domains, self.policy.payment_prefix.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.resolver.timeout_secs, 10);
        assert_eq!(settings.policy.payment_prefix, "upi://pay");
        assert!(settings.policy.trusted_domains.iter().any(|d| d == "wikipedia.org"));
        assert!(settings.trust_policy().is_trusted_domain("google.com"));
        assert_eq!(settings.resolver_config().request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_load_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("phishscan_settings_{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[policy]\ntrusted_domains = [\"example.org\"]\n\n[resolver]\ntimeout_secs = 3"
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.policy.trusted_domains, vec!["example.org".to_string()]);
        // Sections and keys missing from the file keep their defaults
        assert!(settings.policy.shorteners.iter().any(|s| s == "bit.ly"));
        assert_eq!(settings.resolver.timeout_secs, 3);
        assert_eq!(settings.resolver.max_redirects, 10);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = Settings::load(Some(Path::new("definitely/missing/phishscan.toml")));
        assert!(result.is_err());
    }
}

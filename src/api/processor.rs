use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::api::config::Settings;
use crate::data_classifier::classifier::TrustPolicy;
use crate::data_classifier::Verdict;
use crate::error::ModelError;
use crate::features::extract_features;
use crate::model::{LabelPredictor, TextVectorizer, TfidfVectorizer, TreeEnsemble};
use crate::url_crawler::RedirectResolver;
use crate::url_parser::validate_url;

/// Outcome of classifying one URL
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub resolved_url: String,
    pub verdict: Verdict,
}

/// Runs the classification pipeline: resolve, validate, override, predict
///
/// Holds only read-only state, so one instance serves all requests.
#[derive(Clone)]
pub struct UrlAnalyzer {
    resolver: RedirectResolver,
    policy: TrustPolicy,
    model: Arc<dyn LabelPredictor>,
    vectorizer: Arc<dyn TextVectorizer>,
}

impl UrlAnalyzer {
    pub fn new(
        resolver: RedirectResolver,
        policy: TrustPolicy,
        model: Arc<dyn LabelPredictor>,
        vectorizer: Arc<dyn TextVectorizer>,
    ) -> Self {
        Self {
            resolver,
            policy,
            model,
            vectorizer,
        }
    }

    /// Loads both model artefacts and builds the resolver from settings
    ///
    /// # Arguments
    /// * `settings` - Loaded service settings
    ///
    /// # Returns
    /// * `Result<UrlAnalyzer>` - Ready analyzer, or the first load error
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let model = TreeEnsemble::load(&settings.models.classifier_path)
            .context("Failed to load classifier model")?;
        let vectorizer = TfidfVectorizer::load(&settings.models.vectorizer_path)
            .context("Failed to load text vectorizer")?;
        let resolver = RedirectResolver::new(settings.resolver_config())
            .context("Failed to build redirect resolver")?;

        Ok(Self::new(
            resolver,
            settings.trust_policy(),
            Arc::new(model),
            Arc::new(vectorizer),
        ))
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    pub fn resolver(&self) -> &RedirectResolver {
        &self.resolver
    }

    /// Classifies a URL
    ///
    /// Shortened URLs are resolved first; everything after that works on
    /// the resolved URL. Trusted domains and payment URIs skip the model.
    ///
    /// # Arguments
    /// * `url` - The URL as submitted
    ///
    /// # Returns
    /// * `Result<ClassificationResult>` - Verdict with the resolved URL, or
    ///   the model error when inference itself fails
    #[instrument(skip(self), fields(url = %url))]
    pub async fn analyze(&self, url: &str) -> Result<ClassificationResult, ModelError> {
        info!("Received URL: {}", url);

        // Step 1: follow shortener redirects
        let resolved_url = self.resolver.resolve(url).await;
        if resolved_url != url {
            info!("Final URL after resolution: {}", resolved_url);
        }

        // Step 2: structural validation
        let validation = validate_url(&resolved_url);
        if !validation.is_valid {
            warn!("Invalid URL: {}", resolved_url);
            return Ok(ClassificationResult {
                resolved_url,
                verdict: Verdict::Invalid,
            });
        }

        // Step 3: trusted domains and payment URIs
        if let Some(verdict) = self.policy.classify(&resolved_url) {
            info!("Override verdict for {}: {}", resolved_url, verdict);
            return Ok(ClassificationResult {
                resolved_url,
                verdict,
            });
        }

        // Step 4: model inference
        let features = extract_features(&resolved_url, self.vectorizer.as_ref());
        debug!("Extracted {} features", features.len());
        let label = self.model.predict(&features)?;
        let verdict = Verdict::from_label(label);
        info!("Model verdict for {}: {} (label {})", resolved_url, verdict, label);

        Ok(ClassificationResult {
            resolved_url,
            verdict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::url_crawler::ResolverConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingModel {
        label: i64,
        calls: AtomicUsize,
    }

    impl LabelPredictor for CountingModel {
        fn predict(&self, _features: &FeatureVector) -> Result<i64, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.label)
        }
    }

    struct BrokenModel;

    impl LabelPredictor for BrokenModel {
        fn predict(&self, _features: &FeatureVector) -> Result<i64, ModelError> {
            Err(ModelError::Inference("tree walk did not reach a leaf".to_string()))
        }
    }

    struct ZeroVectorizer;

    impl TextVectorizer for ZeroVectorizer {
        fn transform(&self, _text: &str) -> Result<Vec<f64>, ModelError> {
            Ok(vec![0.0; 3])
        }
    }

    fn analyzer(model: Arc<dyn LabelPredictor>) -> UrlAnalyzer {
        UrlAnalyzer::new(
            RedirectResolver::new(ResolverConfig::default()).unwrap(),
            TrustPolicy::default(),
            model,
            Arc::new(ZeroVectorizer),
        )
    }

    #[tokio::test]
    async fn test_trusted_domain_skips_model() {
        let model = Arc::new(CountingModel { label: 1, calls: AtomicUsize::new(0) });
        let analyzer = analyzer(model.clone());

        let result = analyzer.analyze("https://en.wikipedia.org/wiki/Rust").await.unwrap();

        assert_eq!(result.verdict, Verdict::Safe);
        assert_eq!(result.resolved_url, "https://en.wikipedia.org/wiki/Rust");
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_payment_uri_skips_model() {
        let model = Arc::new(CountingModel { label: 1, calls: AtomicUsize::new(0) });
        let analyzer = analyzer(model.clone());

        let result = analyzer.analyze("upi://pay?pa=merchant@bank&am=10").await.unwrap();

        assert_eq!(result.verdict, Verdict::Safe);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_model_label_decides_verdict() {
        let model = Arc::new(CountingModel { label: 1, calls: AtomicUsize::new(0) });
        let result = analyzer(model.clone())
            .analyze("http://secure-login-verify.example-bank.xyz/account")
            .await
            .unwrap();
        assert_eq!(result.verdict, Verdict::Malicious);
        assert_eq!(model.calls.load(Ordering::SeqCst), 1);

        let model = Arc::new(CountingModel { label: 0, calls: AtomicUsize::new(0) });
        let result = analyzer(model).analyze("https://example.com/about").await.unwrap();
        assert_eq!(result.verdict, Verdict::Safe);
    }

    #[tokio::test]
    async fn test_invalid_url_skips_model() {
        let model = Arc::new(CountingModel { label: 1, calls: AtomicUsize::new(0) });
        let analyzer = analyzer(model.clone());

        for url in ["http://localhost:8080/x", "http://10.0.0.1/", "not a url"] {
            let result = analyzer.analyze(url).await.unwrap();
            assert_eq!(result.verdict, Verdict::Invalid, "url {}", url);
            assert_eq!(result.resolved_url, url);
        }
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inference_error_propagates() {
        let result = analyzer(Arc::new(BrokenModel)).analyze("https://example.com").await;
        assert!(matches!(result, Err(ModelError::Inference(_))));
    }

    #[test]
    fn test_from_settings_fails_without_models() {
        let mut settings = Settings::default();
        settings.models.classifier_path = "missing/url_classifier.json".into();

        assert!(UrlAnalyzer::from_settings(&settings).is_err());
    }
}

use tracing::{debug, trace, warn};

use super::entropy::shannon_entropy;
use super::layout::TEXT_FEATURE_COUNT;
use super::vector::FeatureVector;
use crate::data_classifier::patterns::{
    contains_any, DIGIT_REGEX, EXECUTABLE_EXTENSIONS, IPV4_REGEX, LETTER_REGEX, PROMO_KEYWORDS,
    REDIRECT_KEYWORD, SCRIPT_EXTENSIONS, SUSPICIOUS_KEYWORDS,
};
use crate::model::TextVectorizer;
use crate::url_parser::validate_url;

/// Builds the classifier input for a URL
///
/// The URL is validated (and normalized) first; an invalid URL yields
/// `FeatureVector::invalid()`. The function is pure apart from logging:
/// identical input and vectorizer give an identical vector.
///
/// # Arguments
/// * `url` - The URL to featurize
/// * `vectorizer` - Text vectorizer providing the last three components
///
/// # Returns
/// * `FeatureVector` - The 25 features in layout order
pub fn extract_features(url: &str, vectorizer: &dyn TextVectorizer) -> FeatureVector {
    let validation = validate_url(url);
    let parsed = match validation.parsed {
        Some(parsed) if validation.is_valid => parsed,
        _ => {
            debug!("Invalid URL '{}', returning sentinel features", url);
            return FeatureVector::invalid();
        }
    };
    let url = validation.url.as_str();
    let lower = url.to_lowercase();

    let domain = parsed.domain.to_lowercase();
    let host_rest = format!("{}{}", parsed.suffix.to_lowercase(), parsed.subdomain.to_lowercase());
    let text = text_components(url, vectorizer);

    let features = FeatureVector::from_values([
        url.chars().count() as f64,
        count(url, '.'),
        count(url, '-'),
        count(url, '@'),
        count(url, '?'),
        count(url, '='),
        count(url, '&'),
        DIGIT_REGEX.find_iter(url).count() as f64,
        LETTER_REGEX.find_iter(url).count() as f64,
        flag(url.starts_with("https")),
        flag(IPV4_REGEX.is_match(url)),
        flag(contains_any(&lower, SUSPICIOUS_KEYWORDS)),
        domain.split('.').count() as f64,
        count(url, '/'),
        flag(lower.contains(REDIRECT_KEYWORD)),
        flag(contains_any(&lower, SCRIPT_EXTENSIONS)),
        count(url, '%'),
        count(url, '+'),
        flag(contains_any(&lower, EXECUTABLE_EXTENSIONS)),
        flag(contains_any(&lower, PROMO_KEYWORDS)),
        shannon_entropy(&domain),
        shannon_entropy(&host_rest),
        text[0],
        text[1],
        text[2],
    ]);

    trace!("Extracted features for {}: {:?}", url, features.as_slice());
    features
}

// First components of the vectorization, zero-padded; zeros if it fails
fn text_components(url: &str, vectorizer: &dyn TextVectorizer) -> [f64; TEXT_FEATURE_COUNT] {
    let mut components = [0.0; TEXT_FEATURE_COUNT];
    match vectorizer.transform(url) {
        Ok(values) => {
            for (slot, value) in components.iter_mut().zip(values) {
                *slot = value;
            }
        }
        Err(e) => warn!("Text vectorization failed for {}, using zeros: {}", url, e),
    }
    components
}

fn count(url: &str, c: char) -> f64 {
    url.matches(c).count() as f64
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::features::layout::FEATURE_COUNT;

    struct FixedVectorizer(Vec<f64>);

    impl TextVectorizer for FixedVectorizer {
        fn transform(&self, _text: &str) -> Result<Vec<f64>, ModelError> {
            Ok(self.0.clone())
        }
    }

    struct FailingVectorizer;

    impl TextVectorizer for FailingVectorizer {
        fn transform(&self, _text: &str) -> Result<Vec<f64>, ModelError> {
            Err(ModelError::Vectorize("vocabulary missing".to_string()))
        }
    }

    #[test]
    fn test_lexical_features() {
        let url = "https://secure-login.example.com/verify.php?id=1&x=%20+a@b";
        let features = extract_features(url, &FixedVectorizer(vec![0.5, 0.25, 0.125]));
        let get = |name: &str| features.get_by_name(name).unwrap();

        assert_eq!(features.len(), FEATURE_COUNT);
        assert_eq!(get("url_length"), url.len() as f64);
        assert_eq!(get("dot_count"), 3.0);
        assert_eq!(get("hyphen_count"), 1.0);
        assert_eq!(get("at_count"), 1.0);
        assert_eq!(get("question_count"), 1.0);
        assert_eq!(get("equals_count"), 2.0);
        assert_eq!(get("ampersand_count"), 1.0);
        assert_eq!(get("digit_count"), 3.0);
        assert_eq!(get("uses_https"), 1.0);
        assert_eq!(get("has_ipv4"), 0.0);
        assert_eq!(get("has_suspicious_word"), 1.0);
        assert_eq!(get("domain_label_count"), 1.0);
        assert_eq!(get("slash_count"), 3.0);
        assert_eq!(get("has_redirect"), 0.0);
        assert_eq!(get("has_script_ext"), 1.0);
        assert_eq!(get("percent_count"), 1.0);
        assert_eq!(get("plus_count"), 1.0);
        assert_eq!(get("has_executable_ext"), 0.0);
        assert_eq!(get("has_promo_word"), 0.0);
        assert_eq!(get("domain_entropy"), shannon_entropy("example"));
        assert_eq!(get("host_entropy"), shannon_entropy("comsecure-login"));
        assert_eq!(&features.as_slice()[22..], &[0.5, 0.25, 0.125]);
    }

    #[test]
    fn test_non_ascii_digits_and_letters() {
        // Arabic-Indic three is a decimal digit; fractions and roman numerals are neither
        let url = "https://example.com/\u{00BD}\u{216B}\u{0663}\u{00E9}";
        let features = extract_features(url, &FixedVectorizer(vec![]));

        assert_eq!(features.get_by_name("digit_count"), Some(1.0));
        // "https", "example", "com" and the accented e
        assert_eq!(features.get_by_name("letter_count"), Some(16.0));
        assert_eq!(features.get_by_name("url_length"), Some(24.0));
    }

    #[test]
    fn test_keyword_flags_are_case_insensitive() {
        let url = "http://1.2.3.4.example.net/ReDirect/FREE/setup.EXE";
        let features = extract_features(url, &FixedVectorizer(vec![]));

        assert_eq!(features.get_by_name("uses_https"), Some(0.0));
        assert_eq!(features.get_by_name("has_ipv4"), Some(1.0));
        assert_eq!(features.get_by_name("has_redirect"), Some(1.0));
        assert_eq!(features.get_by_name("has_promo_word"), Some(1.0));
        assert_eq!(features.get_by_name("has_executable_ext"), Some(1.0));
    }

    #[test]
    fn test_invalid_url_yields_sentinel() {
        for url in ["", "http://localhost", "http://192.168.0.1/admin", "INCORRECT_URL"] {
            let features = extract_features(url, &FixedVectorizer(vec![1.0, 1.0, 1.0]));
            assert!(features.is_invalid(), "expected sentinel for {:?}", url);
            assert_eq!(features.len(), 25);
        }
    }

    #[test]
    fn test_text_components_are_padded() {
        let features = extract_features("https://example.com", &FixedVectorizer(vec![0.7]));
        assert_eq!(&features.as_slice()[22..], &[0.7, 0.0, 0.0]);

        let features = extract_features("https://example.com", &FixedVectorizer(vec![1.0, 2.0, 3.0, 4.0]));
        assert_eq!(&features.as_slice()[22..], &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_vectorizer_failure_falls_back_to_zeros() {
        let features = extract_features("https://example.com/path", &FailingVectorizer);

        assert!(!features.is_invalid());
        assert_eq!(&features.as_slice()[22..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_scheme_less_url_is_normalized() {
        let features = extract_features("example.com/a", &FixedVectorizer(vec![]));

        assert_eq!(features.get_by_name("url_length"), Some("https://example.com/a".len() as f64));
        assert_eq!(features.get_by_name("uses_https"), Some(1.0));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let url = "https://a1b2c3.weird-host.co.uk/x?y=z";
        let vectorizer = FixedVectorizer(vec![0.1, 0.2, 0.3]);
        assert_eq!(extract_features(url, &vectorizer), extract_features(url, &vectorizer));
    }
}

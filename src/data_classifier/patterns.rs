use once_cell::sync::Lazy;
use regex::Regex;

/// Dotted-quad lookalike anywhere in the URL
pub static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\.\d+\.\d+\.\d+")
        .unwrap()
});

// Matched case-insensitively against the whole URL
pub const SUSPICIOUS_KEYWORDS: &[&str] = &["login", "secure", "bank", "verify", "update"];
pub const SCRIPT_EXTENSIONS: &[&str] = &["php", "asp", "jsp"];
pub const EXECUTABLE_EXTENSIONS: &[&str] = &[".exe", ".zip", ".rar", ".apk"];
pub const PROMO_KEYWORDS: &[&str] = &["free", "offer", "win"];
pub const REDIRECT_KEYWORD: &str = "redirect";

/// Decimal digits (Unicode Nd), not fractions or roman numerals
pub static DIGIT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{Nd}").unwrap()
});

/// Letters (Unicode L*), not letter-like numerals
pub static LETTER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\p{L}").unwrap()
});

/// Whether `haystack` contains any of `needles`
pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

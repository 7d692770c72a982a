//! Feature layout for the URL classifier
//!
//! The classifier was trained on exactly this ordering. Adding, removing or
//! reordering an entry invalidates every exported model.

/// Lexical, structural and entropy features
pub const LEXICAL_FEATURE_COUNT: usize = 22;

/// Leading components of the text vectorization
pub const TEXT_FEATURE_COUNT: usize = 3;

/// Total number of features
pub const FEATURE_COUNT: usize = LEXICAL_FEATURE_COUNT + TEXT_FEATURE_COUNT;

/// Feature names in the exact order they appear in the vector
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    "url_length",          // 0
    "dot_count",           // 1
    "hyphen_count",        // 2
    "at_count",            // 3
    "question_count",      // 4
    "equals_count",        // 5
    "ampersand_count",     // 6
    "digit_count",         // 7
    "letter_count",        // 8
    "uses_https",          // 9
    "has_ipv4",            // 10
    "has_suspicious_word", // 11
    "domain_label_count",  // 12
    "slash_count",         // 13
    "has_redirect",        // 14
    "has_script_ext",      // 15
    "percent_count",       // 16
    "plus_count",          // 17
    "has_executable_ext",  // 18
    "has_promo_word",      // 19
    "domain_entropy",      // 20
    "host_entropy",        // 21: entropy of suffix + subdomain
    "text_0",              // 22
    "text_1",              // 23
    "text_2",              // 24
];

/// Position of a feature by name
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

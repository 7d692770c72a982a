pub mod patterns;
pub mod classifier;

use serde::Serialize;
use std::fmt;

/// Final label attached to a classified URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Malicious,
    Invalid,
}

impl Verdict {
    /// Maps a classifier label to a verdict: 0 is safe, anything else malicious
    pub fn from_label(label: i64) -> Self {
        if label == 0 {
            Verdict::Safe
        } else {
            Verdict::Malicious
        }
    }

    /// User-facing result string
    pub fn message(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe URL",
            Verdict::Malicious => "Malicious URL detected! Proceed with caution.",
            Verdict::Invalid => "Invalid URL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "SAFE"),
            Verdict::Malicious => write!(f, "MALICIOUS"),
            Verdict::Invalid => write!(f, "INVALID"),
        }
    }
}

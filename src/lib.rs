//! URL safe/malicious classification service.
//!
//! Shortened URLs are expanded, structurally validated, checked against a
//! trust policy and otherwise scored by a gradient-boosted tree ensemble
//! over 25 lexical and text features.

pub mod api;
pub mod data_classifier;
pub mod error;
pub mod features;
pub mod model;
pub mod url_crawler;
pub mod url_parser;
pub mod utils;

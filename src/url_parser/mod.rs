//! Public-suffix-aware URL decomposition and validation.

pub mod parser;
pub mod url_validator;


pub use parser::{parse_domain, ParsedDomain};
pub use url_validator::{validate_url, Validation};

//! URL handling module for Link-Ripper
//!
//! This module provides the href parsing rules used by the extractor,
//! the lexical path join used to rewrite relative links, and target
//! validation for callers that accept URLs from users.

mod join;
mod reference;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use join::{clean_path, path_join};
pub use reference::{parse_request_uri, RequestUri};

/// Validates a user-supplied rip target
///
/// The target must parse as a request URI, be absolute, carry a host,
/// and be accepted by the `url` crate so the fetcher can use it.
///
/// # Arguments
///
/// * `raw` - The target string as submitted
///
/// # Returns
///
/// * `Ok(Url)` - The validated target
/// * `Err(UrlError::Relative)` - The target parsed but has no scheme
/// * `Err(UrlError)` - Any other parse or validation failure
///
/// # Examples
///
/// ```
/// use link_ripper::url::parse_target;
/// use link_ripper::UrlError;
///
/// let url = parse_target("https://example.com/page").unwrap();
/// assert_eq!(url.host_str(), Some("example.com"));
///
/// assert!(matches!(parse_target("/example.html"), Err(UrlError::Relative(_))));
/// ```
pub fn parse_target(raw: &str) -> UrlResult<Url> {
    let reference = parse_request_uri(raw)?;

    if !reference.is_absolute() {
        return Err(UrlError::Relative(raw.to_string()));
    }

    if reference.host().is_empty() {
        return Err(UrlError::MissingHost(raw.to_string()));
    }

    Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))
}

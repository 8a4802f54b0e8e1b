//! Base-key derivation for execution-history bucketing
//!
//! Query-string churn and tab fragments would otherwise make every
//! variant of a shop page its own history bucket, so the walker keys
//! history by a normalized base instead of the raw URL.
//!
//! Derivation order:
//! 1. a long numeric ID token anywhere in the URL (opaque shop/therapist
//!    IDs are the most stable handle a page has)
//! 2. the detail-path root: everything through the first path segment
//!    after `/shop-detail/`
//! 3. the full URL, unchanged

use regex::Regex;
use std::sync::OnceLock;

fn id_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{6,}").unwrap())
}

fn detail_root_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?/shop-detail/[^/?#]+)").unwrap())
}

/// Derive the history-bucket key for a location
pub fn base_key(location: &str) -> String {
    if let Some(m) = id_token_re().find(location) {
        return m.as_str().to_string();
    }
    if let Some(root) = detail_root(location) {
        return root.to_string();
    }
    location.to_string()
}

/// The detail-path root of a location, if it is a shop detail page.
///
/// Also used by the resolver to drop search-origin actions once the
/// walker has reached the target's own pages.
pub fn detail_root(location: &str) -> Option<&str> {
    detail_root_re()
        .captures(location)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

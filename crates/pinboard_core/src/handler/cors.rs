//! Cross-origin annotations shared by every response.

use std::collections::BTreeMap;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, X-User-Id, X-Auth-Token";
/// Pre-flight cache lifetime in seconds (one day).
pub const MAX_AGE_SECS: u32 = 86_400;

/// Adds the open cross-origin allowance carried by every response.
pub fn apply_allow_origin(headers: &mut BTreeMap<String, String>) {
    headers.insert(
        "Access-Control-Allow-Origin".to_string(),
        ALLOW_ORIGIN.to_string(),
    );
}

/// Headers answering a pre-flight probe.
pub fn preflight_headers() -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    apply_allow_origin(&mut headers);
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        ALLOW_METHODS.to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        ALLOW_HEADERS.to_string(),
    );
    headers.insert(
        "Access-Control-Max-Age".to_string(),
        MAX_AGE_SECS.to_string(),
    );
    headers
}

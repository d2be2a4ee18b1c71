//! Copy-method-aware normalization of the global update location.

use crate::types::CopyMethod;

const SCHEME_PREFIXES: [&str; 3] = ["file://", "http://", "ftp://"];

/// Produce the final update location embedded in a manifest.
///
/// Network transports (http/ftp) get backslashes converted to forward
/// slashes and, when none of the recognized scheme prefixes is already
/// present (case-insensitive), the method's own scheme prepended. A
/// local-file location is passed through untouched, prefix or not.
pub fn normalize_location(location: &str, method: CopyMethod) -> String {
    let mut s = location.to_owned();
    if method.is_network() {
        s = s.replace('\\', "/");
    }
    let lower = s.to_ascii_lowercase();
    let has_prefix = SCHEME_PREFIXES.iter().any(|p| lower.starts_with(p));
    if !has_prefix && method.is_network() {
        s = format!("{}://{s}", method.scheme());
    }
    s
}

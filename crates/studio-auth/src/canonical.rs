//! Canonical payload construction for request signatures.
//!
//! The signer and the verifier each build the payload independently, so both
//! must normalize the request path the same way:
//!
//! ```text
//! METHOD:canonical_path:timestamp
//! ```
//!
//! The signer knows the path it intends to call; the verifier reconstructs it
//! from the routed request (mount prefix plus relative path). Canonicalization
//! absorbs the differences between those two views.

/// Normalize a raw request path for signing.
///
/// 1. Everything from the first `?` onward is discarded.
/// 2. The remainder is lower-cased.
/// 3. A single trailing `/` is removed, unless the path is exactly `/`.
///
/// # Examples
///
/// ```
/// use studio_auth::canonical::canonicalize_path;
///
/// assert_eq!(canonicalize_path("/Api/Seo/Home/?x=1"), "/api/seo/home");
/// assert_eq!(canonicalize_path("/"), "/");
/// ```
#[must_use]
pub fn canonicalize_path(raw: &str) -> String {
    let path = raw.split_once('?').map_or(raw, |(path, _)| path);
    let mut canonical = path.to_lowercase();
    if canonical.len() > 1 && canonical.ends_with('/') {
        canonical.pop();
    }
    canonical
}

/// Build the string fed to HMAC-SHA256.
///
/// The method is upper-cased, the path canonicalized, and the timestamp used
/// verbatim.
///
/// # Examples
///
/// ```
/// use studio_auth::canonical::build_payload;
///
/// assert_eq!(
///     build_payload("post", "/api/seo/home/", "1700000000000"),
///     "POST:/api/seo/home:1700000000000"
/// );
/// ```
#[must_use]
pub fn build_payload(method: &str, raw_path: &str, timestamp: &str) -> String {
    format!(
        "{}:{}:{timestamp}",
        method.to_uppercase(),
        canonicalize_path(raw_path)
    )
}

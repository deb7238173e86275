//! Trusted frontend origin matching.
//!
//! Unsigned `GET` requests are allowed when they come from the known browser
//! frontend, identified by the `Origin` or `Referer` header. Both headers are
//! client-supplied, so this only suits public, read-only data.

use tracing::trace;

/// The configured origin of the browser frontend.
///
/// Matching is stricter than a bare `starts_with` on the header value: the
/// configured origin must be followed by the end of the value or a `/`, `?`
/// or `#`. A lookalike host such as `https://studio.example.evil` is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedOrigin(String);

impl TrustedOrigin {
    /// Build a trusted origin from a configured URL.
    ///
    /// Surrounding whitespace and a single trailing slash are removed. Returns
    /// `None` for an empty value.
    ///
    /// # Examples
    ///
    /// ```
    /// use studio_auth::TrustedOrigin;
    ///
    /// let origin = TrustedOrigin::new("https://studio.example/").unwrap();
    /// assert_eq!(origin.as_str(), "https://studio.example");
    /// ```
    #[must_use]
    pub fn new(url: &str) -> Option<Self> {
        let trimmed = url.trim();
        let base = trimmed.strip_suffix('/').unwrap_or(trimmed);
        if base.is_empty() {
            None
        } else {
            Some(Self(base.to_owned()))
        }
    }

    /// The normalized origin.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a single `Origin` or `Referer` value belongs to this origin.
    ///
    /// The value must equal the origin or extend it at a path boundary, so
    /// `https://studio.example.evil` does not match `https://studio.example`.
    #[must_use]
    pub fn matches_value(&self, value: &str) -> bool {
        match value.strip_prefix(self.0.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '?', '#']),
            None => false,
        }
    }

    /// Whether the request's `Origin` or `Referer` header belongs to this origin.
    #[must_use]
    pub fn matches(&self, headers: &http::HeaderMap) -> bool {
        let matched = [http::header::ORIGIN, http::header::REFERER]
            .iter()
            .filter_map(|name| headers.get(name))
            .filter_map(|v| v.to_str().ok())
            .any(|v| self.matches_value(v));
        trace!(origin = %self.0, matched, "checked request origin");
        matched
    }
}

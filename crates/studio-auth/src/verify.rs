//! Signature verification.
//!
//! The verifier recomputes the signature from the request's own method, its
//! reconstructed path, and the supplied timestamp, then compares it with the
//! supplied `x-signature` in constant time.
//!
//! By default the timestamp is only used as signed input and is not checked
//! against the clock, so a captured signature stays valid. A maximum age can
//! be configured to reject stale or future-dated requests.

use std::time::Duration;

use studio_core::SharedSecret;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::error::AuthError;
use crate::signing::{now_millis, sign};

/// Verifies `x-signature` / `x-timestamp` pairs against the shared secret.
#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier {
    secret: Option<SharedSecret>,
    max_age: Option<Duration>,
}

impl SignatureVerifier {
    /// Create a verifier. Without a secret every signature is rejected.
    #[must_use]
    pub fn new(secret: Option<SharedSecret>) -> Self {
        Self {
            secret,
            max_age: None,
        }
    }

    /// Reject timestamps further than `max_age` from the current time.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
        self.max_age = max_age;
        self
    }

    /// Whether a shared secret is configured.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify a signature using the current time for the freshness check.
    pub fn verify(
        &self,
        method: &str,
        path: &str,
        signature: Option<&str>,
        timestamp: Option<&str>,
    ) -> Result<(), AuthError> {
        self.verify_at(method, path, signature, timestamp, now_millis())
    }

    /// Verify a signature as of `now_ms`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredentials`] if the secret, the signature, or the
    ///   timestamp is absent or empty
    /// - [`AuthError::InvalidTimestamp`] if a maximum age is set and the
    ///   timestamp is unparseable or outside the window
    /// - [`AuthError::InvalidSignature`] if the signature does not match
    pub fn verify_at(
        &self,
        method: &str,
        path: &str,
        signature: Option<&str>,
        timestamp: Option<&str>,
        now_ms: u64,
    ) -> Result<(), AuthError> {
        let signature = signature.filter(|s| !s.is_empty());
        let timestamp = timestamp.filter(|t| !t.is_empty());

        let (Some(secret), Some(signature), Some(timestamp)) =
            (self.secret.as_ref(), signature, timestamp)
        else {
            debug!(
                secret_configured = self.secret.is_some(),
                has_signature = signature.is_some(),
                has_timestamp = timestamp.is_some(),
                "signature credentials incomplete"
            );
            return Err(AuthError::MissingCredentials);
        };

        if let Some(max_age) = self.max_age {
            check_freshness(timestamp, now_ms, max_age)?;
        }

        if verify_signature(secret.as_bytes(), method, path, timestamp, signature) {
            debug!(method, path, "signature verification succeeded");
            Ok(())
        } else {
            debug!(method, path, provided = %signature, "signature mismatch");
            Err(AuthError::InvalidSignature)
        }
    }
}

/// Recompute the signature for `method`, `path` and `timestamp` and compare
/// it with `signature` in constant time.
///
/// # Examples
///
/// ```
/// use studio_auth::{sign, verify_signature};
///
/// let sig = sign("POST", "/api/seo/home", "1700000000000", b"s3cr3t");
/// assert!(verify_signature(b"s3cr3t", "post", "/API/Seo/Home/", "1700000000000", &sig));
/// assert!(!verify_signature(b"other", "POST", "/api/seo/home", "1700000000000", &sig));
/// ```
#[must_use]
pub fn verify_signature(
    secret: &[u8],
    method: &str,
    path: &str,
    timestamp: &str,
    signature: &str,
) -> bool {
    let expected = sign(method, path, timestamp, secret);
    signature.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Check that `timestamp` lies within `max_age` of `now_ms` in either direction.
fn check_freshness(timestamp: &str, now_ms: u64, max_age: Duration) -> Result<(), AuthError> {
    let signed_at: u64 = timestamp
        .parse()
        .map_err(|_| AuthError::InvalidTimestamp(format!("not a millisecond timestamp: {timestamp}")))?;
    let max_age_ms = u64::try_from(max_age.as_millis()).unwrap_or(u64::MAX);

    if signed_at.abs_diff(now_ms) > max_age_ms {
        return Err(AuthError::InvalidTimestamp(format!(
            "timestamp {signed_at} is outside the {max_age_ms}ms window around {now_ms}"
        )));
    }
    Ok(())
}

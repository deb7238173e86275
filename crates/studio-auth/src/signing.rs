//! HMAC-SHA256 request signing.
//!
//! ```text
//! signature = hex(HMAC-SHA256(secret, METHOD:canonical_path:timestamp))
//! ```
//!
//! The timestamp is the signer's wall clock in milliseconds since the Unix
//! epoch, written as a plain decimal string. Both values travel as the
//! `x-signature` and `x-timestamp` request headers.
//!
//! A [`Signer`] owns the shared secret, which only ever exists in server-side
//! configuration. Nothing that runs in a browser can construct one.

use hmac::{Hmac, KeyInit, Mac};
use sha2::Sha256;
use studio_core::SharedSecret;
use tracing::trace;

use crate::canonical::build_payload;
use crate::error::AuthError;

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-signature";

/// Header carrying the signing timestamp in milliseconds.
pub const TIMESTAMP_HEADER: &str = "x-timestamp";

type HmacSha256 = Hmac<Sha256>;

/// Compute the lowercase hex signature for a request.
///
/// Identical inputs always produce identical output.
///
/// # Examples
///
/// ```
/// use studio_auth::signing::sign;
///
/// let sig = sign("POST", "/api/seo/home", "1700000000000", b"s3cr3t");
/// assert_eq!(sig.len(), 64);
/// ```
#[must_use]
pub fn sign(method: &str, raw_path: &str, timestamp: &str, secret: &[u8]) -> String {
    let payload = build_payload(method, raw_path, timestamp);
    trace!(payload, "computing request signature");
    hex::encode(hmac_sha256(secret, payload.as_bytes()))
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

/// Compute HMAC-SHA256 and return the raw bytes.
fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can accept keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// The header pair attached to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeaders {
    /// Lowercase hex HMAC-SHA256 digest.
    pub signature: String,
    /// Decimal milliseconds since the Unix epoch.
    pub timestamp: String,
}

impl SignatureHeaders {
    /// Header name/value pairs, for clients that take plain strings.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 2] {
        [
            (SIGNATURE_HEADER, self.signature.as_str()),
            (TIMESTAMP_HEADER, self.timestamp.as_str()),
        ]
    }

    /// Merge both headers into an outgoing request's header map, replacing
    /// any previous values.
    pub fn apply(&self, headers: &mut http::HeaderMap) -> Result<(), AuthError> {
        for (name, value) in self.pairs() {
            let value = http::HeaderValue::from_str(value)
                .map_err(|e| AuthError::Internal(format!("invalid {name} header value: {e}")))?;
            headers.insert(name, value);
        }
        Ok(())
    }
}

/// Signs outgoing internal requests with the shared secret.
///
/// Called fresh for every request: no caching, no retries.
#[derive(Debug, Clone)]
pub struct Signer {
    secret: SharedSecret,
}

impl Signer {
    /// Create a signer for the given secret.
    #[must_use]
    pub fn new(secret: SharedSecret) -> Self {
        Self { secret }
    }

    /// Sign `method` and `path` with the current time.
    #[must_use]
    pub fn signature_headers(&self, method: &str, path: &str) -> SignatureHeaders {
        self.signature_headers_at(method, path, now_millis())
    }

    /// Sign `method` and `path` with an explicit timestamp.
    #[must_use]
    pub fn signature_headers_at(&self, method: &str, path: &str, timestamp_ms: u64) -> SignatureHeaders {
        let timestamp = timestamp_ms.to_string();
        let signature = sign(method, path, &timestamp, self.secret.as_bytes());
        SignatureHeaders {
            signature,
            timestamp,
        }
    }

    /// Sign a request that is about to be sent, using its own method and path.
    pub fn sign_request<B>(&self, request: &mut http::Request<B>) -> Result<(), AuthError> {
        let headers = self.signature_headers(request.method().as_str(), request.uri().path());
        headers.apply(request.headers_mut())
    }
}

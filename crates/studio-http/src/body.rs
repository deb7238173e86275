//! Protected API response body type.

use bytes::Bytes;
use http_body_util::Full;

/// Response body for protected API responses.
///
/// Every response is a buffered JSON document, or empty for preflight
/// answers.
pub type ApiResponseBody = Full<Bytes>;

/// Body holding a serialized JSON document.
#[must_use]
pub fn json_body(json: Vec<u8>) -> ApiResponseBody {
    Full::new(Bytes::from(json))
}

/// Body with no content.
#[must_use]
pub fn empty_body() -> ApiResponseBody {
    Full::new(Bytes::new())
}

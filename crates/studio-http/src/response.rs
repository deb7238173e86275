//! Response serialization and error formatting.

use studio_auth::AuthError;
use studio_model::error::ApiError;

use crate::body::{ApiResponseBody, json_body};

/// Content type for all JSON responses.
pub const CONTENT_TYPE: &str = "application/json";

/// Header echoing the per-request identifier.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Serialize an error into a JSON response body.
///
/// ```json
/// { "success": false, "message": "Unauthorized: Protected API" }
/// ```
#[must_use]
pub fn error_to_json(error: &ApiError) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "success": false,
        "message": error.message,
    }))
    .expect("JSON serialization of error cannot fail")
}

/// Convert an [`ApiError`] into a complete HTTP error response.
#[must_use]
pub fn error_to_response(error: &ApiError, request_id: &str) -> http::Response<ApiResponseBody> {
    build_response(error.status_code, error_to_json(error), request_id)
}

/// Map an authorization failure to the error returned to the caller.
///
/// Only the fixed client message is exposed; the detailed cause stays in the
/// source chain for logging.
#[must_use]
pub fn auth_error_to_api_error(error: AuthError) -> ApiError {
    let status = error.status_code();
    ApiError::unauthorized(error.client_message())
        .with_status(status)
        .with_source(error)
}

/// Build a success response wrapping `data`.
///
/// ```json
/// { "success": true, "data": { ... } }
/// ```
#[must_use]
pub fn json_response(
    status: http::StatusCode,
    data: &serde_json::Value,
    request_id: &str,
) -> http::Response<ApiResponseBody> {
    let json = serde_json::to_vec(&serde_json::json!({
        "success": true,
        "data": data,
    }))
    .expect("JSON serialization of a Value cannot fail");
    build_response(status, json, request_id)
}

fn build_response(
    status: http::StatusCode,
    json: Vec<u8>,
    request_id: &str,
) -> http::Response<ApiResponseBody> {
    let mut response = http::Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, CONTENT_TYPE)
        .body(json_body(json))
        .expect("valid JSON response");

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, hv);
    }

    response
}

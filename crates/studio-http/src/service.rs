//! Protected API HTTP service implementing the hyper `Service` trait.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;

use studio_auth::Authorizer;
use studio_model::error::ApiError;

use crate::body::{ApiResponseBody, empty_body};
use crate::dispatch::{RequestContext, SettingsHandler, dispatch_operation};
use crate::response::{CONTENT_TYPE, REQUEST_ID_HEADER, auth_error_to_api_error, error_to_response};
use crate::router::resolve_route;

/// Request headers the trusted frontend may send cross-origin, including
/// the signature headers.
const ALLOW_HEADERS: &str = "content-type, authorization, x-signature, x-timestamp";

/// Default upper bound on request bodies.
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for the protected API service.
#[derive(Debug, Clone)]
pub struct ProtectedApiConfig {
    /// Authorizer run in front of every route.
    pub authorizer: Arc<Authorizer>,
    /// Largest accepted request body.
    pub max_body_bytes: usize,
}

impl ProtectedApiConfig {
    /// Create a configuration with the default body limit.
    #[must_use]
    pub fn new(authorizer: Arc<Authorizer>) -> Self {
        Self {
            authorizer,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Hyper `Service` implementation for the protected API.
///
/// Wraps a [`SettingsHandler`] and only lets requests through that the
/// configured [`Authorizer`] admits.
#[derive(Debug)]
pub struct ProtectedApiService<H: SettingsHandler> {
    handler: Arc<H>,
    config: Arc<ProtectedApiConfig>,
}

impl<H: SettingsHandler> ProtectedApiService<H> {
    /// Create a new `ProtectedApiService`.
    pub fn new(handler: Arc<H>, config: ProtectedApiConfig) -> Self {
        Self {
            handler,
            config: Arc::new(config),
        }
    }

    /// Run a request through the pipeline with any buffered or streaming body.
    pub async fn handle<B>(&self, req: http::Request<B>) -> http::Response<ApiResponseBody>
    where
        B: hyper::body::Body<Data = Bytes> + Send,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let request_id = uuid::Uuid::new_v4().to_string();
        let origin = req.headers().get(http::header::ORIGIN).cloned();
        let response = process_request(req, self.handler.as_ref(), &self.config, &request_id).await;
        add_common_headers(response, &request_id, origin.as_ref(), &self.config)
    }
}

impl<H: SettingsHandler> Clone for ProtectedApiService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            config: Arc::clone(&self.config),
        }
    }
}

impl<H: SettingsHandler> hyper::service::Service<http::Request<Incoming>>
    for ProtectedApiService<H>
{
    type Response = http::Response<ApiResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}

/// Process a single request through the full pipeline.
async fn process_request<H, B>(
    req: http::Request<B>,
    handler: &H,
    config: &ProtectedApiConfig,
    request_id: &str,
) -> http::Response<ApiResponseBody>
where
    H: SettingsHandler,
    B: hyper::body::Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, incoming) = req.into_parts();

    // 1. CORS preflight never carries credentials.
    if parts.method == http::Method::OPTIONS {
        return preflight_response();
    }

    // 2. Route: method and path to operation.
    let route = match resolve_route(&parts.method, parts.uri.path()) {
        Ok(route) => route,
        Err(err) => return error_to_response(&err, request_id),
    };

    // 3. Authorize over the path rebuilt from mount and relative path.
    //    Only public reads may use the trusted-origin path.
    let path = route.full_path();
    let authorized = if route.operation.is_public_read() {
        config
            .authorizer
            .authorize(&parts.method, &path, &parts.headers)
            .await
    } else {
        config
            .authorizer
            .authorize_private(&parts.method, &path, &parts.headers)
            .await
    };
    let authorization = match authorized {
        Ok(authorization) => authorization,
        Err(auth_err) => {
            tracing::info!(
                method = %parts.method,
                path = parts.uri.path(),
                error = %auth_err,
                "request not authorized",
            );
            return error_to_response(&auth_error_to_api_error(auth_err), request_id);
        }
    };

    // 4. Collect body for operations that take one.
    let body = if route.operation.has_body() {
        match collect_body(incoming, config.max_body_bytes).await {
            Ok(body) => body,
            Err(err) => return error_to_response(&err, request_id),
        }
    } else {
        Bytes::new()
    };

    // 5. Dispatch to handler.
    let ctx = RequestContext {
        request_id: request_id.to_owned(),
        authorization,
        page: route.page,
    };
    match dispatch_operation(handler, route.operation, ctx, body).await {
        Ok(response) => response,
        Err(err) => {
            if err.status_code.is_server_error() {
                tracing::error!(operation = %route.operation, error = %err, "operation failed");
            }
            error_to_response(&err, request_id)
        }
    }
}

/// Collect the incoming body into a single `Bytes` buffer.
async fn collect_body<B>(incoming: B, limit: usize) -> Result<Bytes, ApiError>
where
    B: hyper::body::Body<Data = Bytes> + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    Limited::new(incoming, limit)
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                ApiError::validation(format!("Request body exceeds {limit} bytes"))
                    .with_status(http::StatusCode::PAYLOAD_TOO_LARGE)
            } else {
                ApiError::internal_error(format!("Failed to read request body: {e}"))
            }
        })
}

fn preflight_response() -> http::Response<ApiResponseBody> {
    let mut response = http::Response::new(empty_body());
    *response.status_mut() = http::StatusCode::NO_CONTENT;
    response
}

/// Add common response headers to every protected API response.
fn add_common_headers(
    mut response: http::Response<ApiResponseBody>,
    request_id: &str,
    origin: Option<&http::HeaderValue>,
    config: &ProtectedApiConfig,
) -> http::Response<ApiResponseBody> {
    let is_preflight = response.status() == http::StatusCode::NO_CONTENT;
    let headers = response.headers_mut();

    if let Ok(hv) = http::HeaderValue::from_str(request_id) {
        headers.entry(REQUEST_ID_HEADER).or_insert(hv);
    }

    if !is_preflight {
        headers
            .entry(http::header::CONTENT_TYPE)
            .or_insert(http::HeaderValue::from_static(CONTENT_TYPE));
    }

    headers.insert("server", http::HeaderValue::from_static("StudioApi"));

    // CORS headers, only for the trusted frontend.
    let trusted = config.authorizer.trusted_origin();
    if let (Some(trusted), Some(origin)) = (trusted, origin) {
        if origin.to_str().is_ok_and(|o| trusted.matches_value(o)) {
            headers.insert(http::header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
            headers.insert(
                http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                http::HeaderValue::from_static("true"),
            );
            headers.insert(
                http::header::ACCESS_CONTROL_ALLOW_METHODS,
                http::HeaderValue::from_static("GET, PUT, POST, OPTIONS"),
            );
            headers.insert(
                http::header::ACCESS_CONTROL_ALLOW_HEADERS,
                http::HeaderValue::from_static(ALLOW_HEADERS),
            );
            headers.insert(http::header::VARY, http::HeaderValue::from_static("Origin"));
        }
    }

    response
}

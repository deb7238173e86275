//! Gateway service in front of the protected API.
//!
//! Health-check endpoints (`/health`, `/api/health`) are answered here
//! without authorization. Everything else goes to the protected API service.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use hyper::body::Incoming;
use hyper::service::Service;

use studio_http::body::json_body;
use studio_http::{ApiResponseBody, ProtectedApiService, SettingsHandler};

/// Gateway routing health probes and protected API requests.
#[derive(Debug)]
pub struct GatewayService<H: SettingsHandler> {
    api: ProtectedApiService<H>,
    version: &'static str,
}

impl<H: SettingsHandler> GatewayService<H> {
    /// Create a new gateway wrapping the protected API service.
    pub fn new(api: ProtectedApiService<H>, version: &'static str) -> Self {
        Self { api, version }
    }
}

impl<H: SettingsHandler> Clone for GatewayService<H> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            version: self.version,
        }
    }
}

impl<H: SettingsHandler> Service<http::Request<Incoming>> for GatewayService<H> {
    type Response = http::Response<ApiResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        // Intercept health checks at the gateway level.
        if is_health_check(req.method(), req.uri().path()) {
            let response = health_check_response(self.version);
            return Box::pin(async { Ok(response) });
        }

        self.api.call(req)
    }
}

/// Check if the request is a health check probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/health" || path == "/api/health")
}

/// Produce the health check response.
fn health_check_response(version: &str) -> http::Response<ApiResponseBody> {
    let body = serde_json::json!({ "status": "ok", "version": version });
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(json_body(body.to_string().into_bytes()))
        .expect("static health response should be valid")
}

//! Session resolver backed by the external auth service.
//!
//! Forwards the caller's `Cookie` and `Authorization` headers to
//! `GET {base}/api/auth/get-session`. The service answers `200` with either a
//! `{ "user": { ... } }` document or `null`.

use async_trait::async_trait;
use tracing::debug;

use crate::error::AuthError;
use crate::session::{Session, SessionResolver};

/// Path of the session lookup endpoint, relative to the service base URL.
const GET_SESSION_PATH: &str = "/api/auth/get-session";

/// Resolves sessions by calling the auth service over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteSessionResolver {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteSessionResolver {
    /// Create a resolver for the auth service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Internal`] if `base_url` is not an absolute URL or
    /// the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        reqwest::Url::parse(&session_endpoint(base_url))
            .map_err(|e| AuthError::Internal(format!("invalid session service URL: {e}")))?;
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AuthError::Internal(format!("failed to build session client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a resolver using an existing HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: session_endpoint(base_url),
        }
    }

    /// The full session lookup URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SessionResolver for RemoteSessionResolver {
    async fn resolve(&self, headers: &http::HeaderMap) -> Result<Option<Session>, AuthError> {
        if !carries_credentials(headers) {
            return Ok(None);
        }

        let mut request = self.client.get(&self.endpoint);
        for name in [http::header::COOKIE, http::header::AUTHORIZATION] {
            for value in headers.get_all(&name) {
                request = request.header(name.clone(), value.clone());
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::SessionResolution(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::NOT_FOUND {
            debug!(%status, "session service reported no session");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::SessionResolution(format!(
                "session service returned {status}"
            )));
        }

        response
            .json::<Option<Session>>()
            .await
            .map_err(|e| AuthError::SessionResolution(format!("invalid session payload: {e}")))
    }
}

/// Whether the request carries anything the auth service could recognize.
fn carries_credentials(headers: &http::HeaderMap) -> bool {
    headers.contains_key(http::header::COOKIE) || headers.contains_key(http::header::AUTHORIZATION)
}

fn session_endpoint(base_url: &str) -> String {
    format!("{}{GET_SESSION_PATH}", base_url.trim().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use http_body_util::Full;
    use hyper::server::conn::http1;
    use hyper::service::service_fn;
    use hyper_util::rt::TokioIo;
    use tokio::net::TcpListener;

    use super::*;

    const COOKIE: &str = "better-auth.session_token=abc";

    /// Serve one fixed response on a local port and record the `Cookie`
    /// header of each request. Returns the base URL.
    async fn session_service(
        status: u16,
        body: &'static str,
    ) -> (String, Arc<Mutex<Option<String>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(None));
        let recorded = Arc::clone(&seen);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let svc = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    let cookie = req
                        .headers()
                        .get(http::header::COOKIE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_owned);
                    let path = req.uri().path().to_owned();
                    *recorded.lock().unwrap() = cookie;
                    async move {
                        let status = if path == GET_SESSION_PATH { status } else { 418 };
                        http::Response::builder()
                            .status(status)
                            .header(http::header::CONTENT_TYPE, "application/json")
                            .body(Full::new(Bytes::from_static(body.as_bytes())))
                    }
                });
                tokio::spawn(async move {
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), svc)
                        .await;
                });
            }
        });

        (format!("http://{addr}"), seen)
    }

    fn cookie_headers() -> http::HeaderMap {
        let mut headers = http::HeaderMap::new();
        headers.insert(http::header::COOKIE, http::HeaderValue::from_static(COOKIE));
        headers
    }

    #[test]
    fn test_should_build_session_endpoint() {
        assert_eq!(
            session_endpoint("https://auth.studio.example/"),
            "https://auth.studio.example/api/auth/get-session"
        );
        assert_eq!(
            session_endpoint("http://localhost:3000"),
            "http://localhost:3000/api/auth/get-session"
        );
    }

    #[test]
    fn test_should_detect_credential_headers() {
        let mut headers = http::HeaderMap::new();
        assert!(!carries_credentials(&headers));
        headers.insert(
            http::header::COOKIE,
            http::HeaderValue::from_static("better-auth.session_token=x"),
        );
        assert!(carries_credentials(&headers));
    }

    #[test]
    fn test_should_reject_relative_base_url() {
        assert!(matches!(
            RemoteSessionResolver::new("not a url"),
            Err(AuthError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn test_should_skip_lookup_without_credentials() {
        // Unroutable endpoint: any network call would fail.
        let resolver = RemoteSessionResolver::new("http://127.0.0.1:1").unwrap();
        let result = resolver.resolve(&http::HeaderMap::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_should_report_unreachable_service_as_resolution_error() {
        let resolver = RemoteSessionResolver::new("http://127.0.0.1:1").unwrap();
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::COOKIE,
            http::HeaderValue::from_static("better-auth.session_token=x"),
        );
        let result = resolver.resolve(&headers).await;
        assert!(matches!(result, Err(AuthError::SessionResolution(_))));
    }

    #[tokio::test]
    async fn test_should_resolve_admin_session_and_forward_cookie() {
        let (base, seen) = session_service(
            200,
            r#"{"session":{"id":"s1","expiresAt":"2030-01-01T00:00:00Z"},"user":{"id":"u1","role":"admin","email":"a@studio.example"}}"#,
        )
        .await;
        let resolver = RemoteSessionResolver::new(&base).unwrap();

        let session = resolver.resolve(&cookie_headers()).await.unwrap().unwrap();
        assert_eq!(session.user.id, "u1");
        assert!(session.user.is_admin());
        assert_eq!(session.user.email.as_deref(), Some("a@studio.example"));
        assert_eq!(seen.lock().unwrap().as_deref(), Some(COOKIE));
    }

    #[tokio::test]
    async fn test_should_resolve_non_admin_session() {
        let (base, _) = session_service(200, r#"{"user":{"id":"u2"}}"#).await;
        let resolver = RemoteSessionResolver::new(&base).unwrap();

        let session = resolver.resolve(&cookie_headers()).await.unwrap().unwrap();
        assert_eq!(session.user.id, "u2");
        assert!(!session.user.is_admin());
    }

    #[tokio::test]
    async fn test_should_treat_null_body_as_no_session() {
        let (base, _) = session_service(200, "null").await;
        let resolver = RemoteSessionResolver::new(&base).unwrap();
        assert!(resolver.resolve(&cookie_headers()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_should_treat_unauthorized_and_not_found_as_no_session() {
        for status in [401, 404] {
            let (base, _) = session_service(status, r#"{"error":"no session"}"#).await;
            let resolver = RemoteSessionResolver::new(&base).unwrap();
            let result = resolver.resolve(&cookie_headers()).await.unwrap();
            assert!(result.is_none(), "status {status}");
        }
    }

    #[tokio::test]
    async fn test_should_report_server_error_as_resolution_error() {
        let (base, _) = session_service(500, r#"{"error":"boom"}"#).await;
        let resolver = RemoteSessionResolver::new(&base).unwrap();
        let result = resolver.resolve(&cookie_headers()).await;
        assert!(matches!(result, Err(AuthError::SessionResolution(_))));
    }

    #[tokio::test]
    async fn test_should_report_malformed_payload_as_resolution_error() {
        let (base, _) = session_service(200, r#"{"user":"nobody"}"#).await;
        let resolver = RemoteSessionResolver::new(&base).unwrap();
        let result = resolver.resolve(&cookie_headers()).await;
        assert!(matches!(result, Err(AuthError::SessionResolution(_))));
    }
}

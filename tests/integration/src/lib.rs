//! Integration tests for the studio API server.
//!
//! These tests require a running server at `localhost:5000` started with the
//! same `API_SIGNING_SECRET` and `FRONTEND_URL` as the test process. They are
//! marked `#[ignore]` so they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! API_SIGNING_SECRET=s3cr3t FRONTEND_URL=https://studio.example \
//!     cargo test -p studio-integration -- --ignored
//! ```

use std::sync::Once;

use studio_auth::Signer;
use studio_core::SharedSecret;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
#[must_use]
pub fn endpoint_url() -> String {
    std::env::var("STUDIO_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:5000".to_owned())
}

/// Full URL for a request path.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", endpoint_url().trim_end_matches('/'))
}

/// Origin the server trusts for unsigned reads.
#[must_use]
pub fn frontend_url() -> String {
    std::env::var("FRONTEND_URL").unwrap_or_else(|_| "https://studio.example".to_owned())
}

/// Shared HTTP client.
#[must_use]
pub fn client() -> reqwest::Client {
    init_tracing();
    reqwest::Client::new()
}

/// Signer holding the secret the server was started with.
#[must_use]
pub fn signer() -> Signer {
    let secret = std::env::var("API_SIGNING_SECRET").unwrap_or_else(|_| "s3cr3t".to_owned());
    Signer::new(SharedSecret::new(secret))
}

/// Build a request carrying a fresh signature for `method` and `path`.
#[must_use]
pub fn signed(client: &reqwest::Client, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
    let headers = signer().signature_headers(method.as_str(), path);
    let mut request = client.request(method, url(path));
    for (name, value) in headers.pairs() {
        request = request.header(name, value);
    }
    request
}

/// Generate a unique SEO page key for a test.
#[must_use]
pub fn test_page(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("{prefix}-{id}")
}

mod test_health;
mod test_origin;
mod test_session;
mod test_signed;

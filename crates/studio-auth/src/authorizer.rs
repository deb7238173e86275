//! Three-path authorization for protected routes.
//!
//! Paths are evaluated in order and the first match wins:
//!
//! 1. **Session**: the resolver returns a session whose user has the `admin`
//!    role. The user is returned with the decision so handlers can record it.
//! 2. **Trusted origin**: the request is a `GET` and its `Origin` or `Referer`
//!    belongs to the configured frontend.
//! 3. **Signature**: `x-signature` and `x-timestamp` verify against the shared
//!    secret over the request's method and reconstructed path.
//!
//! The session lookup is bounded by a timeout; a timeout counts as "no
//! session". Resolver errors follow the configured [`SessionFailurePolicy`].

use std::sync::Arc;
use std::time::Duration;

use studio_core::{SessionFailurePolicy, StudioConfig};
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::origin::TrustedOrigin;
use crate::session::{Session, SessionResolver, SessionUser};
use crate::signing::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::verify::SignatureVerifier;

/// Default bound on the session lookup.
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(3);

/// Which path authorized a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthPath {
    /// Admin session.
    Session,
    /// Unsigned GET from the trusted frontend.
    TrustedOrigin,
    /// Valid HMAC signature.
    Signature,
}

impl AuthPath {
    /// Short name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::TrustedOrigin => "trusted-origin",
            Self::Signature => "signature",
        }
    }
}

/// A successful authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// The path that admitted the request.
    pub via: AuthPath,
    /// The admin user, present only for [`AuthPath::Session`].
    pub user: Option<SessionUser>,
}

impl Authorization {
    fn session(user: SessionUser) -> Self {
        Self {
            via: AuthPath::Session,
            user: Some(user),
        }
    }

    fn anonymous(via: AuthPath) -> Self {
        Self { via, user: None }
    }
}

/// Decides whether a request may reach a protected route.
///
/// Stateless apart from its immutable configuration; one instance is shared
/// by all connections.
pub struct Authorizer {
    resolver: Arc<dyn SessionResolver>,
    verifier: SignatureVerifier,
    trusted_origin: Option<TrustedOrigin>,
    session_timeout: Duration,
    failure_policy: SessionFailurePolicy,
}

impl std::fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authorizer")
            .field("resolver", &"...")
            .field("verifier", &self.verifier)
            .field("trusted_origin", &self.trusted_origin)
            .field("session_timeout", &self.session_timeout)
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

impl Authorizer {
    /// Create an authorizer with no trusted origin, the default timeout, and
    /// the fail-open policy.
    #[must_use]
    pub fn new(resolver: Arc<dyn SessionResolver>, verifier: SignatureVerifier) -> Self {
        Self {
            resolver,
            verifier,
            trusted_origin: None,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            failure_policy: SessionFailurePolicy::Open,
        }
    }

    /// Build an authorizer from the process configuration.
    #[must_use]
    pub fn from_config(config: &StudioConfig, resolver: Arc<dyn SessionResolver>) -> Self {
        let verifier = SignatureVerifier::new(config.signing_secret.clone())
            .with_max_age(config.signature_max_age);
        Self::new(resolver, verifier)
            .with_trusted_origin(config.frontend_url.as_deref().and_then(TrustedOrigin::new))
            .with_session_timeout(config.session_timeout)
            .with_failure_policy(config.session_failure_policy)
    }

    /// Set the frontend origin allowed to issue unsigned GETs.
    #[must_use]
    pub fn with_trusted_origin(mut self, origin: Option<TrustedOrigin>) -> Self {
        self.trusted_origin = origin;
        self
    }

    /// Bound the session lookup.
    #[must_use]
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// Choose how resolver errors are handled.
    #[must_use]
    pub fn with_failure_policy(mut self, policy: SessionFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Whether a shared secret is configured, i.e. whether signed requests
    /// can be accepted at all.
    #[must_use]
    pub fn accepts_signatures(&self) -> bool {
        self.verifier.is_configured()
    }

    /// The configured trusted origin, if any.
    #[must_use]
    pub fn trusted_origin(&self) -> Option<&TrustedOrigin> {
        self.trusted_origin.as_ref()
    }

    /// Authorize a request.
    ///
    /// `path` is the full request path as seen by the router, i.e. the mount
    /// prefix joined with the route's relative path. It is canonicalized
    /// before verification.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingCredentials`] when no path applies
    /// - [`AuthError::InvalidSignature`] / [`AuthError::InvalidTimestamp`]
    ///   when a signature is present but rejected
    /// - [`AuthError::SessionResolution`] when the resolver fails under the
    ///   fail-closed policy
    pub async fn authorize(
        &self,
        method: &http::Method,
        path: &str,
        headers: &http::HeaderMap,
    ) -> Result<Authorization, AuthError> {
        self.authorize_request(method, path, headers, true).await
    }

    /// Authorize a request for non-public data.
    ///
    /// Same as [`Authorizer::authorize`] without the trusted-origin path:
    /// `Origin` and `Referer` are client-supplied, so they never unlock data
    /// that is not already public.
    pub async fn authorize_private(
        &self,
        method: &http::Method,
        path: &str,
        headers: &http::HeaderMap,
    ) -> Result<Authorization, AuthError> {
        self.authorize_request(method, path, headers, false).await
    }

    async fn authorize_request(
        &self,
        method: &http::Method,
        path: &str,
        headers: &http::HeaderMap,
        allow_origin: bool,
    ) -> Result<Authorization, AuthError> {
        if let Some(session) = self.resolve_session(headers).await? {
            if session.user.is_admin() {
                debug!(user_id = %session.user.id, path, "authorized via admin session");
                return Ok(Authorization::session(session.user));
            }
            debug!(user_id = %session.user.id, role = %session.user.role, "session user is not an admin");
        }

        if allow_origin && *method == http::Method::GET {
            if let Some(origin) = &self.trusted_origin {
                if origin.matches(headers) {
                    debug!(path, "authorized via trusted origin");
                    return Ok(Authorization::anonymous(AuthPath::TrustedOrigin));
                }
            }
        }

        let signature = header_str(headers, SIGNATURE_HEADER);
        let timestamp = header_str(headers, TIMESTAMP_HEADER);

        self.verifier
            .verify(method.as_str(), path, signature, timestamp)
            .inspect_err(|e| debug!(%method, path, error = %e, "request rejected"))?;

        debug!(%method, path, "authorized via signature");
        Ok(Authorization::anonymous(AuthPath::Signature))
    }

    /// Resolve the session with the configured timeout and failure policy.
    async fn resolve_session(&self, headers: &http::HeaderMap) -> Result<Option<Session>, AuthError> {
        match tokio::time::timeout(self.session_timeout, self.resolver.resolve(headers)).await {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(e)) => match self.failure_policy {
                SessionFailurePolicy::Open => {
                    warn!(error = %e, "session lookup failed, continuing without session");
                    Ok(None)
                }
                SessionFailurePolicy::Closed => {
                    warn!(error = %e, "session lookup failed, rejecting request");
                    Err(e)
                }
            },
            Err(_) => {
                warn!(
                    timeout_ms = u64::try_from(self.session_timeout.as_millis()).unwrap_or(u64::MAX),
                    "session lookup timed out, continuing without session"
                );
                Ok(None)
            }
        }
    }
}

fn header_str<'a>(headers: &'a http::HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

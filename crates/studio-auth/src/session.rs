//! Session resolution.
//!
//! The session service is an external collaborator: given the request's
//! cookies and headers it either returns the signed-in user or nothing. The
//! [`SessionResolver`] trait is the seam; the authorizer receives an
//! implementation at construction time.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::AuthError;

/// Name of the session cookie set by the auth service.
pub const SESSION_COOKIE: &str = "better-auth.session_token";

/// Same cookie when served over HTTPS with the `__Secure-` prefix.
const SECURE_SESSION_COOKIE: &str = "__Secure-better-auth.session_token";

/// The user attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionUser {
    /// User identifier.
    pub id: String,
    /// Role name; only `admin` may use the session path.
    #[serde(default)]
    pub role: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionUser {
    /// Role required for session-based access to protected routes.
    pub const ADMIN_ROLE: &str = "admin";

    /// Create a user with the given id and role.
    #[must_use]
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
            email: None,
            name: None,
        }
    }

    /// Whether this user has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Self::ADMIN_ROLE
    }
}

/// A resolved session.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Session {
    /// The signed-in user.
    pub user: SessionUser,
}

/// Looks up the session carried by a request.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Resolve a session from the request headers.
    ///
    /// Returns `Ok(None)` when the request carries no valid session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SessionResolution`] if the lookup itself failed.
    async fn resolve(&self, headers: &http::HeaderMap) -> Result<Option<Session>, AuthError>;
}

/// Resolver used when no session service is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSessionResolver;

#[async_trait]
impl SessionResolver for NoSessionResolver {
    async fn resolve(&self, _headers: &http::HeaderMap) -> Result<Option<Session>, AuthError> {
        Ok(None)
    }
}

/// An in-memory resolver keyed by session token.
///
/// Suitable for tests and local development.
///
/// # Examples
///
/// ```
/// use studio_auth::{SessionUser, StaticSessionResolver};
///
/// let resolver = StaticSessionResolver::new(vec![
///     ("tok-admin".to_owned(), SessionUser::new("u1", "admin")),
/// ]);
/// assert!(resolver.user_for_token("tok-admin").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticSessionResolver {
    sessions: HashMap<String, SessionUser>,
}

impl StaticSessionResolver {
    /// Create a resolver from `(token, user)` pairs.
    pub fn new(sessions: impl IntoIterator<Item = (String, SessionUser)>) -> Self {
        Self {
            sessions: sessions.into_iter().collect(),
        }
    }

    /// Look up the user for a raw session token.
    #[must_use]
    pub fn user_for_token(&self, token: &str) -> Option<&SessionUser> {
        self.sessions.get(token)
    }
}

#[async_trait]
impl SessionResolver for StaticSessionResolver {
    async fn resolve(&self, headers: &http::HeaderMap) -> Result<Option<Session>, AuthError> {
        Ok(session_token(headers)
            .and_then(|token| self.user_for_token(&token).cloned())
            .map(|user| Session { user }))
    }
}

/// Extract the session token from the session cookie or a bearer
/// `Authorization` header.
#[must_use]
pub fn session_token(headers: &http::HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE || *name == SECURE_SESSION_COOKIE)
        .map(|(_, value)| value.to_owned());

    from_cookie.or_else(|| {
        headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(|t| t.trim().to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(http::header::HeaderName, &'static str)]) -> http::HeaderMap {
        let mut map = http::HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), http::HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_should_extract_token_from_cookie() {
        let h = headers(&[(
            http::header::COOKIE,
            "theme=dark; better-auth.session_token=abc.def; other=1",
        )]);
        assert_eq!(session_token(&h).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_should_extract_token_from_secure_cookie() {
        let h = headers(&[(
            http::header::COOKIE,
            "__Secure-better-auth.session_token=sec",
        )]);
        assert_eq!(session_token(&h).as_deref(), Some("sec"));
    }

    #[test]
    fn test_should_fall_back_to_bearer_token() {
        let h = headers(&[(http::header::AUTHORIZATION, "Bearer tok-1")]);
        assert_eq!(session_token(&h).as_deref(), Some("tok-1"));
        assert!(session_token(&http::HeaderMap::new()).is_none());
    }

    #[test]
    fn test_should_identify_admin_role() {
        assert!(SessionUser::new("u1", "admin").is_admin());
        assert!(!SessionUser::new("u2", "editor").is_admin());
        assert!(!SessionUser::new("u3", "Admin").is_admin());
    }

    #[test]
    fn test_should_deserialize_session_payload() {
        let raw = r#"{"session":{"id":"s1"},"user":{"id":"u1","role":"admin","email":"a@studio.example"}}"#;
        let session: Session = serde_json::from_str(raw).unwrap();
        assert_eq!(session.user.id, "u1");
        assert!(session.user.is_admin());
        assert_eq!(session.user.email.as_deref(), Some("a@studio.example"));
    }

    #[tokio::test]
    async fn test_should_resolve_known_token() {
        let resolver =
            StaticSessionResolver::new(vec![("tok".to_owned(), SessionUser::new("u1", "admin"))]);
        let h = headers(&[(http::header::COOKIE, "better-auth.session_token=tok")]);
        let session = resolver.resolve(&h).await.unwrap().unwrap();
        assert_eq!(session.user.id, "u1");

        let unknown = headers(&[(http::header::COOKIE, "better-auth.session_token=nope")]);
        assert!(resolver.resolve(&unknown).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_should_never_resolve_without_service() {
        let h = headers(&[(http::header::COOKIE, "better-auth.session_token=tok")]);
        assert!(NoSessionResolver.resolve(&h).await.unwrap().is_none());
    }
}

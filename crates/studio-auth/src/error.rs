//! Error types for request authorization.
//!
//! Every failure is terminal for the request. [`AuthError::status_code`] and
//! [`AuthError::client_message`] give the response the HTTP layer sends back;
//! the `Display` text carries more detail and is meant for logs.

/// Errors that can occur while authorizing a protected request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No admin session, not a trusted-origin GET, and the signature headers
    /// or the shared secret are absent.
    #[error("Unauthorized: Protected API")]
    MissingCredentials,

    /// The supplied signature does not match the recomputed value.
    #[error("Unauthorized: Invalid API signature")]
    InvalidSignature,

    /// The timestamp is unparseable or outside the accepted window.
    #[error("Invalid request timestamp: {0}")]
    InvalidTimestamp(String),

    /// The session service failed and the failure policy is closed.
    #[error("Session resolution failed: {0}")]
    SessionResolution(String),

    /// Unexpected failure while authorizing.
    #[error("Internal authorization error: {0}")]
    Internal(String),
}

impl AuthError {
    /// HTTP status code for this failure.
    #[must_use]
    pub fn status_code(&self) -> http::StatusCode {
        match self {
            Self::MissingCredentials | Self::InvalidSignature | Self::InvalidTimestamp(_) => {
                http::StatusCode::UNAUTHORIZED
            }
            Self::SessionResolution(_) | Self::Internal(_) => {
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the caller.
    #[must_use]
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "Unauthorized: Protected API",
            Self::InvalidSignature | Self::InvalidTimestamp(_) => {
                "Unauthorized: Invalid API signature"
            }
            Self::SessionResolution(_) | Self::Internal(_) => "Internal authorization error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_map_credential_failures_to_unauthorized() {
        assert_eq!(
            AuthError::MissingCredentials.status_code(),
            http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidSignature.status_code(),
            http::StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidTimestamp("stale".to_owned()).client_message(),
            "Unauthorized: Invalid API signature"
        );
    }

    #[test]
    fn test_should_hide_internal_details_from_client() {
        let err = AuthError::SessionResolution("connection refused".to_owned());
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.client_message(), "Internal authorization error");
        assert!(err.to_string().contains("connection refused"));
    }
}

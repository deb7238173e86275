//! Shared type definitions used across the studio crates.

use std::fmt;
use std::str::FromStr;

use crate::StudioError;

/// Symmetric key shared by the request signer and the verifier.
///
/// The secret is provisioned out-of-band through configuration and never
/// leaves the process. Its `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Create a secret from raw bytes.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Build a secret from an optional configuration value.
    ///
    /// An absent or empty value means no secret is configured.
    #[must_use]
    pub fn from_config(value: Option<String>) -> Option<Self> {
        value
            .filter(|v| !v.is_empty())
            .map(|v| Self(v.into_bytes()))
    }

    /// The raw key bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// What to do when the session service cannot be reached or returns an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionFailurePolicy {
    /// Treat the failure as "no session" and continue with the origin and
    /// signature checks.
    #[default]
    Open,
    /// Reject the request with an internal authorization error.
    Closed,
}

impl SessionFailurePolicy {
    /// The policy name as used in configuration.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl FromStr for SessionFailurePolicy {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(StudioError::Config(format!(
                "invalid session failure policy: {other} (expected `open` or `closed`)"
            ))),
        }
    }
}

impl fmt::Display for SessionFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

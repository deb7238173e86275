//! Configuration management for the studio API.
//!
//! All configuration is driven by environment variables and read once at
//! startup. Nothing here is reloaded while the process runs.

use std::time::Duration;

use crate::types::{SessionFailurePolicy, SharedSecret};
use crate::{StudioError, StudioResult};

/// Default bound on a session lookup.
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_millis(3000);

/// Global configuration for the studio API server.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Bind address for the API server.
    pub listen: String,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Secret shared with internal callers that sign their requests.
    pub signing_secret: Option<SharedSecret>,
    /// Origin of the browser frontend allowed to issue unsigned GETs.
    pub frontend_url: Option<String>,
    /// Base URL of the session service.
    pub auth_base_url: Option<String>,
    /// Upper bound on a single session lookup.
    pub session_timeout: Duration,
    /// Behaviour when the session lookup fails.
    pub session_failure_policy: SessionFailurePolicy,
    /// Maximum accepted age of a signed request. `None` disables the check.
    pub signature_max_age: Option<Duration>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".to_owned(),
            log_level: "info".to_owned(),
            signing_secret: None,
            frontend_url: None,
            auth_base_url: None,
            session_timeout: DEFAULT_SESSION_TIMEOUT,
            session_failure_policy: SessionFailurePolicy::default(),
            signature_max_age: None,
        }
    }
}

impl StudioConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> StudioResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StudioResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("STUDIO_LISTEN") {
            config.listen = v;
        }
        if let Some(v) = get("LOG_LEVEL") {
            config.log_level = v;
        }
        config.signing_secret = SharedSecret::from_config(get("API_SIGNING_SECRET"));
        config.frontend_url = get("FRONTEND_URL");
        config.auth_base_url = get("AUTH_BASE_URL");
        if let Some(v) = get("SESSION_TIMEOUT_MS") {
            config.session_timeout = parse_millis("SESSION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("SESSION_FAILURE_POLICY") {
            config.session_failure_policy = v.parse()?;
        }
        if let Some(v) = get("API_SIGNATURE_MAX_AGE_MS") {
            config.signature_max_age = Some(parse_millis("API_SIGNATURE_MAX_AGE_MS", &v)?);
        }

        Ok(config)
    }
}

fn parse_millis(key: &str, value: &str) -> StudioResult<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| StudioError::Config(format!("{key}: invalid milliseconds `{value}`: {e}")))
}

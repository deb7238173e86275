//! Error types for the studio core.

/// Core error type for studio infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// A configuration value could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

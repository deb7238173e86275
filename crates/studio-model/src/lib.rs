//! Operation and error types for the studio protected API.
//!
//! The protected API covers the site-wide settings documents (general and
//! email configuration) and per-page SEO settings. This crate holds the types
//! shared between the HTTP layer and the handler implementation.

pub mod error;
pub mod operations;

pub use error::{ApiError, ApiErrorCode};
pub use operations::{SettingsOperation, SettingsScope};

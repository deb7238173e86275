//! Core types, configuration, and state management for the studio API.
//!
//! This crate provides the foundational building blocks shared by the auth,
//! HTTP, and server crates: environment-driven configuration, the shared
//! signing secret, the session failure policy, and a concurrent document store.

mod config;
mod error;
mod state;
mod types;

pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};
pub use state::DocumentStore;
pub use types::{SessionFailurePolicy, SharedSecret};

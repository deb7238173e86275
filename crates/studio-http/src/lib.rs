//! HTTP service layer for the studio protected API.
//!
//! This crate puts the three-path authorizer in front of the settings and
//! SEO routes:
//!
//! - **Router**: Matches the mount prefix and relative path to an operation
//! - **Authorization**: Runs [`studio_auth::Authorizer`] over the method and
//!   the reconstructed path
//! - **Handler trait**: Defines the boundary between HTTP and storage
//! - **Service**: Hyper `Service` implementation
//! - **Response helpers**: JSON success/error response formatting
#![allow(missing_docs)]

pub mod body;
pub mod dispatch;
pub mod response;
pub mod router;
pub mod service;

pub use body::ApiResponseBody;
pub use dispatch::{RequestContext, SettingsHandler};
pub use router::{RouteMatch, resolve_route};
pub use service::{ProtectedApiConfig, ProtectedApiService};

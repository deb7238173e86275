//! HMAC request signing and authorization for the studio API.
//!
//! Protected routes (general settings, email settings, SEO updates) accept a
//! request through one of three paths, evaluated in order:
//!
//! 1. an authenticated admin session resolved by a [`SessionResolver`],
//! 2. a `GET` coming from the trusted browser frontend ([`TrustedOrigin`]),
//! 3. an HMAC-SHA256 signature carried in the `x-signature` and
//!    `x-timestamp` headers.
//!
//! The signature is computed over
//!
//! ```text
//! <METHOD_UPPERCASE>:<canonical path>:<timestamp>
//! ```
//!
//! where the canonical path has its query string removed, is lower-cased, and
//! loses a single trailing slash. Server-side callers attach signatures with a
//! [`Signer`]; the API verifies them through the [`Authorizer`].
//!
//! # Usage
//!
//! ```rust
//! use studio_auth::{Signer, SignatureVerifier};
//! use studio_core::SharedSecret;
//!
//! let secret = SharedSecret::new("s3cr3t");
//! let headers = Signer::new(secret.clone()).signature_headers_at("POST", "/api/seo/home", 1_700_000_000_000);
//!
//! let verifier = SignatureVerifier::new(Some(secret));
//! assert!(verifier
//!     .verify("POST", "/API/SEO/Home/", Some(&headers.signature), Some(&headers.timestamp))
//!     .is_ok());
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Path canonicalization and payload construction
//! - [`signing`] - HMAC computation and the request [`Signer`]
//! - [`verify`] - Signature verification with constant-time comparison
//! - [`origin`] - Trusted frontend origin matching
//! - [`session`] - Session resolver trait and in-process implementations
//! - [`remote`] - Session resolver backed by the external auth service
//! - [`authorizer`] - The three-path authorization decision
//! - [`error`] - Authorization error types

pub mod authorizer;
pub mod canonical;
pub mod error;
pub mod origin;
pub mod remote;
pub mod session;
pub mod signing;
pub mod verify;

pub use authorizer::{AuthPath, Authorization, Authorizer};
pub use canonical::{build_payload, canonicalize_path};
pub use error::AuthError;
pub use origin::TrustedOrigin;
pub use remote::RemoteSessionResolver;
pub use session::{NoSessionResolver, Session, SessionResolver, SessionUser, StaticSessionResolver};
pub use signing::{SIGNATURE_HEADER, SignatureHeaders, Signer, TIMESTAMP_HEADER, sign};
pub use verify::{SignatureVerifier, verify_signature};

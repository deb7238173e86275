//! Settings handler trait and operation dispatch.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use studio_auth::Authorization;
use studio_model::error::ApiError;
use studio_model::operations::SettingsOperation;

use crate::body::ApiResponseBody;

/// Per-request data handed to the handler alongside the body.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Identifier echoed in the `x-request-id` response header.
    pub request_id: String,
    /// How the request was authorized. Carries the admin user for
    /// session-authorized requests.
    pub authorization: Authorization,
    /// Page key for per-page SEO operations.
    pub page: Option<String>,
}

impl RequestContext {
    /// Id of the admin user behind the request, if it came through the
    /// session path.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.authorization.user.as_ref().map(|u| u.id.as_str())
    }
}

/// Trait that the settings storage backend must implement.
///
/// The handler receives an authorized operation, the request context, and
/// the raw JSON body bytes, and returns a complete HTTP response.
pub trait SettingsHandler: Send + Sync + 'static {
    /// Handle an operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: SettingsOperation,
        ctx: RequestContext,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<ApiResponseBody>, ApiError>> + Send>>;
}

/// Dispatch an operation to the handler.
pub async fn dispatch_operation<H: SettingsHandler>(
    handler: &H,
    op: SettingsOperation,
    ctx: RequestContext,
    body: Bytes,
) -> Result<http::Response<ApiResponseBody>, ApiError> {
    tracing::debug!(operation = %op, via = ctx.authorization.via.as_str(), "dispatching operation");
    handler.handle_operation(op, ctx, body).await
}

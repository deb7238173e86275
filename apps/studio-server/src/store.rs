//! In-memory settings backend.
//!
//! General and email settings are single documents; SEO settings are one
//! document per page. Every document is a JSON object.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use serde_json::{Map, Value};

use studio_auth::AuthPath;
use studio_core::DocumentStore;
use studio_http::response::json_response;
use studio_http::{ApiResponseBody, RequestContext, SettingsHandler};
use studio_model::{ApiError, SettingsOperation, SettingsScope};

/// Field holding the RFC 3339 time of the last update.
const UPDATED_AT: &str = "updatedAt";

/// Field holding the id of the admin who made the last update.
const LAST_UPDATED_BY: &str = "lastUpdatedBy";

/// Settings documents held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct SettingsStore {
    settings: DocumentStore<Value>,
    seo: DocumentStore<Value>,
}

impl SettingsStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get_settings(&self, scope: SettingsScope) -> Value {
        self.settings
            .get(scope.as_str())
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    fn list_seo(&self) -> Value {
        Value::Array(
            self.seo
                .entries()
                .into_iter()
                .map(|(page, doc)| with_page(page, doc))
                .collect(),
        )
    }

    fn get_seo(&self, page: &str) -> Result<Value, ApiError> {
        self.seo
            .get(page)
            .map(|doc| with_page(page.to_owned(), doc))
            .ok_or_else(|| ApiError::not_found(format!("SEO settings not found for page: {page}")))
    }

    fn update(
        store: &DocumentStore<Value>,
        key: &str,
        fields: Map<String, Value>,
        ctx: &RequestContext,
    ) -> Value {
        let now = chrono::Utc::now().to_rfc3339();
        let updated_by = match ctx.authorization.via {
            AuthPath::Session => ctx.user_id().map(str::to_owned),
            AuthPath::TrustedOrigin | AuthPath::Signature => None,
        };

        store.upsert_with(
            key,
            || Value::Object(Map::new()),
            |doc| {
                if !doc.is_object() {
                    *doc = Value::Object(Map::new());
                }
                if let Value::Object(map) = doc {
                    map.extend(fields);
                    map.insert(UPDATED_AT.to_owned(), Value::String(now));
                    if let Some(user_id) = updated_by {
                        map.insert(LAST_UPDATED_BY.to_owned(), Value::String(user_id));
                    }
                }
            },
        )
    }

    /// Run one operation against the store.
    fn execute(
        &self,
        op: SettingsOperation,
        ctx: &RequestContext,
        body: &[u8],
    ) -> Result<Value, ApiError> {
        match op {
            SettingsOperation::GetGeneralSettings | SettingsOperation::GetEmailSettings => {
                Ok(self.get_settings(op.scope()))
            }
            SettingsOperation::UpdateGeneralSettings | SettingsOperation::UpdateEmailSettings => {
                let fields = parse_object(body)?;
                tracing::info!(scope = %op.scope(), via = ctx.authorization.via.as_str(), "updating settings");
                Ok(Self::update(&self.settings, op.scope().as_str(), fields, ctx))
            }
            SettingsOperation::ListSeoSettings => Ok(self.list_seo()),
            SettingsOperation::GetSeoSettings => self.get_seo(page(ctx)?),
            SettingsOperation::UpdateSeoSettings => {
                let page = page(ctx)?;
                let fields = parse_object(body)?;
                tracing::info!(page, via = ctx.authorization.via.as_str(), "updating SEO settings");
                let doc = Self::update(&self.seo, page, fields, ctx);
                Ok(with_page(page.to_owned(), doc))
            }
        }
    }
}

/// Handler that serves settings operations from a [`SettingsStore`].
#[derive(Debug, Clone)]
pub struct SettingsStoreHandler {
    store: Arc<SettingsStore>,
}

impl SettingsStoreHandler {
    /// Create a new handler wrapping a store.
    #[must_use]
    pub fn new(store: Arc<SettingsStore>) -> Self {
        Self { store }
    }
}

impl SettingsHandler for SettingsStoreHandler {
    fn handle_operation(
        &self,
        op: SettingsOperation,
        ctx: RequestContext,
        body: Bytes,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<ApiResponseBody>, ApiError>> + Send>>
    {
        let store = Arc::clone(&self.store);
        Box::pin(async move {
            let data = store.execute(op, &ctx, &body)?;
            Ok(json_response(http::StatusCode::OK, &data, &ctx.request_id))
        })
    }
}

fn page(ctx: &RequestContext) -> Result<&str, ApiError> {
    ctx.page
        .as_deref()
        .ok_or_else(|| ApiError::validation("Missing page parameter"))
}

/// Parse an update body, which must be a JSON object.
fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::validation("Request body must be a JSON object")),
        Err(e) => Err(ApiError::validation(format!("Invalid JSON body: {e}")).with_source(e)),
    }
}

/// Return `doc` with its page key in the `page` field.
fn with_page(page: String, mut doc: Value) -> Value {
    if let Value::Object(map) = &mut doc {
        map.insert("page".to_owned(), Value::String(page));
    }
    doc
}

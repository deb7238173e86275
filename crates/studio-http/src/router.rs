//! Protected API request router.
//!
//! Routes live under two mount prefixes:
//!
//! ```text
//! /api/settings  /general  GET | PUT
//!                /email    GET | PUT
//! /api/seo       /         GET
//!                /:page    GET | PUT | POST
//! ```
//!
//! The router keeps the mount prefix and the relative path apart, the same
//! way a mounted sub-router sees them. [`RouteMatch::full_path`] joins them
//! back together for signature verification; canonicalization makes the
//! result agree with whatever path the signer used.

use studio_model::error::ApiError;
use studio_model::operations::SettingsOperation;

/// Mount prefix of the general and email settings routes.
pub const SETTINGS_MOUNT: &str = "/api/settings";

/// Mount prefix of the SEO routes.
pub const SEO_MOUNT: &str = "/api/seo";

/// A request matched to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The resolved operation.
    pub operation: SettingsOperation,
    /// Mount prefix as it appeared in the request.
    pub mount: String,
    /// Path below the mount prefix as it appeared in the request; `/` for the
    /// mount root.
    pub relative: String,
    /// Lower-cased page key for per-page SEO operations.
    pub page: Option<String>,
}

impl RouteMatch {
    /// The request path rebuilt from mount prefix and relative path.
    #[must_use]
    pub fn full_path(&self) -> String {
        format!("{}{}", self.mount, self.relative)
    }
}

/// Resolve an operation from the request method and path.
///
/// Matching ignores case and a single trailing slash. The path must not
/// contain a query string.
pub fn resolve_route(method: &http::Method, path: &str) -> Result<RouteMatch, ApiError> {
    let (mount, relative) =
        split_mount(path).ok_or_else(|| ApiError::route_not_found(path))?;

    let normalized = normalize_relative(relative);
    let (operation, page) = if mount.eq_ignore_ascii_case(SETTINGS_MOUNT) {
        (settings_operation(method, path, &normalized)?, None)
    } else {
        seo_operation(method, path, &normalized)?
    };

    Ok(RouteMatch {
        operation,
        mount: mount.to_owned(),
        relative: if relative.is_empty() {
            "/".to_owned()
        } else {
            relative.to_owned()
        },
        page,
    })
}

/// Split `path` into a known mount prefix and the remainder.
fn split_mount(path: &str) -> Option<(&str, &str)> {
    [SETTINGS_MOUNT, SEO_MOUNT].into_iter().find_map(|mount| {
        let head = path.get(..mount.len())?;
        if !head.eq_ignore_ascii_case(mount) {
            return None;
        }
        let rest = &path[mount.len()..];
        (rest.is_empty() || rest.starts_with('/')).then_some((head, rest))
    })
}

/// Lower-case the relative path and drop a single trailing slash.
fn normalize_relative(relative: &str) -> String {
    let mut normalized = relative.to_lowercase();
    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

fn settings_operation(
    method: &http::Method,
    path: &str,
    relative: &str,
) -> Result<SettingsOperation, ApiError> {
    let (get, update) = match relative {
        "/general" => (
            SettingsOperation::GetGeneralSettings,
            SettingsOperation::UpdateGeneralSettings,
        ),
        "/email" => (
            SettingsOperation::GetEmailSettings,
            SettingsOperation::UpdateEmailSettings,
        ),
        _ => return Err(ApiError::route_not_found(path)),
    };

    match *method {
        http::Method::GET => Ok(get),
        http::Method::PUT => Ok(update),
        _ => Err(ApiError::method_not_allowed(method, path)),
    }
}

fn seo_operation(
    method: &http::Method,
    path: &str,
    relative: &str,
) -> Result<(SettingsOperation, Option<String>), ApiError> {
    if relative == "/" {
        return match *method {
            http::Method::GET => Ok((SettingsOperation::ListSeoSettings, None)),
            _ => Err(ApiError::method_not_allowed(method, path)),
        };
    }

    let page = relative.trim_start_matches('/');
    if page.is_empty() || page.contains('/') {
        return Err(ApiError::route_not_found(path));
    }

    let operation = match *method {
        http::Method::GET => SettingsOperation::GetSeoSettings,
        http::Method::PUT | http::Method::POST => SettingsOperation::UpdateSeoSettings,
        _ => return Err(ApiError::method_not_allowed(method, path)),
    };
    Ok((operation, Some(page.to_owned())))
}

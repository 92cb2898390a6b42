//! Request logging, catalog write metrics and response hardening.

use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use super::AppState;
use super::auth::AdminUser;

const REQUEST_ID_HEADER: &str = "x-request-id";
const MAX_REQUEST_ID_LEN: usize = 64;

/// Hosted image names are unique per upload, so cached copies never go stale.
const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Part of the service a request is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Storefront,
    Admin,
    Auth,
    System,
    Images,
    Other,
}

impl Surface {
    fn of(path: &str, image_prefix: &str) -> Self {
        let image_prefix = image_prefix.trim_end_matches('/');
        let under = |prefix: &str| {
            path.strip_prefix(prefix)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
        };

        if under("/api/admin") {
            Self::Admin
        } else if under("/api/auth") {
            Self::Auth
        } else if under("/api/system") {
            Self::System
        } else if under("/api/products") {
            Self::Storefront
        } else if !image_prefix.is_empty() && under(image_prefix) {
            Self::Images
        } else {
            Self::Other
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Storefront => "storefront",
            Self::Admin => "admin",
            Self::Auth => "auth",
            Self::System => "system",
            Self::Images => "images",
            Self::Other => "other",
        }
    }

    /// Responses that depend on the admin session must never be cached.
    const fn is_private(self) -> bool {
        matches!(self, Self::Admin | Self::Auth)
    }
}

/// Admin write a request performs on the catalog, if any.
fn catalog_write(method: &Method, route: Option<&str>) -> Option<&'static str> {
    match (method, route?) {
        (&Method::POST, "/api/admin/products") => Some("create"),
        (&Method::PUT, "/api/admin/products/{id}") => Some("update"),
        (&Method::DELETE, "/api/admin/products/{id}") => Some("delete"),
        _ => None,
    }
}

/// The `{id}` segment of a product route.
fn product_id<'a>(route: Option<&str>, path: &'a str) -> Option<&'a str> {
    route
        .filter(|r| r.ends_with("/products/{id}"))
        .and_then(|_| path.rsplit('/').next())
        .filter(|id| !id.is_empty())
}

/// Reuses a caller-supplied request id when it is short and printable.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string)
}

/// `GET /api/admin/metrics`
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Response {
    state.prometheus_handle.as_ref().map_or_else(
        || (StatusCode::NOT_FOUND, "Metrics are disabled").into_response(),
        |handle| handle.render().into_response(),
    )
}

pub async fn logging_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(req.headers());

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string());
    let surface = Surface::of(&path, &state.config.images.public_prefix);
    let write = catalog_write(&method, route.as_deref());

    let body_bytes = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        route = route.as_deref(),
        surface = surface.as_str(),
        product_id = product_id(route.as_deref(), &path),
        admin_user = tracing::field::Empty,
    );

    async move {
        let mut response = next.run(req).await;
        let status = response.status();

        if let Some(AdminUser(user)) = response.extensions().get::<AdminUser>() {
            tracing::Span::current().record("admin_user", user.as_str());
        }

        // Route templates keep label cardinality bounded; raw paths carry ids.
        let labels = [
            ("method", method.to_string()),
            ("route", route.clone().unwrap_or_else(|| "unmatched".to_string())),
            ("surface", surface.as_str().to_string()),
            ("status", status.as_u16().to_string()),
        ];
        metrics::counter!("http_requests_total", &labels).increment(1);
        metrics::histogram!("http_request_duration_seconds", &labels)
            .record(start.elapsed().as_secs_f64());

        if let Some(operation) = write {
            let outcome = if status.is_success() { "ok" } else { "rejected" };
            metrics::counter!(
                "catalog_admin_writes_total",
                "operation" => operation,
                "outcome" => outcome
            )
            .increment(1);
            if let Some(bytes) = body_bytes {
                // Inline images dominate submission size.
                #[allow(clippy::cast_precision_loss)]
                metrics::histogram!("catalog_submission_bytes", "operation" => operation)
                    .record(bytes as f64);
            }
        }

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        info!(
            event = "http_request_finished",
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            status_code = status.as_u16(),
            catalog_write = write,
            body_bytes,
            "Request finished"
        );

        response
    }
    .instrument(span)
    .await
}

/// Adds hardening headers chosen by surface. Served images are cached for
/// good; everything else gets a locked-down CSP.
pub async fn security_headers_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let surface = Surface::of(req.uri().path(), &state.config.images.public_prefix);

    let mut response = next.run(req).await;
    let served = response.status().is_success();
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    match surface {
        Surface::Images if served => {
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(IMAGE_CACHE_CONTROL),
            );
        }
        Surface::Images => {}
        _ => {
            headers.insert(
                header::CONTENT_SECURITY_POLICY,
                HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
            );
            if surface.is_private() {
                headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_classification() {
        assert_eq!(Surface::of("/api/products", "/images"), Surface::Storefront);
        assert_eq!(Surface::of("/api/products/abc", "/images"), Surface::Storefront);
        assert_eq!(Surface::of("/api/admin/products", "/images"), Surface::Admin);
        assert_eq!(Surface::of("/api/auth/me", "/images"), Surface::Auth);
        assert_eq!(Surface::of("/api/system/health/live", "/images"), Surface::System);
        assert_eq!(Surface::of("/images/a.png", "/images/"), Surface::Images);
        assert_eq!(Surface::of("/imagesx/a.png", "/images"), Surface::Other);
        assert_eq!(Surface::of("/api/productsx", "/images"), Surface::Other);
    }

    #[test]
    fn test_catalog_write_detection() {
        let item = Some("/api/admin/products/{id}");
        assert_eq!(catalog_write(&Method::POST, Some("/api/admin/products")), Some("create"));
        assert_eq!(catalog_write(&Method::PUT, item), Some("update"));
        assert_eq!(catalog_write(&Method::DELETE, item), Some("delete"));
        assert_eq!(catalog_write(&Method::GET, Some("/api/admin/products")), None);
        assert_eq!(catalog_write(&Method::POST, None), None);
    }

    #[test]
    fn test_product_id_from_route() {
        assert_eq!(
            product_id(Some("/api/products/{id}"), "/api/products/42"),
            Some("42")
        );
        assert_eq!(
            product_id(Some("/api/admin/products/{id}"), "/api/admin/products/abc"),
            Some("abc")
        );
        assert_eq!(product_id(Some("/api/products"), "/api/products"), None);
        assert_eq!(product_id(None, "/api/products/42"), None);
    }

    #[test]
    fn test_request_id_reuse() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("trace-123_a"));
        assert_eq!(request_id(&headers), "trace-123_a");

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("bad id!"));
        let generated = request_id(&headers);
        assert_ne!(generated, "bad id!");
        assert!(Uuid::parse_str(&generated).is_ok());
    }
}

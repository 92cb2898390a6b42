use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{Config, ImageBackend};
use crate::constants::images::MAX_PER_PRODUCT;
use crate::db::{self, ProductStore};
use crate::services::{AuthService, CatalogService, DefaultAuthService, DefaultCatalogService};
use crate::storage::{self, ObjectStore};

mod admin;
pub mod auth;
mod error;
mod observability;
mod products;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub catalog: Arc<dyn CatalogService>,

    pub auth: Arc<dyn AuthService>,

    pub products: Arc<dyn ProductStore>,

    pub images: Arc<dyn ObjectStore>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let stores = db::open(&config.storage).await?;
    let images = storage::create_object_store(&config.images).await?;

    let catalog = Arc::new(DefaultCatalogService::new(
        stores.products.clone(),
        images.clone(),
    ));
    let auth = Arc::new(DefaultAuthService::new(
        stores.credentials,
        config.security.clone(),
    ));

    Ok(Arc::new(AppState {
        config: Arc::new(config),
        catalog,
        auth,
        products: stores.products,
        images,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config.server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )));

    let api_router = Router::new()
        .merge(create_protected_router(state.config.images.max_image_bytes))
        .route("/products", get(products::list_products))
        .route("/products/featured", get(products::featured_products))
        .route("/products/new-arrivals", get(products::new_arrivals))
        .route("/products/{id}", get(products::get_product))
        .route("/system/health/live", get(system::health_live))
        .route("/system/health/ready", get(system::health_ready))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .layer(session_layer)
        .with_state(state.clone());

    let cors_origins = &server.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
    }
    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
    .allow_headers([header::CONTENT_TYPE]);

    let mut app = Router::new().nest("/api", api_router);

    if state.config.images.backend == ImageBackend::Local {
        let prefix = state.config.images.public_prefix.trim_end_matches('/');
        app = app.nest_service(prefix, ServeDir::new(&state.config.images.local_path));
    }

    app.layer(cors_layer)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            observability::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            state,
            observability::logging_middleware,
        ))
}

/// Largest admin body: every image at the size limit, base64-encoded,
/// plus room for the other fields.
fn submission_body_limit(max_image_bytes: usize) -> usize {
    max_image_bytes
        .saturating_mul(MAX_PER_PRODUCT)
        .saturating_mul(4)
        / 3
        + 64 * 1024
}

fn create_protected_router(max_image_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/admin/credentials", put(auth::change_credentials))
        .route("/admin/metrics", get(observability::get_metrics))
        .route("/auth/me", get(auth::get_current_user))
        .route_layer(middleware::from_fn(auth::auth_middleware))
        .layer(DefaultBodyLimit::max(submission_body_limit(max_image_bytes)))
}

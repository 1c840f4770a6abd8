//! # salon_api
//!
//! HTTP API library for the salon admin backend.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::http::header::X_CONTENT_TYPE_OPTIONS;
use axum::routing::{delete, get, patch, post};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeader;
use tower_http::trace::TraceLayer;

use salon_core::store::{AdminUserStore, AuditLog, ServiceCatalog};

use crate::config::ApiConfig;
use crate::handlers::{audit, auth, catalog, health, users};
use crate::services::rate_limit::RateLimiter;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn AdminUserStore>,
    pub audit: Arc<dyn AuditLog>,
    pub catalog: Arc<dyn ServiceCatalog>,
    /// API configuration.
    pub config: ApiConfig,
    /// Throttles `POST /admin/login` per source address and email.
    pub login_limiter: RateLimiter,
}

impl AppState {
    /// Build state over a single store backing every persistence seam.
    pub fn new<S>(store: Arc<S>, config: ApiConfig) -> Self
    where
        S: AdminUserStore + AuditLog + ServiceCatalog + 'static,
    {
        let login_limiter = RateLimiter::new(config.login_rate_limit, config.login_rate_window);
        Self {
            users: store.clone(),
            audit: store.clone(),
            catalog: store,
            config,
            login_limiter,
        }
    }
}

/// Run embedded database migrations.
///
/// Delegates to `salon_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    salon_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::GET_API_HEALTH, get(health::health_handler))
        .route(routes::POST_ADMIN_LOGIN, post(auth::login_handler))
        .route(routes::GET_SERVICES, get(catalog::list_services_handler))
        .route(routes::GET_SERVICES_ID, get(catalog::get_service_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_ADMIN_ME, get(auth::me_handler))
        .route(
            routes::ADMIN_USERS,
            post(users::create_user_handler).get(users::list_users_handler),
        )
        .route(
            routes::PATCH_ADMIN_USERS_ID,
            patch(users::update_user_handler),
        )
        .route(
            routes::GET_ADMIN_AUDIT_LOGS,
            get(audit::list_audit_logs_handler),
        )
        .route(
            routes::POST_ADMIN_SERVICES,
            post(catalog::create_service_handler)
                .layer(DefaultBodyLimit::max(state.config.service_body_limit())),
        )
        .route(
            routes::DELETE_ADMIN_SERVICES_ID,
            delete(catalog::delete_service_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    // Browsers must not reinterpret stored files as anything but their type.
    let uploads = SetResponseHeader::overriding(
        ServeDir::new(&state.config.upload_dir),
        X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    Router::new()
        .merge(public)
        .merge(protected)
        .nest_service(routes::UPLOADS, uploads)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

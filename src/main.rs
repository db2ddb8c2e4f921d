//! Micaela Modista web gateway
//!
//! Serves the course catalog, inscription and payment flows, and the admin
//! back-office on top of the course backend's REST API.

mod api;
mod auth;
mod backend;
mod config;
mod errors;
mod listing;
mod models;
mod schedule;
mod search;
mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::SubmissionGuard;
use backend::{BackendApi, HttpBackend};
use config::Config;
use search::SearchCoalescer;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn BackendApi>,
    pub config: Arc<Config>,
    pub search: Arc<SearchCoalescer>,
    pub submissions: Arc<SubmissionGuard>,
}

impl AppState {
    pub fn new(backend: Arc<dyn BackendApi>, config: Config) -> Self {
        Self {
            backend,
            search: Arc::new(SearchCoalescer::new(config.search_debounce)),
            submissions: Arc::new(SubmissionGuard::default()),
            config: Arc::new(config),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Modista web gateway");
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_secret.is_none() {
        tracing::warn!("No admin secret configured (MODISTA_ADMIN_SECRET). Legacy admin view is disabled");
    } else {
        tracing::warn!("Legacy admin view enabled. The shared secret is not a security boundary");
    }
    if config.payment_public_key.is_none() {
        tracing::warn!("No payment public key configured (MODISTA_PAYMENT_PUBLIC_KEY). Checkout is disabled");
    }

    let backend = HttpBackend::new(&config.backend_url, config.request_timeout)?;
    tracing::info!("Backend URL: {}", backend.base_url());
    let bind_addr = config.bind_addr;
    let state = AppState::new(Arc::new(backend), config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public site routes
    let public_routes = Router::new()
        .route("/catalog", get(api::list_catalog))
        .route("/catalog/{id}", get(api::get_course_detail))
        .route("/catalog/paid/{title}", get(api::get_course_paid))
        .route("/courses/{course_id}/turnos", get(api::get_turno_picker))
        .route("/inscriptions", post(api::submit_inscription))
        .route("/payment/preference", post(api::create_checkout))
        .route("/payment/data", get(api::get_payment_data))
        .route("/testimonials", get(api::list_testimonials))
        .route("/tariffs", get(api::list_tariffs))
        .route("/tariffs/meta", get(api::get_tariffs_meta))
        .route("/tariffs/search", get(api::search_tariffs))
        .route("/site/config", get(api::get_site_config))
        .route("/auth/login", post(api::login))
        .route("/auth/register", post(api::register));

    // Back-office routes, bearer token required
    let admin_routes = Router::new()
        // Courses
        .route(
            "/courses",
            get(api::list_admin_courses).post(api::create_course),
        )
        .route(
            "/courses/{id}",
            put(api::update_course).delete(api::delete_course),
        )
        // Turnos
        .route("/courses/{id}/turnos", get(api::get_schedule))
        .route("/turnos", post(api::create_turno))
        .route("/turnos/{id}/block", patch(api::toggle_turno_block))
        .route("/turnos/{id}", delete(api::delete_turno))
        // Inscriptions
        .route("/inscriptions", get(api::list_inscriptions))
        .route(
            "/inscriptions/live-search",
            get(api::live_search_inscriptions),
        )
        .route("/inscriptions/count", get(api::count_inscriptions))
        .route("/inscriptions/export", get(api::export_inscriptions))
        .route(
            "/inscriptions/{id}/payment-status",
            patch(api::update_payment_status),
        )
        .route("/inscriptions/{id}/deposit", patch(api::register_deposit))
        // Workshops
        .route(
            "/workshops/{workshop_id}/inscriptions",
            get(api::list_workshop_inscriptions),
        )
        .route(
            "/workshops/{workshop_id}/details",
            get(api::get_workshop_roster),
        )
        .route(
            "/workshop-inscriptions/{id}/available-turnos",
            get(api::get_available_turnos),
        )
        .route(
            "/workshop-inscriptions/{id}/schedule",
            put(api::reschedule_inscription),
        )
        .route_layer(middleware::from_fn(auth::require_bearer));

    // Legacy view: shared secret checked after the bearer token
    let admin_secret = state.config.admin_secret.clone();
    let legacy_routes = Router::new()
        .route("/inscriptions", get(api::legacy_inscriptions))
        .route_layer(middleware::from_fn(move |req, next| {
            auth::admin_secret_gate(admin_secret.clone(), req, next)
        }))
        .route_layer(middleware::from_fn(auth::require_bearer));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", public_routes.nest("/admin", admin_routes))
        .nest("/legacy", legacy_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;

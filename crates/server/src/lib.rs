//! ficha-server library crate
//!
//! Exposes `AppState`, `build_app` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod config;
pub mod db;
mod error;
mod middleware;
pub mod report;
mod routes;

use std::sync::Arc;

use axum::{Extension, Router, middleware as axum_mw, routing::get};
use ficha_core::{
    BloodTypeStore, GenderStore, NumberSource, PatientStore, RandomNumberSource, ReportRenderer,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use middleware::ApiKeyAuth;
use report::HttpReportRenderer;

pub use error::ErrorBody;

/// Collaborators shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<dyn PatientStore>,
    pub genders: Arc<dyn GenderStore>,
    pub blood_types: Arc<dyn BloodTypeStore>,
    pub numbers: Arc<dyn NumberSource>,
    pub max_number_attempts: u32,
    /// `None` when no report server is configured
    pub renderer: Option<Arc<dyn ReportRenderer>>,
}

impl AppState {
    /// State over a single store holding all three tables.
    ///
    /// Patient numbers come from the OS random source; the renderer is built
    /// from `config.report` when present.
    pub fn new<S>(store: Arc<S>, config: &Config) -> Self
    where
        S: PatientStore + GenderStore + BloodTypeStore + 'static,
    {
        let renderer = config
            .report
            .as_ref()
            .map(|report| Arc::new(HttpReportRenderer::new(report)) as Arc<dyn ReportRenderer>);

        Self {
            patients: store.clone(),
            genders: store.clone(),
            blood_types: store,
            numbers: Arc::new(RandomNumberSource::new()),
            max_number_attempts: config.max_number_attempts,
            renderer,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn ReportRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_numbers(mut self, numbers: Arc<dyn NumberSource>) -> Self {
        self.numbers = numbers;
        self
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so tests can construct the app without binding
/// to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    let auth = ApiKeyAuth::new(config.api_key.clone());
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    // Protected routes (require auth)
    let protected_routes = Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(axum_mw::from_fn(middleware::auth_middleware))
        .layer(Extension(auth))
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // build_recorder() + set_global_recorder() so repeated calls (tests)
    // keep the first recorder and still get a handle for /metrics
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

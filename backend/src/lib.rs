//! AgriNote backend
//!
//! Field registry and treatment register for farm record keeping. Field
//! areas come from the boundary drawn on the map; treatment totals are
//! snapshots of rate times area taken when the treatment is recorded.

use axum::{routing::get, Router};
use shared::GeometryCalculator;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub geometry: GeometryCalculator,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let geometry = config.geometry.calculator();
        Self {
            db,
            config: Arc::new(config),
            geometry,
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "AgriNote API v1"
}

//! Route definitions for AgriNote

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Map page: geometry of a boundary still being drawn
        .route("/geometry/preview", post(handlers::preview_geometry))
        .route(
            "/companies",
            get(handlers::list_companies).post(handlers::create_company),
        )
        .route(
            "/companies/:company_id",
            get(handlers::get_company).put(handlers::update_company),
        )
        .nest("/companies/:company_id/fields", field_routes())
        .nest("/companies/:company_id/products", product_routes())
        .nest("/companies/:company_id/vehicles", vehicle_routes())
        .nest("/companies/:company_id/treatments", treatment_routes())
}

/// Field management routes
fn field_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_fields).post(handlers::create_field))
        .route(
            "/:field_id",
            get(handlers::get_field)
                .put(handlers::update_field)
                .delete(handlers::delete_field),
        )
}

/// Product stock routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route("/:product_id", get(handlers::get_product))
}

/// Vehicle registry routes
fn vehicle_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_vehicles).post(handlers::create_vehicle))
        .route(
            "/:vehicle_id",
            get(handlers::get_vehicle).put(handlers::update_vehicle),
        )
}

/// Treatment register routes
fn treatment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_treatments).post(handlers::create_treatment),
        )
        .route(
            "/:treatment_id",
            get(handlers::get_treatment)
                .put(handlers::update_treatment)
                .delete(handlers::delete_treatment),
        )
}

//! Product stock HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::product::{CreateProductInput, ProductService};
use crate::AppState;

/// List products of a company
pub async fn list_products(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = ProductService::new(state.db.clone());

    match service.get_products(company_id).await {
        Ok(products) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "products": products })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific product
pub async fn get_product(
    State(state): State<AppState>,
    Path((company_id, product_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = ProductService::new(state.db.clone());

    match service.get_product(company_id, product_id).await {
        Ok(product) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "product": product })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Add a product to the company stock
pub async fn create_product(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<CreateProductInput>,
) -> impl IntoResponse {
    let service = ProductService::new(state.db.clone());

    match service.create_product(company_id, input).await {
        Ok(product) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "product": product })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

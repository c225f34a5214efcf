//! Field management HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::services::field::{CreateFieldInput, FieldService, UpdateFieldInput};
use crate::AppState;

/// Body of a geometry preview request
#[derive(Debug, Deserialize)]
pub struct PreviewGeometryInput {
    pub boundary: serde_json::Value,
}

fn field_service(state: &AppState) -> FieldService {
    FieldService::new(state.db.clone(), state.geometry)
}

/// Compute area and centroid for a boundary drawn on the map, without saving
pub async fn preview_geometry(
    State(state): State<AppState>,
    Json(input): Json<PreviewGeometryInput>,
) -> impl IntoResponse {
    let service = field_service(&state);

    match service.preview_geometry(&input.boundary) {
        Ok(geometry) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "area_hectares": geometry.area_hectares,
                "centroid": geometry.centroid,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List all fields of a company
pub async fn list_fields(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = field_service(&state);

    match service.get_fields(company_id).await {
        Ok(fields) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "fields": fields })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific field
pub async fn get_field(
    State(state): State<AppState>,
    Path((company_id, field_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = field_service(&state);

    match service.get_field(company_id, field_id).await {
        Ok(field) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "field": field })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Create a new field
pub async fn create_field(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<CreateFieldInput>,
) -> impl IntoResponse {
    let service = field_service(&state);

    match service.create_field(company_id, input).await {
        Ok(field) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": true,
                "area_hectares": field.area_hectares(),
                "field": field,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update a field
pub async fn update_field(
    State(state): State<AppState>,
    Path((company_id, field_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateFieldInput>,
) -> impl IntoResponse {
    let service = field_service(&state);

    match service.update_field(company_id, field_id, input).await {
        Ok(field) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "area_hectares": field.area_hectares(),
                "field": field,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a field and its treatments
pub async fn delete_field(
    State(state): State<AppState>,
    Path((company_id, field_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = field_service(&state);

    match service.delete_field(company_id, field_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

//! Treatment register HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::services::treatment::{CreateTreatmentInput, TreatmentService, UpdateTreatmentInput};
use crate::AppState;

/// Optional date window for the register
#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// List the company treatment register
pub async fn list_treatments(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<RegisterQuery>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.db.clone());

    match service.get_register(company_id, query.from, query.to).await {
        Ok(treatments) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "treatments": treatments })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific treatment
pub async fn get_treatment(
    State(state): State<AppState>,
    Path((company_id, treatment_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.db.clone());

    match service.get_treatment(company_id, treatment_id).await {
        Ok(treatment) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "treatment": treatment })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record a treatment
pub async fn create_treatment(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<CreateTreatmentInput>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.db.clone());

    match service.create_treatment(company_id, input).await {
        Ok(treatment) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "success": true,
                "total_quantity": treatment.total_quantity(),
                "treatment": treatment,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a treatment
pub async fn update_treatment(
    State(state): State<AppState>,
    Path((company_id, treatment_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateTreatmentInput>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.db.clone());

    match service.update_treatment(company_id, treatment_id, input).await {
        Ok(treatment) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "total_quantity": treatment.total_quantity(),
                "treatment": treatment,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete a treatment
pub async fn delete_treatment(
    State(state): State<AppState>,
    Path((company_id, treatment_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = TreatmentService::new(state.db.clone());

    match service.delete_treatment(company_id, treatment_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

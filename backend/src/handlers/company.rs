//! Company registry HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::company::{CompanyService, CreateCompanyInput, UpdateCompanyInput};
use crate::AppState;

/// List all companies
pub async fn list_companies(State(state): State<AppState>) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_companies().await {
        Ok(companies) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "companies": companies })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific company
pub async fn get_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.get_company(company_id).await {
        Ok(company) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "company": company })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a company
pub async fn create_company(
    State(state): State<AppState>,
    Json(input): Json<CreateCompanyInput>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.create_company(input).await {
        Ok(company) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "company": company })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit company details
pub async fn update_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<UpdateCompanyInput>,
) -> impl IntoResponse {
    let service = CompanyService::new(state.db.clone());

    match service.update_company(company_id, input).await {
        Ok(company) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "company": company })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

//! Vehicle registry HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::services::vehicle::{CreateVehicleInput, UpdateVehicleInput, VehicleService};
use crate::AppState;

/// List vehicles of a company
pub async fn list_vehicles(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let service = VehicleService::new(state.db.clone());

    match service.get_vehicles(company_id).await {
        Ok(vehicles) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "vehicles": vehicles })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a specific vehicle
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path((company_id, vehicle_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let service = VehicleService::new(state.db.clone());

    match service.get_vehicle(company_id, vehicle_id).await {
        Ok(vehicle) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "vehicle": vehicle })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Register a vehicle
pub async fn create_vehicle(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(input): Json<CreateVehicleInput>,
) -> impl IntoResponse {
    let service = VehicleService::new(state.db.clone());

    match service.create_vehicle(company_id, input).await {
        Ok(vehicle) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "success": true, "vehicle": vehicle })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Edit a vehicle
pub async fn update_vehicle(
    State(state): State<AppState>,
    Path((company_id, vehicle_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateVehicleInput>,
) -> impl IntoResponse {
    let service = VehicleService::new(state.db.clone());

    match service.update_vehicle(company_id, vehicle_id, input).await {
        Ok(vehicle) => (
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "vehicle": vehicle })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

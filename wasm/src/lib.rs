//! WebAssembly module for AgriNote
//!
//! Lets the map page compute a field's area and centroid while the boundary
//! is being drawn, with the same code the server uses when saving it.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{compute_field_geometry, compute_total, validate_rate_per_hectare, GeometryError};
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::geometry::*;
pub use shared::types::*;

/// Error payload handed to the map page
#[derive(Debug, Serialize)]
struct GeometryErrorPayload {
    code: &'static str,
    message: String,
    point: Option<usize>,
}

impl From<GeometryError> for GeometryErrorPayload {
    fn from(err: GeometryError) -> Self {
        Self {
            code: err.code(),
            point: err.point_index(),
            message: err.to_string(),
        }
    }
}

fn geometry_to_json(boundary_json: &str) -> Result<String, String> {
    let raw: serde_json::Value = serde_json::from_str(boundary_json)
        .map_err(|e| error_json(GeometryError::InvalidPayload(e.to_string())))?;
    let geometry = compute_field_geometry(&raw).map_err(error_json)?;
    serde_json::to_string(&geometry).map_err(|e| e.to_string())
}

fn error_json(err: GeometryError) -> String {
    let payload = GeometryErrorPayload::from(err);
    serde_json::to_string(&payload).unwrap_or(payload.message)
}

fn treatment_total(rate_per_hectare: f64, area_hectares: f64) -> Option<f64> {
    let rate = Decimal::try_from(rate_per_hectare).ok()?;
    let area = Decimal::try_from(area_hectares).ok()?;
    validate_rate_per_hectare(rate).ok()?;
    if area.is_sign_negative() {
        return None;
    }
    compute_total(rate, area).to_f64()
}

/// Compute `{ area_hectares, centroid }` for a boundary given as
/// `[[lat, lng], ...]` JSON. Throws with a JSON error payload.
#[wasm_bindgen]
pub fn compute_boundary_geometry(boundary_json: &str) -> Result<String, JsValue> {
    geometry_to_json(boundary_json).map_err(|e| js_sys::Error::new(&e).into())
}

/// Total product quantity for a rate and an area
#[wasm_bindgen]
pub fn compute_treatment_total(rate_per_hectare: f64, area_hectares: f64) -> Result<f64, JsValue> {
    treatment_total(rate_per_hectare, area_hectares)
        .ok_or_else(|| js_sys::Error::new("Invalid rate or area").into())
}

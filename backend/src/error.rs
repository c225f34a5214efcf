//! Error handling for AgriNote
//!
//! Provides consistent error responses in English and Italian

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{GeometryError, TreatmentError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_it: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<TreatmentError> for AppError {
    fn from(err: TreatmentError) -> Self {
        match err {
            TreatmentError::Invalid { field, message } => AppError::Validation {
                field: field.to_string(),
                message: message.to_string(),
                message_it: format!("Valore non valido per {}", field),
            },
            // The caller always loads the field the treatment points at
            TreatmentError::FieldMismatch { .. } => AppError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(name, _)| *name);

        match fields.first() {
            Some((name, list)) => {
                let message = list
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", name));
                AppError::Validation {
                    field: name.to_string(),
                    message,
                    message_it: format!("Valore non valido per {}", name),
                }
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_it: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Italian wording for a rejected boundary
fn geometry_message_it(err: &GeometryError) -> String {
    match err {
        GeometryError::TooFewPoints { count } => format!(
            "Coordinate non valide: servono almeno 3 punti (ricevuti {})",
            count
        ),
        GeometryError::MalformedPoint { index, .. } => format!(
            "Formato coordinata non valido al punto {}: atteso [lat, lng]",
            index
        ),
        GeometryError::InvalidNumber { index, value } => {
            format!("Valore non numerico al punto {}: {}", index, value)
        }
        GeometryError::NonFinite { index } => {
            format!("Valore non finito al punto {}", index)
        }
        GeometryError::OutOfRange { index, .. } => {
            format!("Coordinata fuori intervallo al punto {}", index)
        }
        GeometryError::InvalidPayload(msg) => format!("Errore parsing coordinate: {}", msg),
        GeometryError::NotRepresentable(_) => "Superficie non rappresentabile".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation {
                field,
                message,
                message_it,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_it: message_it.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_it: format!("Dati non validi: {}", msg),
                    field: None,
                },
            ),
            AppError::InvalidGeometry(err) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: err.code().to_string(),
                    message_en: err.to_string(),
                    message_it: geometry_message_it(err),
                    field: Some(match err.point_index() {
                        Some(index) => format!("boundary[{}]", index),
                        None => "boundary".to_string(),
                    }),
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_it: format!("Risorsa non trovata: {}", resource),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_it: "Si è verificato un errore del database".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_it: "Errore interno del server".to_string(),
                    field: None,
                },
            ),
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: error_detail,
            }),
        )
            .into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_error_maps_to_bad_request() {
        let err = AppError::from(GeometryError::TooFewPoints { count: 2 });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Field".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_treatment_validation_maps_to_field_error() {
        let err = AppError::from(TreatmentError::Invalid {
            field: "rate_per_hectare",
            message: "Rate per hectare cannot be negative",
        });
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "rate_per_hectare"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_geometry_italian_message_names_point() {
        let message = geometry_message_it(&GeometryError::InvalidNumber {
            index: 4,
            value: "\"abc\"".to_string(),
        });
        assert!(message.contains("punto 4"));
    }
}

//! Field management service
//!
//! Boundary, area and centroid are always written by the same statement, so
//! a field's stored geometry never lags behind its stored boundary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{
    validate_field_name, Boundary, Field, FieldGeometry, GeometryCalculator, GpsCoordinates,
    StoredField,
};
use sqlx::{types::Json, PgPool};
use uuid::Uuid;
use validator::Validate;

use super::company::ensure_company;
use crate::error::{AppError, AppResult};

/// Field service for managing company fields
#[derive(Clone)]
pub struct FieldService {
    db: PgPool,
    calculator: GeometryCalculator,
}

/// Field row as stored in the database
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct FieldRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub current_crop: Option<String>,
    pub boundary: Option<Json<Boundary>>,
    pub area_hectares: Decimal,
    pub centroid_latitude: Option<Decimal>,
    pub centroid_longitude: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FieldRow> for Field {
    fn from(row: FieldRow) -> Self {
        let geometry = match (row.centroid_latitude, row.centroid_longitude) {
            (Some(latitude), Some(longitude)) => Some(FieldGeometry {
                area_hectares: row.area_hectares,
                centroid: GpsCoordinates::new(latitude, longitude),
            }),
            _ => None,
        };
        Field::from(StoredField {
            id: row.id,
            company_id: row.company_id,
            name: row.name,
            current_crop: row.current_crop,
            boundary: row.boundary.map(|b| b.0),
            geometry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub(crate) const FIELD_COLUMNS: &str = "id, company_id, name, current_crop, boundary, area_hectares, \
     centroid_latitude, centroid_longitude, created_at, updated_at";

/// Input for creating a field
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFieldInput {
    #[validate(length(min = 1, max = 120, message = "Field name must be between 1 and 120 characters"))]
    pub name: String,
    /// Raw polygon: `[[lat, lng], ...]` or the same list as JSON text
    pub boundary: Option<serde_json::Value>,
    #[validate(length(max = 120, message = "Crop name must be at most 120 characters"))]
    pub current_crop: Option<String>,
}

/// Input for updating a field
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFieldInput {
    #[validate(length(min = 1, max = 120, message = "Field name must be between 1 and 120 characters"))]
    pub name: Option<String>,
    pub boundary: Option<serde_json::Value>,
    #[validate(length(max = 120, message = "Crop name must be at most 120 characters"))]
    pub current_crop: Option<String>,
}

impl FieldService {
    /// Create a new FieldService instance
    pub fn new(db: PgPool, calculator: GeometryCalculator) -> Self {
        Self { db, calculator }
    }

    /// Compute area and centroid for a raw boundary without storing anything
    pub fn preview_geometry(&self, raw: &serde_json::Value) -> AppResult<FieldGeometry> {
        let boundary = Boundary::from_json(raw)?;
        Ok(self.calculator.compute(&boundary)?)
    }

    /// Get all fields for a company
    pub async fn get_fields(&self, company_id: Uuid) -> AppResult<Vec<Field>> {
        let rows = sqlx::query_as::<_, FieldRow>(&format!(
            "SELECT {} FROM fields WHERE company_id = $1 ORDER BY name ASC",
            FIELD_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Field::from).collect())
    }

    /// Get a field by ID
    pub async fn get_field(&self, company_id: Uuid, field_id: Uuid) -> AppResult<Field> {
        let row = sqlx::query_as::<_, FieldRow>(&format!(
            "SELECT {} FROM fields WHERE id = $1 AND company_id = $2",
            FIELD_COLUMNS
        ))
        .bind(field_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Field".to_string()))?;

        Ok(row.into())
    }

    /// Create a new field, computing its geometry from the boundary
    pub async fn create_field(&self, company_id: Uuid, input: CreateFieldInput) -> AppResult<Field> {
        input.validate()?;
        check_name(&input.name)?;

        let mut field = Field::new(company_id, input.name.trim(), input.current_crop);
        if let Some(raw) = &input.boundary {
            let boundary = Boundary::from_json(raw)?;
            field.set_boundary(boundary, &self.calculator)?;
        }

        ensure_company(&self.db, company_id).await?;

        sqlx::query(
            r#"
            INSERT INTO fields (id, company_id, name, current_crop, boundary, area_hectares,
                                centroid_latitude, centroid_longitude, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(field.id)
        .bind(field.company_id)
        .bind(&field.name)
        .bind(&field.current_crop)
        .bind(field.boundary().cloned().map(Json))
        .bind(field.area_hectares())
        .bind(field.centroid().map(|c| c.latitude))
        .bind(field.centroid().map(|c| c.longitude))
        .bind(field.created_at)
        .bind(field.updated_at)
        .execute(&self.db)
        .await?;

        tracing::info!(
            field_id = %field.id,
            area_hectares = %field.area_hectares(),
            "field created"
        );

        Ok(field)
    }

    /// Update a field. A new boundary replaces area and centroid in the
    /// same write; treatments already recorded keep their totals.
    ///
    /// The row is locked from read to write, so concurrent edits of the same
    /// field apply one after the other instead of overwriting each other.
    pub async fn update_field(
        &self,
        company_id: Uuid,
        field_id: Uuid,
        input: UpdateFieldInput,
    ) -> AppResult<Field> {
        input.validate()?;
        if let Some(name) = &input.name {
            check_name(name)?;
        }
        let boundary = input.boundary.as_ref().map(Boundary::from_json).transpose()?;

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, FieldRow>(&format!(
            "SELECT {} FROM fields WHERE id = $1 AND company_id = $2 FOR UPDATE",
            FIELD_COLUMNS
        ))
        .bind(field_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Field".to_string()))?;
        let mut field = Field::from(row);

        if let Some(name) = input.name {
            field.name = name.trim().to_string();
        }
        if input.current_crop.is_some() {
            field.current_crop = input.current_crop;
        }
        let boundary_changed = boundary.is_some();
        if let Some(boundary) = boundary {
            field.set_boundary(boundary, &self.calculator)?;
        }
        field.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE fields
            SET name = $1, current_crop = $2, boundary = $3, area_hectares = $4,
                centroid_latitude = $5, centroid_longitude = $6, updated_at = $7
            WHERE id = $8
            "#,
        )
        .bind(&field.name)
        .bind(&field.current_crop)
        .bind(field.boundary().cloned().map(Json))
        .bind(field.area_hectares())
        .bind(field.centroid().map(|c| c.latitude))
        .bind(field.centroid().map(|c| c.longitude))
        .bind(field.updated_at)
        .bind(field.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            field_id = %field.id,
            boundary_changed,
            area_hectares = %field.area_hectares(),
            "field updated"
        );

        Ok(field)
    }

    /// Delete a field together with its treatments
    pub async fn delete_field(&self, company_id: Uuid, field_id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM fields WHERE id = $1 AND company_id = $2",
        )
        .bind(field_id)
        .bind(company_id)
        .fetch_one(&mut *tx)
        .await?;

        if exists == 0 {
            return Err(AppError::NotFound("Field".to_string()));
        }

        let removed = sqlx::query("DELETE FROM treatments WHERE field_id = $1")
            .bind(field_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM fields WHERE id = $1")
            .bind(field_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            field_id = %field_id,
            treatments_removed = removed.rows_affected(),
            "field deleted"
        );

        Ok(())
    }
}

fn check_name(name: &str) -> AppResult<()> {
    validate_field_name(name).map_err(|message| AppError::Validation {
        field: "name".to_string(),
        message: message.to_string(),
        message_it: "Nome del campo non valido".to_string(),
    })
}

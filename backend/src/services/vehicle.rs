//! Vehicle registry service

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::company::ensure_company;
use crate::error::{AppError, AppResult};

/// A tractor, sprayer or other machine used for treatments
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub plate: Option<String>,
    pub vehicle_type: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_year: Option<i32>,
    pub revision_date: Option<NaiveDate>,
    pub maintenance_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a vehicle
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleInput {
    #[validate(length(min = 1, max = 120, message = "Vehicle name must be between 1 and 120 characters"))]
    pub name: String,
    #[validate(length(max = 32, message = "Plate must be at most 32 characters"))]
    pub plate: Option<String>,
    #[validate(length(max = 80, message = "Vehicle type must be at most 80 characters"))]
    pub vehicle_type: Option<String>,
    #[validate(length(max = 80, message = "Brand must be at most 80 characters"))]
    pub brand: Option<String>,
    #[validate(length(max = 80, message = "Model must be at most 80 characters"))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Purchase year must be between 1900 and 2100"))]
    pub purchase_year: Option<i32>,
    pub revision_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "Maintenance notes must be at most 2000 characters"))]
    pub maintenance_notes: Option<String>,
}

/// Input for editing a vehicle
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleInput {
    #[validate(length(min = 1, max = 120, message = "Vehicle name must be between 1 and 120 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 32, message = "Plate must be at most 32 characters"))]
    pub plate: Option<String>,
    #[validate(length(max = 80, message = "Vehicle type must be at most 80 characters"))]
    pub vehicle_type: Option<String>,
    #[validate(length(max = 80, message = "Brand must be at most 80 characters"))]
    pub brand: Option<String>,
    #[validate(length(max = 80, message = "Model must be at most 80 characters"))]
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "Purchase year must be between 1900 and 2100"))]
    pub purchase_year: Option<i32>,
    pub revision_date: Option<NaiveDate>,
    #[validate(length(max = 2000, message = "Maintenance notes must be at most 2000 characters"))]
    pub maintenance_notes: Option<String>,
}

const VEHICLE_COLUMNS: &str = "id, company_id, name, plate, vehicle_type, brand, model, \
     purchase_year, revision_date, maintenance_notes, created_at, updated_at";

/// Vehicle service
#[derive(Clone)]
pub struct VehicleService {
    db: PgPool,
}

impl VehicleService {
    /// Create a new VehicleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List vehicles of a company
    pub async fn get_vehicles(&self, company_id: Uuid) -> AppResult<Vec<Vehicle>> {
        let vehicles = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE company_id = $1 ORDER BY name ASC",
            VEHICLE_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(vehicles)
    }

    /// Get a vehicle by ID
    pub async fn get_vehicle(&self, company_id: Uuid, vehicle_id: Uuid) -> AppResult<Vehicle> {
        sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1 AND company_id = $2",
            VEHICLE_COLUMNS
        ))
        .bind(vehicle_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle".to_string()))
    }

    /// Register a vehicle
    pub async fn create_vehicle(
        &self,
        company_id: Uuid,
        input: CreateVehicleInput,
    ) -> AppResult<Vehicle> {
        input.validate()?;

        ensure_company(&self.db, company_id).await?;

        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            INSERT INTO vehicles (id, company_id, name, plate, vehicle_type, brand, model,
                                  purchase_year, revision_date, maintenance_notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(input.name.trim())
        .bind(&input.plate)
        .bind(&input.vehicle_type)
        .bind(&input.brand)
        .bind(&input.model)
        .bind(input.purchase_year)
        .bind(input.revision_date)
        .bind(&input.maintenance_notes)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(vehicle_id = %vehicle.id, "vehicle registered");

        Ok(vehicle)
    }

    /// Edit a vehicle
    pub async fn update_vehicle(
        &self,
        company_id: Uuid,
        vehicle_id: Uuid,
        input: UpdateVehicleInput,
    ) -> AppResult<Vehicle> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, Vehicle>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1 AND company_id = $2 FOR UPDATE",
            VEHICLE_COLUMNS
        ))
        .bind(vehicle_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Vehicle".to_string()))?;

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);

        let vehicle = sqlx::query_as::<_, Vehicle>(&format!(
            r#"
            UPDATE vehicles
            SET name = $1, plate = $2, vehicle_type = $3, brand = $4, model = $5,
                purchase_year = $6, revision_date = $7, maintenance_notes = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING {}
            "#,
            VEHICLE_COLUMNS
        ))
        .bind(name)
        .bind(input.plate.or(existing.plate))
        .bind(input.vehicle_type.or(existing.vehicle_type))
        .bind(input.brand.or(existing.brand))
        .bind(input.model.or(existing.model))
        .bind(input.purchase_year.or(existing.purchase_year))
        .bind(input.revision_date.or(existing.revision_date))
        .bind(input.maintenance_notes.or(existing.maintenance_notes))
        .bind(vehicle_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(vehicle)
    }
}

//! Treatment register service
//!
//! Totals are computed from the field's area read inside the transaction
//! that writes the treatment, with the field row share-locked so a
//! concurrent boundary edit cannot slip in between read and write.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_rate_per_hectare, DateRange, Field, NewTreatment, StoredTreatment, TreatmentDetails,
    TreatmentEdit, TreatmentError, TreatmentRecord, UnitOfMeasure,
};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use super::field::{FieldRow, FIELD_COLUMNS};
use crate::error::{AppError, AppResult};

/// Treatment service for the company treatment register
#[derive(Clone)]
pub struct TreatmentService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct TreatmentRow {
    id: Uuid,
    field_id: Uuid,
    product_id: Uuid,
    applied_on: NaiveDate,
    rate_per_hectare: Decimal,
    total_quantity: Decimal,
    target: Option<String>,
    operator: Option<String>,
    vehicle_id: Option<Uuid>,
    weather_conditions: Option<String>,
    temperature_celsius: Option<Decimal>,
    relative_humidity_percent: Option<Decimal>,
    wind_speed_kmh: Option<Decimal>,
    notes: Option<String>,
    product_lot_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TreatmentRow> for TreatmentRecord {
    fn from(row: TreatmentRow) -> Self {
        TreatmentRecord::from(StoredTreatment {
            id: row.id,
            field_id: row.field_id,
            product_id: row.product_id,
            applied_on: row.applied_on,
            rate_per_hectare: row.rate_per_hectare,
            total_quantity: row.total_quantity,
            details: TreatmentDetails {
                target: row.target,
                operator: row.operator,
                vehicle_id: row.vehicle_id,
                weather_conditions: row.weather_conditions,
                temperature_celsius: row.temperature_celsius,
                relative_humidity_percent: row.relative_humidity_percent,
                wind_speed_kmh: row.wind_speed_kmh,
                notes: row.notes,
                product_lot_number: row.product_lot_number,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RegisterRow {
    #[sqlx(flatten)]
    treatment: TreatmentRow,
    field_name: String,
    product_name: String,
    unit: String,
}

const TREATMENT_COLUMNS: &str = "t.id, t.field_id, t.product_id, t.applied_on, t.rate_per_hectare, \
     t.total_quantity, t.target, t.operator, t.vehicle_id, t.weather_conditions, \
     t.temperature_celsius, t.relative_humidity_percent, t.wind_speed_kmh, t.notes, \
     t.product_lot_number, t.created_at, t.updated_at";

/// One line of the treatment register, as persisted
#[derive(Debug, Serialize)]
pub struct TreatmentRegisterEntry {
    #[serde(flatten)]
    pub treatment: TreatmentRecord,
    pub field_name: String,
    pub product_name: String,
    pub unit: UnitOfMeasure,
}

/// Input for recording a treatment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTreatmentInput {
    pub field_id: Uuid,
    pub product_id: Uuid,
    pub applied_on: NaiveDate,
    pub rate_per_hectare: Decimal,
    #[validate(length(max = 200, message = "Target must be at most 200 characters"))]
    pub target: Option<String>,
    #[validate(length(max = 120, message = "Operator must be at most 120 characters"))]
    pub operator: Option<String>,
    pub vehicle_id: Option<Uuid>,
    #[validate(length(max = 200, message = "Weather conditions must be at most 200 characters"))]
    pub weather_conditions: Option<String>,
    pub temperature_celsius: Option<Decimal>,
    pub relative_humidity_percent: Option<Decimal>,
    pub wind_speed_kmh: Option<Decimal>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
    #[validate(length(max = 60, message = "Lot number must be at most 60 characters"))]
    pub product_lot_number: Option<String>,
}

/// Input for editing a treatment
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTreatmentInput {
    pub field_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub applied_on: Option<NaiveDate>,
    pub rate_per_hectare: Option<Decimal>,
    #[validate(length(max = 200, message = "Target must be at most 200 characters"))]
    pub target: Option<String>,
    #[validate(length(max = 120, message = "Operator must be at most 120 characters"))]
    pub operator: Option<String>,
    pub vehicle_id: Option<Uuid>,
    #[validate(length(max = 200, message = "Weather conditions must be at most 200 characters"))]
    pub weather_conditions: Option<String>,
    pub temperature_celsius: Option<Decimal>,
    pub relative_humidity_percent: Option<Decimal>,
    pub wind_speed_kmh: Option<Decimal>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
    #[validate(length(max = 60, message = "Lot number must be at most 60 characters"))]
    pub product_lot_number: Option<String>,
}

impl CreateTreatmentInput {
    fn into_new_treatment(self) -> NewTreatment {
        NewTreatment {
            field_id: self.field_id,
            product_id: self.product_id,
            applied_on: self.applied_on,
            rate_per_hectare: self.rate_per_hectare,
            details: TreatmentDetails {
                target: self.target,
                operator: self.operator,
                vehicle_id: self.vehicle_id,
                weather_conditions: self.weather_conditions,
                temperature_celsius: self.temperature_celsius,
                relative_humidity_percent: self.relative_humidity_percent,
                wind_speed_kmh: self.wind_speed_kmh,
                notes: self.notes,
                product_lot_number: self.product_lot_number,
            },
        }
    }
}

impl UpdateTreatmentInput {
    /// Fill unset descriptive values from the current record
    fn merged_details(&self, existing: &TreatmentDetails) -> TreatmentDetails {
        TreatmentDetails {
            target: self.target.clone().or_else(|| existing.target.clone()),
            operator: self.operator.clone().or_else(|| existing.operator.clone()),
            vehicle_id: self.vehicle_id.or(existing.vehicle_id),
            weather_conditions: self
                .weather_conditions
                .clone()
                .or_else(|| existing.weather_conditions.clone()),
            temperature_celsius: self.temperature_celsius.or(existing.temperature_celsius),
            relative_humidity_percent: self
                .relative_humidity_percent
                .or(existing.relative_humidity_percent),
            wind_speed_kmh: self.wind_speed_kmh.or(existing.wind_speed_kmh),
            notes: self.notes.clone().or_else(|| existing.notes.clone()),
            product_lot_number: self
                .product_lot_number
                .clone()
                .or_else(|| existing.product_lot_number.clone()),
        }
    }
}

impl TreatmentService {
    /// Create a new TreatmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Treatment register for a company, newest first. Reads stored totals
    /// only; nothing is recomputed.
    pub async fn get_register(
        &self,
        company_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Vec<TreatmentRegisterEntry>> {
        if let (Some(start), Some(end)) = (from, to) {
            if !(DateRange { start, end }).is_valid() {
                return Err(AppError::Validation {
                    field: "from".to_string(),
                    message: "Start date must not be after end date".to_string(),
                    message_it: "La data iniziale non può essere successiva a quella finale"
                        .to_string(),
                });
            }
        }

        let rows = sqlx::query_as::<_, RegisterRow>(&format!(
            r#"
            SELECT {}, f.name AS field_name, p.commercial_name AS product_name, p.unit AS unit
            FROM treatments t
            JOIN fields f ON f.id = t.field_id
            JOIN products p ON p.id = t.product_id
            WHERE f.company_id = $1
              AND ($2::date IS NULL OR t.applied_on >= $2)
              AND ($3::date IS NULL OR t.applied_on <= $3)
            ORDER BY t.applied_on DESC, t.created_at DESC
            "#,
            TREATMENT_COLUMNS
        ))
        .bind(company_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                let unit = row.unit.parse::<UnitOfMeasure>().map_err(|_| {
                    AppError::Internal(format!("Unknown unit of measure: {}", row.unit))
                })?;
                Ok(TreatmentRegisterEntry {
                    treatment: row.treatment.into(),
                    field_name: row.field_name,
                    product_name: row.product_name,
                    unit,
                })
            })
            .collect()
    }

    /// Get a treatment by ID
    pub async fn get_treatment(
        &self,
        company_id: Uuid,
        treatment_id: Uuid,
    ) -> AppResult<TreatmentRecord> {
        let row = sqlx::query_as::<_, TreatmentRow>(&format!(
            r#"
            SELECT {}
            FROM treatments t
            JOIN fields f ON f.id = t.field_id
            WHERE t.id = $1 AND f.company_id = $2
            "#,
            TREATMENT_COLUMNS
        ))
        .bind(treatment_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Treatment".to_string()))?;

        Ok(row.into())
    }

    /// Record a treatment. The total is `rate_per_hectare` times the
    /// field's area at this moment.
    pub async fn create_treatment(
        &self,
        company_id: Uuid,
        input: CreateTreatmentInput,
    ) -> AppResult<TreatmentRecord> {
        input.validate()?;
        check_rate(input.rate_per_hectare)?;
        let new_treatment = input.into_new_treatment();
        new_treatment.details.validate()?;

        let mut tx = self.db.begin().await?;

        let field = lock_field(&mut tx, company_id, new_treatment.field_id).await?;
        ensure_product(&mut tx, company_id, new_treatment.product_id).await?;
        if let Some(vehicle_id) = new_treatment.details.vehicle_id {
            ensure_vehicle(&mut tx, company_id, vehicle_id).await?;
        }

        let record = TreatmentRecord::record(new_treatment, &field)?;

        sqlx::query(
            r#"
            INSERT INTO treatments (id, field_id, product_id, applied_on, rate_per_hectare,
                                    total_quantity, target, operator, vehicle_id,
                                    weather_conditions, temperature_celsius,
                                    relative_humidity_percent, wind_speed_kmh, notes,
                                    product_lot_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(record.id)
        .bind(record.field_id())
        .bind(record.product_id)
        .bind(record.applied_on)
        .bind(record.rate_per_hectare())
        .bind(record.total_quantity())
        .bind(&record.details.target)
        .bind(&record.details.operator)
        .bind(record.details.vehicle_id)
        .bind(&record.details.weather_conditions)
        .bind(record.details.temperature_celsius)
        .bind(record.details.relative_humidity_percent)
        .bind(record.details.wind_speed_kmh)
        .bind(&record.details.notes)
        .bind(&record.details.product_lot_number)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            treatment_id = %record.id,
            field_id = %record.field_id(),
            area_hectares = %field.area_hectares(),
            total_quantity = %record.total_quantity(),
            "treatment recorded"
        );

        Ok(record)
    }

    /// Edit a treatment. Changing the rate or the field recomputes the
    /// total from the target field's current area; other edits keep it.
    pub async fn update_treatment(
        &self,
        company_id: Uuid,
        treatment_id: Uuid,
        input: UpdateTreatmentInput,
    ) -> AppResult<TreatmentRecord> {
        input.validate()?;
        if let Some(rate) = input.rate_per_hectare {
            check_rate(rate)?;
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, TreatmentRow>(&format!(
            r#"
            SELECT {}
            FROM treatments t
            JOIN fields f ON f.id = t.field_id
            WHERE t.id = $1 AND f.company_id = $2
            FOR UPDATE OF t
            "#,
            TREATMENT_COLUMNS
        ))
        .bind(treatment_id)
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Treatment".to_string()))?;
        let mut record = TreatmentRecord::from(row);

        let field_id = input.field_id.unwrap_or(record.field_id());
        let field = lock_field(&mut tx, company_id, field_id).await?;
        if let Some(product_id) = input.product_id {
            ensure_product(&mut tx, company_id, product_id).await?;
        }
        if let Some(vehicle_id) = input.vehicle_id {
            ensure_vehicle(&mut tx, company_id, vehicle_id).await?;
        }

        let details = input.merged_details(&record.details);
        let recomputed = record.apply_edit(
            TreatmentEdit {
                field_id: input.field_id,
                product_id: input.product_id,
                applied_on: input.applied_on,
                rate_per_hectare: input.rate_per_hectare,
                details: Some(details),
            },
            &field,
        )?;

        sqlx::query(
            r#"
            UPDATE treatments
            SET field_id = $1, product_id = $2, applied_on = $3, rate_per_hectare = $4,
                total_quantity = $5, target = $6, operator = $7, vehicle_id = $8,
                weather_conditions = $9, temperature_celsius = $10,
                relative_humidity_percent = $11, wind_speed_kmh = $12, notes = $13,
                product_lot_number = $14, updated_at = $15
            WHERE id = $16
            "#,
        )
        .bind(record.field_id())
        .bind(record.product_id)
        .bind(record.applied_on)
        .bind(record.rate_per_hectare())
        .bind(record.total_quantity())
        .bind(&record.details.target)
        .bind(&record.details.operator)
        .bind(record.details.vehicle_id)
        .bind(&record.details.weather_conditions)
        .bind(record.details.temperature_celsius)
        .bind(record.details.relative_humidity_percent)
        .bind(record.details.wind_speed_kmh)
        .bind(&record.details.notes)
        .bind(&record.details.product_lot_number)
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            treatment_id = %record.id,
            recomputed,
            total_quantity = %record.total_quantity(),
            "treatment updated"
        );

        Ok(record)
    }

    /// Delete a treatment
    pub async fn delete_treatment(&self, company_id: Uuid, treatment_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM treatments t
            USING fields f
            WHERE t.id = $1 AND t.field_id = f.id AND f.company_id = $2
            "#,
        )
        .bind(treatment_id)
        .bind(company_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Treatment".to_string()));
        }

        Ok(())
    }
}

fn check_rate(rate: Decimal) -> AppResult<()> {
    validate_rate_per_hectare(rate).map_err(|message| {
        AppError::from(TreatmentError::Invalid {
            field: "rate_per_hectare",
            message,
        })
    })
}

/// Load a field and hold a share lock on it until the transaction ends
async fn lock_field(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    field_id: Uuid,
) -> AppResult<Field> {
    let row = sqlx::query_as::<_, FieldRow>(&format!(
        "SELECT {} FROM fields WHERE id = $1 AND company_id = $2 FOR SHARE",
        FIELD_COLUMNS
    ))
    .bind(field_id)
    .bind(company_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Field".to_string()))?;

    Ok(row.into())
}

async fn ensure_product(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    product_id: Uuid,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM products WHERE id = $1 AND company_id = $2",
    )
    .bind(product_id)
    .bind(company_id)
    .fetch_one(&mut **tx)
    .await?;

    if exists == 0 {
        return Err(AppError::NotFound("Product".to_string()));
    }
    Ok(())
}

async fn ensure_vehicle(
    tx: &mut Transaction<'_, Postgres>,
    company_id: Uuid,
    vehicle_id: Uuid,
) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM vehicles WHERE id = $1 AND company_id = $2",
    )
    .bind(vehicle_id)
    .bind(company_id)
    .fetch_one(&mut **tx)
    .await?;

    if exists == 0 {
        return Err(AppError::NotFound("Vehicle".to_string()));
    }
    Ok(())
}

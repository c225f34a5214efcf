//! Treatment register models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Field;
use crate::accounting::{compute_total, TreatmentError};
use crate::validation::{validate_rate_per_hectare, validate_relative_humidity, validate_wind_speed};

/// Descriptive data recorded with a treatment. Has no effect on the total.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TreatmentDetails {
    /// Pest, disease or agronomic goal the treatment addresses
    pub target: Option<String>,
    pub operator: Option<String>,
    pub vehicle_id: Option<Uuid>,
    pub weather_conditions: Option<String>,
    pub temperature_celsius: Option<Decimal>,
    pub relative_humidity_percent: Option<Decimal>,
    pub wind_speed_kmh: Option<Decimal>,
    pub notes: Option<String>,
    pub product_lot_number: Option<String>,
}

impl TreatmentDetails {
    pub fn validate(&self) -> Result<(), TreatmentError> {
        if let Some(humidity) = self.relative_humidity_percent {
            validate_relative_humidity(humidity).map_err(|message| TreatmentError::Invalid {
                field: "relative_humidity_percent",
                message,
            })?;
        }
        if let Some(speed) = self.wind_speed_kmh {
            validate_wind_speed(speed).map_err(|message| TreatmentError::Invalid {
                field: "wind_speed_kmh",
                message,
            })?;
        }
        Ok(())
    }
}

/// Input for recording a treatment
#[derive(Debug, Clone)]
pub struct NewTreatment {
    pub field_id: Uuid,
    pub product_id: Uuid,
    pub applied_on: NaiveDate,
    pub rate_per_hectare: Decimal,
    pub details: TreatmentDetails,
}

/// Changes to an existing treatment; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct TreatmentEdit {
    pub field_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub applied_on: Option<NaiveDate>,
    pub rate_per_hectare: Option<Decimal>,
    pub details: Option<TreatmentDetails>,
}

/// A treatment applied to a field.
///
/// `total_quantity` is a snapshot of `rate_per_hectare * field area` taken
/// when the treatment was recorded, or when its rate or field was last
/// changed. Later boundary edits on the field do not touch it.
#[derive(Debug, Clone, Serialize)]
pub struct TreatmentRecord {
    pub id: Uuid,
    field_id: Uuid,
    pub product_id: Uuid,
    pub applied_on: NaiveDate,
    rate_per_hectare: Decimal,
    total_quantity: Decimal,
    #[serde(flatten)]
    pub details: TreatmentDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Treatment as loaded from storage
#[derive(Debug, Clone)]
pub struct StoredTreatment {
    pub id: Uuid,
    pub field_id: Uuid,
    pub product_id: Uuid,
    pub applied_on: NaiveDate,
    pub rate_per_hectare: Decimal,
    pub total_quantity: Decimal,
    pub details: TreatmentDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TreatmentRecord {
    /// Record a treatment against `field`, snapshotting its current area
    pub fn record(input: NewTreatment, field: &Field) -> Result<Self, TreatmentError> {
        if input.field_id != field.id {
            return Err(TreatmentError::FieldMismatch {
                expected: input.field_id,
                actual: field.id,
            });
        }
        check_rate(input.rate_per_hectare)?;
        input.details.validate()?;

        let total_quantity = compute_total(input.rate_per_hectare, field.area_hectares());
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            field_id: input.field_id,
            product_id: input.product_id,
            applied_on: input.applied_on,
            rate_per_hectare: input.rate_per_hectare,
            total_quantity,
            details: input.details,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply an edit. `field` must be the field the treatment references
    /// once the edit is applied, read as of now.
    ///
    /// Returns true when the rate or the field reference changed and the
    /// total was recomputed from `field`'s current area.
    pub fn apply_edit(&mut self, edit: TreatmentEdit, field: &Field) -> Result<bool, TreatmentError> {
        let field_id = edit.field_id.unwrap_or(self.field_id);
        if field_id != field.id {
            return Err(TreatmentError::FieldMismatch {
                expected: field_id,
                actual: field.id,
            });
        }
        let rate = edit.rate_per_hectare.unwrap_or(self.rate_per_hectare);
        check_rate(rate)?;
        if let Some(details) = &edit.details {
            details.validate()?;
        }

        let recompute = field_id != self.field_id || rate != self.rate_per_hectare;
        if recompute {
            self.total_quantity = compute_total(rate, field.area_hectares());
            tracing::debug!(
                treatment_id = %self.id,
                field_id = %field_id,
                total = %self.total_quantity,
                "recomputed treatment total"
            );
        }

        self.field_id = field_id;
        self.rate_per_hectare = rate;
        if let Some(product_id) = edit.product_id {
            self.product_id = product_id;
        }
        if let Some(applied_on) = edit.applied_on {
            self.applied_on = applied_on;
        }
        if let Some(details) = edit.details {
            self.details = details;
        }
        self.updated_at = Utc::now();

        Ok(recompute)
    }

    pub fn field_id(&self) -> Uuid {
        self.field_id
    }

    pub fn rate_per_hectare(&self) -> Decimal {
        self.rate_per_hectare
    }

    pub fn total_quantity(&self) -> Decimal {
        self.total_quantity
    }
}

impl From<StoredTreatment> for TreatmentRecord {
    fn from(stored: StoredTreatment) -> Self {
        Self {
            id: stored.id,
            field_id: stored.field_id,
            product_id: stored.product_id,
            applied_on: stored.applied_on,
            rate_per_hectare: stored.rate_per_hectare,
            total_quantity: stored.total_quantity,
            details: stored.details,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

fn check_rate(rate: Decimal) -> Result<(), TreatmentError> {
    validate_rate_per_hectare(rate).map_err(|message| TreatmentError::Invalid {
        field: "rate_per_hectare",
        message,
    })
}

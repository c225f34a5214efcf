//! Validation utilities for AgriNote
//!
//! Rules applied to field and treatment input before it reaches the
//! geometry calculator or the accounting rule.

use rust_decimal::Decimal;

/// Maximum length of a field name
pub const MAX_FIELD_NAME_LENGTH: usize = 120;

// ============================================================================
// Geographic Validations
// ============================================================================

/// Validate that a coordinate lies on the globe
pub fn validate_coordinate_range(latitude: f64, longitude: f64) -> Result<(), &'static str> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err("Latitude must be between -90 and 90 degrees");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err("Longitude must be between -180 and 180 degrees");
    }
    Ok(())
}

/// Validate a field display name
pub fn validate_field_name(name: &str) -> Result<(), &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Field name cannot be empty");
    }
    if trimmed.chars().count() > MAX_FIELD_NAME_LENGTH {
        return Err("Field name must be at most 120 characters");
    }
    Ok(())
}

// ============================================================================
// Treatment Validations
// ============================================================================

/// Validate per-hectare application rate
pub fn validate_rate_per_hectare(rate: Decimal) -> Result<(), &'static str> {
    if rate < Decimal::ZERO {
        return Err("Rate per hectare cannot be negative");
    }
    Ok(())
}

/// Validate relative humidity recorded during a treatment (0-100%)
pub fn validate_relative_humidity(humidity: Decimal) -> Result<(), &'static str> {
    if humidity < Decimal::ZERO || humidity > Decimal::from(100) {
        return Err("Relative humidity must be between 0 and 100%");
    }
    Ok(())
}

/// Validate wind speed recorded during a treatment (km/h)
pub fn validate_wind_speed(speed_kmh: Decimal) -> Result<(), &'static str> {
    if speed_kmh < Decimal::ZERO {
        return Err("Wind speed cannot be negative");
    }
    Ok(())
}

// ============================================================================
// Product Validations
// ============================================================================

/// Units accepted for product stock and dosing, as stored
pub const PRODUCT_UNITS: [&str; 2] = ["kg", "L"];

/// Validate a product unit of measure. Only the stored spellings are accepted.
pub fn validate_product_unit(unit: &str) -> Result<(), &'static str> {
    if PRODUCT_UNITS.contains(&unit) {
        Ok(())
    } else {
        Err("Unit of measure must be kg or L")
    }
}

/// Validate a stock quantity
pub fn validate_available_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity < Decimal::ZERO {
        return Err("Available quantity cannot be negative");
    }
    Ok(())
}

//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

impl GpsCoordinates {
    pub fn new(latitude: Decimal, longitude: Decimal) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build coordinates from floating-point degrees.
    /// Returns None if either value cannot be represented as a Decimal.
    pub fn from_degrees(latitude: f64, longitude: f64) -> Option<Self> {
        let latitude = Decimal::try_from(latitude).ok()?;
        let longitude = Decimal::try_from(longitude).ok()?;
        Some(Self::new(latitude, longitude))
    }
}

/// Date range for queries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRange {
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
}

impl DateRange {
    /// Check that the range is not inverted
    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

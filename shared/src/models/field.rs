//! Field models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::geometry::{Boundary, FieldGeometry, GeometryCalculator, GeometryError};
use crate::types::GpsCoordinates;

/// A cultivated field belonging to a company.
///
/// The boundary and its derived geometry are only written together through
/// [`Field::set_boundary`], so the stored area and centroid always match the
/// stored boundary.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub current_crop: Option<String>,
    boundary: Option<Boundary>,
    geometry: Option<FieldGeometry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field as loaded from storage, trusted to be consistent
#[derive(Debug, Clone)]
pub struct StoredField {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub current_crop: Option<String>,
    pub boundary: Option<Boundary>,
    pub geometry: Option<FieldGeometry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Field {
    /// Create a field without a boundary
    pub fn new(company_id: Uuid, name: impl Into<String>, current_crop: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_id,
            name: name.into(),
            current_crop,
            boundary: None,
            geometry: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder form of [`Field::set_boundary`]
    pub fn with_boundary(
        mut self,
        boundary: Boundary,
        calculator: &GeometryCalculator,
    ) -> Result<Self, GeometryError> {
        self.set_boundary(boundary, calculator)?;
        Ok(self)
    }

    /// Replace the boundary and recompute area and centroid.
    /// On error the field is left untouched.
    pub fn set_boundary(
        &mut self,
        boundary: Boundary,
        calculator: &GeometryCalculator,
    ) -> Result<(), GeometryError> {
        let geometry = calculator.compute(&boundary)?;
        self.boundary = Some(boundary);
        self.geometry = Some(geometry);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn boundary(&self) -> Option<&Boundary> {
        self.boundary.as_ref()
    }

    pub fn geometry(&self) -> Option<&FieldGeometry> {
        self.geometry.as_ref()
    }

    /// Surface in hectares; zero for a field without a boundary
    pub fn area_hectares(&self) -> Decimal {
        self.geometry
            .as_ref()
            .map(|g| g.area_hectares)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn centroid(&self) -> Option<&GpsCoordinates> {
        self.geometry.as_ref().map(|g| &g.centroid)
    }
}

impl From<StoredField> for Field {
    fn from(stored: StoredField) -> Self {
        // Geometry without a boundary has nothing to derive from
        let geometry = match stored.boundary {
            Some(_) => stored.geometry,
            None => None,
        };
        Self {
            id: stored.id,
            company_id: stored.company_id,
            name: stored.name,
            current_crop: stored.current_crop,
            boundary: stored.boundary,
            geometry,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinate;

    fn rectangle(lat: f64, lng: f64, size: f64) -> Boundary {
        Boundary::new(vec![
            Coordinate::new(lat, lng),
            Coordinate::new(lat + size, lng),
            Coordinate::new(lat + size, lng + size),
            Coordinate::new(lat, lng + size),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_field_has_no_geometry() {
        let field = Field::new(Uuid::new_v4(), "Vigna Alta", Some("Vite".to_string()));
        assert!(field.boundary().is_none());
        assert!(field.geometry().is_none());
        assert_eq!(field.area_hectares(), Decimal::ZERO);
    }

    #[test]
    fn test_set_boundary_updates_geometry_together() {
        let calculator = GeometryCalculator::default();
        let mut field = Field::new(Uuid::new_v4(), "Campo Nord", None)
            .with_boundary(rectangle(45.47, 9.19, 0.01), &calculator)
            .unwrap();
        let first_area = field.area_hectares();
        assert!(first_area > Decimal::ZERO);

        field
            .set_boundary(rectangle(45.47, 9.19, 0.02), &calculator)
            .unwrap();
        assert!(field.area_hectares() > first_area);
        assert_eq!(
            field.geometry().unwrap(),
            &calculator.compute(field.boundary().unwrap()).unwrap()
        );
    }

    #[test]
    fn test_stored_geometry_without_boundary_is_dropped() {
        let field = Field::new(Uuid::new_v4(), "Prato", None)
            .with_boundary(rectangle(44.0, 11.0, 0.01), &GeometryCalculator::default())
            .unwrap();
        let stored = StoredField {
            id: field.id,
            company_id: field.company_id,
            name: field.name.clone(),
            current_crop: None,
            boundary: None,
            geometry: field.geometry().cloned(),
            created_at: field.created_at,
            updated_at: field.updated_at,
        };

        let restored = Field::from(stored);
        assert!(restored.geometry().is_none());
        assert_eq!(restored.area_hectares(), Decimal::ZERO);
    }
}

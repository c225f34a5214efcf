//! Treatment accounting integration tests
//!
//! Tests for treatment totals including:
//! - Total is rate times field area at recording time
//! - Boundary edits never rewrite recorded totals
//! - Rate and field edits recompute from the current area

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    compute_total, Boundary, Coordinate, Field, GeometryCalculator, NewTreatment,
    TreatmentDetails, TreatmentEdit, TreatmentRecord,
};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn square(lat: f64, lng: f64, side: f64) -> Boundary {
    Boundary::new(vec![
        Coordinate::new(lat, lng),
        Coordinate::new(lat + side, lng),
        Coordinate::new(lat + side, lng + side),
        Coordinate::new(lat, lng + side),
    ])
    .unwrap()
}

fn field(side: f64) -> Field {
    Field::new(Uuid::new_v4(), "Vigneto Nord", Some("Vite".to_string()))
        .with_boundary(square(45.47, 9.19, side), &GeometryCalculator::default())
        .unwrap()
}

fn treatment_on(field: &Field, rate: Decimal) -> NewTreatment {
    NewTreatment {
        field_id: field.id,
        product_id: Uuid::new_v4(),
        applied_on: NaiveDate::from_ymd_opt(2025, 4, 22).unwrap(),
        rate_per_hectare: rate,
        details: TreatmentDetails::default(),
    }
}

// ============================================================================
// Strategies
// ============================================================================

/// Rates between 0 and 50 with up to 3 decimals
fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..50_000).prop_map(|n| Decimal::new(n, 3))
}

/// Areas between 0.01 and 500 ha, two decimals like stored areas
fn area_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..50_000).prop_map(|n| Decimal::new(n, 2))
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Total divided by area gives back the rate
    #[test]
    fn test_total_over_area_is_rate(
        rate in rate_strategy(),
        area in area_strategy()
    ) {
        let total = compute_total(rate, area);
        prop_assert_eq!(total / area, rate);
    }

    /// A field with no area yields a zero total for any rate
    #[test]
    fn test_zero_area_gives_zero_total(rate in rate_strategy()) {
        prop_assert_eq!(compute_total(rate, Decimal::ZERO), Decimal::ZERO);
    }

    /// Redrawing the boundary after recording leaves the total unchanged
    #[test]
    fn test_boundary_edit_keeps_snapshot(
        rate in rate_strategy(),
        first_side in 0.001f64..0.02,
        second_side in 0.001f64..0.02
    ) {
        let mut field = field(first_side);
        let treatment = TreatmentRecord::record(treatment_on(&field, rate), &field).unwrap();
        let recorded = treatment.total_quantity();

        field
            .set_boundary(square(45.47, 9.19, second_side), &GeometryCalculator::default())
            .unwrap();

        prop_assert_eq!(treatment.total_quantity(), recorded);
        prop_assert_eq!(recorded, rate * field_area_for(first_side));
    }
}

fn field_area_for(side: f64) -> Decimal {
    field(side).area_hectares()
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_three_per_hectare_on_five_and_a_half() {
    assert_eq!(compute_total(dec("3.0"), dec("5.5")), dec("16.5"));
}

#[test]
fn test_treatment_on_field_without_boundary_is_zero() {
    let field = Field::new(Uuid::new_v4(), "Campo senza confini", None);
    let treatment = TreatmentRecord::record(treatment_on(&field, dec("2.0")), &field).unwrap();
    assert_eq!(treatment.total_quantity(), Decimal::ZERO);
}

#[test]
fn test_rate_edit_after_redraw_uses_new_area() {
    let mut field = field(0.01);
    let mut treatment =
        TreatmentRecord::record(treatment_on(&field, dec("1.5")), &field).unwrap();
    let original = treatment.total_quantity();

    field
        .set_boundary(square(45.47, 9.19, 0.02), &GeometryCalculator::default())
        .unwrap();
    assert_eq!(treatment.total_quantity(), original);

    let recomputed = treatment
        .apply_edit(
            TreatmentEdit {
                rate_per_hectare: Some(dec("2.0")),
                ..Default::default()
            },
            &field,
        )
        .unwrap();
    assert!(recomputed);
    assert_eq!(treatment.total_quantity(), dec("2.0") * field.area_hectares());
}

#[test]
fn test_same_rate_edit_does_not_rebaseline() {
    let mut field = field(0.01);
    let mut treatment =
        TreatmentRecord::record(treatment_on(&field, dec("1.5")), &field).unwrap();
    let original = treatment.total_quantity();

    field
        .set_boundary(square(45.47, 9.19, 0.02), &GeometryCalculator::default())
        .unwrap();

    let recomputed = treatment
        .apply_edit(
            TreatmentEdit {
                rate_per_hectare: Some(dec("1.50")),
                applied_on: NaiveDate::from_ymd_opt(2025, 4, 23),
                ..Default::default()
            },
            &field,
        )
        .unwrap();
    assert!(!recomputed);
    assert_eq!(treatment.total_quantity(), original);
}

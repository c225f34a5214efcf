//! Treatment quantity accounting
//!
//! A treatment's total applied quantity is the per-hectare rate times the
//! area of the treated field, taken when the treatment is recorded.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Total product quantity for a treatment.
///
/// Plain multiplication: callers are responsible for passing a validated,
/// non-negative rate and the field's area as of the moment of recording.
pub fn compute_total(rate_per_hectare: Decimal, field_area_hectares: Decimal) -> Decimal {
    rate_per_hectare * field_area_hectares
}

/// Rejected treatment input
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TreatmentError {
    #[error("{message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },

    #[error("treatment references field {expected} but field {actual} was supplied")]
    FieldMismatch { expected: Uuid, actual: Uuid },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_compute_total() {
        assert_eq!(compute_total(dec("3.0"), dec("5.5")), dec("16.5"));
        assert_eq!(compute_total(dec("0.25"), dec("12.40")), dec("3.1"));
    }

    #[test]
    fn test_compute_total_zero_area() {
        assert_eq!(compute_total(dec("7.5"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_compute_total_zero_rate() {
        assert_eq!(compute_total(Decimal::ZERO, dec("3.21")), Decimal::ZERO);
    }
}

//! Field boundary geometry
//!
//! Computes the surface area (hectares) and centroid of a hand-drawn field
//! boundary. Areas use a local flat-earth approximation: one degree of
//! latitude is a fixed 111 320 m, one degree of longitude shrinks with the
//! cosine of the boundary's mean latitude. Good for field-sized polygons (up
//! to tens of kilometres across); not valid for shapes spanning a large part
//! of the globe.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::GpsCoordinates;
use crate::validation::validate_coordinate_range;

/// Meters per degree of latitude (and of longitude at the equator)
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// 1 hectare = 10,000 m²
pub const SQUARE_METERS_PER_HECTARE: f64 = 10_000.0;

/// Smallest number of vertices that can enclose an area
pub const MIN_BOUNDARY_POINTS: usize = 3;

/// Area in squared degrees below which a boundary is considered to enclose
/// nothing (collinear or repeated points, zero-area self-crossings).
pub const DEFAULT_DEGENERATE_THRESHOLD: f64 = 1e-12;

const AREA_DECIMAL_PLACES: u32 = 2;

/// Rejected boundary input. Every variant is an invalid-geometry failure:
/// the whole boundary is refused, no partial result is produced.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GeometryError {
    #[error("boundary needs at least 3 points, got {count}")]
    TooFewPoints { count: usize },

    #[error("point {index} is not a [latitude, longitude] pair: {value}")]
    MalformedPoint { index: usize, value: String },

    #[error("point {index} has a non-numeric coordinate: {value}")]
    InvalidNumber { index: usize, value: String },

    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("point {index} is out of range: latitude {latitude}, longitude {longitude}")]
    OutOfRange {
        index: usize,
        latitude: f64,
        longitude: f64,
    },

    #[error("boundary is not a list of points: {0}")]
    InvalidPayload(String),

    #[error("computed value {0} cannot be stored as a decimal")]
    NotRepresentable(f64),
}

impl GeometryError {
    /// Machine-readable error code shared by all variants
    pub fn code(&self) -> &'static str {
        "INVALID_GEOMETRY"
    }

    /// Index of the offending point, when the failure is tied to one
    pub fn point_index(&self) -> Option<usize> {
        match self {
            GeometryError::MalformedPoint { index, .. }
            | GeometryError::InvalidNumber { index, .. }
            | GeometryError::NonFinite { index }
            | GeometryError::OutOfRange { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// A single boundary vertex, serialized as `[latitude, longitude]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(point: Coordinate) -> Self {
        [point.latitude, point.longitude]
    }
}

/// Validated field perimeter: at least three finite, in-range vertices.
///
/// The ring is closed implicitly, so the first point does not need to be
/// repeated at the end. Vertex order is kept exactly as supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct Boundary {
    points: Vec<Coordinate>,
}

impl Boundary {
    /// Build a boundary from already-numeric points
    pub fn new(points: Vec<Coordinate>) -> Result<Self, GeometryError> {
        if points.len() < MIN_BOUNDARY_POINTS {
            return Err(GeometryError::TooFewPoints {
                count: points.len(),
            });
        }
        for (index, point) in points.iter().enumerate() {
            check_point(index, point)?;
        }
        Ok(Self { points })
    }

    /// Normalize a raw boundary payload.
    ///
    /// Accepts a JSON array of `[lat, lng]` pairs whose members are numbers
    /// or numeric strings, or a JSON string containing such an array (the
    /// map form posts the polygon as encoded text). Fails on the first bad
    /// point.
    pub fn from_json(raw: &Value) -> Result<Self, GeometryError> {
        match raw {
            Value::String(text) => {
                let decoded: Value = serde_json::from_str(text)
                    .map_err(|e| GeometryError::InvalidPayload(e.to_string()))?;
                match decoded {
                    Value::Array(_) => Self::from_json(&decoded),
                    other => Err(GeometryError::InvalidPayload(format!(
                        "expected a list of points, got {}",
                        json_type_name(&other)
                    ))),
                }
            }
            Value::Array(items) => {
                if items.len() < MIN_BOUNDARY_POINTS {
                    return Err(GeometryError::TooFewPoints { count: items.len() });
                }
                let points = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| coerce_point(index, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self { points })
            }
            other => Err(GeometryError::InvalidPayload(format!(
                "expected a list of points, got {}",
                json_type_name(other)
            ))),
        }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: a boundary holds at least three points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl TryFrom<Vec<Coordinate>> for Boundary {
    type Error = GeometryError;

    fn try_from(points: Vec<Coordinate>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Boundary> for Vec<Coordinate> {
    fn from(boundary: Boundary) -> Self {
        boundary.points
    }
}

/// Geometry derived from a boundary. Only produced by [`GeometryCalculator`]
/// or loaded back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    /// Surface in hectares, rounded to 2 decimal places
    pub area_hectares: Decimal,
    /// Vertex average of the boundary (not the area-weighted centroid)
    pub centroid: GpsCoordinates,
}

impl FieldGeometry {
    /// True when the boundary enclosed no measurable area
    pub fn is_degenerate(&self) -> bool {
        self.area_hectares.is_zero()
    }
}

/// Area and centroid calculator with a configurable degenerate-area clamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryCalculator {
    degenerate_threshold: f64,
}

impl Default for GeometryCalculator {
    fn default() -> Self {
        Self {
            degenerate_threshold: DEFAULT_DEGENERATE_THRESHOLD,
        }
    }
}

impl GeometryCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the squared-degree area under which a boundary counts as empty
    pub fn with_degenerate_threshold(threshold: f64) -> Self {
        Self {
            degenerate_threshold: threshold,
        }
    }

    pub fn degenerate_threshold(&self) -> f64 {
        self.degenerate_threshold
    }

    /// Compute area and centroid for a validated boundary
    pub fn compute(&self, boundary: &Boundary) -> Result<FieldGeometry, GeometryError> {
        let points = boundary.points();
        let count = points.len() as f64;

        let mean_latitude = points.iter().map(|p| p.latitude).sum::<f64>() / count;
        let mean_longitude = points.iter().map(|p| p.longitude).sum::<f64>() / count;

        let square_degrees = shoelace_square_degrees(points);
        tracing::debug!(
            points = points.len(),
            mean_latitude,
            square_degrees,
            "computed boundary area in squared degrees"
        );

        let area_hectares = if square_degrees < self.degenerate_threshold {
            tracing::warn!(
                square_degrees,
                threshold = self.degenerate_threshold,
                "boundary encloses no measurable area, clamping to zero"
            );
            Decimal::ZERO
        } else {
            let meters_per_degree_lng = METERS_PER_DEGREE_LAT * mean_latitude.to_radians().cos();
            let square_meters = square_degrees * METERS_PER_DEGREE_LAT * meters_per_degree_lng;
            let hectares = square_meters / SQUARE_METERS_PER_HECTARE;
            tracing::debug!(square_meters, hectares, "converted boundary area");

            round_hectares(hectares)?
        };

        let centroid = GpsCoordinates::from_degrees(mean_latitude, mean_longitude)
            .ok_or(GeometryError::NotRepresentable(mean_latitude))?;

        Ok(FieldGeometry {
            area_hectares,
            centroid,
        })
    }
}

/// Compute area and centroid with the default degenerate threshold
pub fn compute_area_and_centroid(boundary: &Boundary) -> Result<FieldGeometry, GeometryError> {
    GeometryCalculator::default().compute(boundary)
}

/// Normalize a raw payload and compute its geometry in one step
pub fn compute_field_geometry(raw: &Value) -> Result<FieldGeometry, GeometryError> {
    let boundary = Boundary::from_json(raw)?;
    compute_area_and_centroid(&boundary)
}

/// Round a hectare value to the stored precision.
///
/// The float is converted with its full binary expansion, so a value such as
/// 2.675 (stored as 2.67499...) rounds down the way the float really lies.
fn round_hectares(hectares: f64) -> Result<Decimal, GeometryError> {
    Decimal::from_f64_retain(hectares)
        .map(|value| {
            value.round_dp_with_strategy(AREA_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
        })
        .ok_or(GeometryError::NotRepresentable(hectares))
}

/// Shoelace sum over (x = longitude, y = latitude), cyclic, absolute, halved
fn shoelace_square_degrees(points: &[Coordinate]) -> f64 {
    let twice_area: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(current, next)| {
            current.longitude * next.latitude - next.longitude * current.latitude
        })
        .sum();
    twice_area.abs() / 2.0
}

fn check_point(index: usize, point: &Coordinate) -> Result<(), GeometryError> {
    if !point.latitude.is_finite() || !point.longitude.is_finite() {
        return Err(GeometryError::NonFinite { index });
    }
    validate_coordinate_range(point.latitude, point.longitude).map_err(|_| {
        GeometryError::OutOfRange {
            index,
            latitude: point.latitude,
            longitude: point.longitude,
        }
    })
}

fn coerce_point(index: usize, item: &Value) -> Result<Coordinate, GeometryError> {
    let pair = match item.as_array() {
        Some(pair) if pair.len() == 2 => pair,
        _ => {
            return Err(GeometryError::MalformedPoint {
                index,
                value: item.to_string(),
            })
        }
    };
    let point = Coordinate::new(
        coerce_number(index, &pair[0])?,
        coerce_number(index, &pair[1])?,
    );
    check_point(index, &point)?;
    Ok(point)
}

fn coerce_number(index: usize, value: &Value) -> Result<f64, GeometryError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.ok_or_else(|| GeometryError::InvalidNumber {
        index,
        value: value.to_string(),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

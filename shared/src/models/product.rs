//! Agro-chemical product models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::validate_product_unit;

/// Unit a product is stocked and dosed in. Treatment rates are expressed
/// per hectare in this unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UnitOfMeasure {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "L")]
    Liter,
}

impl UnitOfMeasure {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kilogram => "kg",
            UnitOfMeasure::Liter => "L",
        }
    }
}

impl std::fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for UnitOfMeasure {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_product_unit(s)?;
        if s == UnitOfMeasure::Kilogram.symbol() {
            Ok(UnitOfMeasure::Kilogram)
        } else {
            Ok(UnitOfMeasure::Liter)
        }
    }
}

/// Product category, as in the plant protection register
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    PlantProtection,
    Fertilizer,
}

impl ProductType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::PlantProtection => "plant_protection",
            ProductType::Fertilizer => "fertilizer",
        }
    }
}

impl std::str::FromStr for ProductType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plant_protection" => Ok(ProductType::PlantProtection),
            "fertilizer" => Ok(ProductType::Fertilizer),
            _ => Err("Product type must be plant_protection or fertilizer"),
        }
    }
}

/// An agro-chemical product stocked by a company
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: Uuid,
    pub company_id: Uuid,
    pub commercial_name: String,
    pub product_type: ProductType,
    pub available_quantity: Decimal,
    pub unit: UnitOfMeasure,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

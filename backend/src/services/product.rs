//! Product stock service
//!
//! Treatments reference products; the unit stored here labels their
//! totals in the register.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{validate_available_quantity, Product, ProductType, UnitOfMeasure};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use super::company::ensure_company;
use crate::error::{AppError, AppResult};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    company_id: Uuid,
    commercial_name: String,
    product_type: String,
    available_quantity: Decimal,
    unit: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = AppError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let product_type = row.product_type.parse::<ProductType>().map_err(|_| {
            AppError::Internal(format!("Unknown product type: {}", row.product_type))
        })?;
        let unit = row
            .unit
            .parse::<UnitOfMeasure>()
            .map_err(|_| AppError::Internal(format!("Unknown unit of measure: {}", row.unit)))?;

        Ok(Product {
            id: row.id,
            company_id: row.company_id,
            commercial_name: row.commercial_name,
            product_type,
            available_quantity: row.available_quantity,
            unit,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, company_id, commercial_name, product_type, \
     available_quantity, unit, created_at, updated_at";

/// Input for adding a product to the company stock
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200, message = "Commercial name must be between 1 and 200 characters"))]
    pub commercial_name: String,
    pub product_type: ProductType,
    #[serde(default)]
    pub available_quantity: Decimal,
    /// `kg` or `L`
    pub unit: String,
}

impl CreateProductInput {
    /// Checks that need no database access
    fn check(&self) -> AppResult<UnitOfMeasure> {
        validate_available_quantity(self.available_quantity).map_err(|message| {
            AppError::Validation {
                field: "available_quantity".to_string(),
                message: message.to_string(),
                message_it: "La quantità disponibile non può essere negativa".to_string(),
            }
        })?;
        self.unit.parse::<UnitOfMeasure>().map_err(|message| AppError::Validation {
            field: "unit".to_string(),
            message: message.to_string(),
            message_it: "L'unità di misura deve essere kg o L".to_string(),
        })
    }
}

/// Product service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products of a company
    pub async fn get_products(&self, company_id: Uuid) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE company_id = $1 ORDER BY commercial_name ASC",
            PRODUCT_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID
    pub async fn get_product(&self, company_id: Uuid, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 AND company_id = $2",
            PRODUCT_COLUMNS
        ))
        .bind(product_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        row.try_into()
    }

    /// Add a product to the company stock
    pub async fn create_product(
        &self,
        company_id: Uuid,
        input: CreateProductInput,
    ) -> AppResult<Product> {
        input.validate()?;
        let unit = input.check()?;

        ensure_company(&self.db, company_id).await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (id, company_id, commercial_name, product_type,
                                  available_quantity, unit)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(company_id)
        .bind(input.commercial_name.trim())
        .bind(input.product_type.as_str())
        .bind(input.available_quantity)
        .bind(unit.symbol())
        .fetch_one(&self.db)
        .await?;

        let product = Product::try_from(row)?;
        tracing::info!(product_id = %product.id, unit = %product.unit, "product added");

        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(unit: &str, quantity: Decimal) -> CreateProductInput {
        CreateProductInput {
            commercial_name: "Poltiglia Bordolese".to_string(),
            product_type: ProductType::PlantProtection,
            available_quantity: quantity,
            unit: unit.to_string(),
        }
    }

    #[test]
    fn test_check_accepts_stored_units() {
        assert_eq!(input("kg", Decimal::ZERO).check().unwrap(), UnitOfMeasure::Kilogram);
        assert_eq!(input("L", Decimal::TEN).check().unwrap(), UnitOfMeasure::Liter);
    }

    #[test]
    fn test_check_rejects_other_spellings() {
        for unit in ["KG", "l", "lbs", ""] {
            match input(unit, Decimal::ZERO).check() {
                Err(AppError::Validation { field, .. }) => assert_eq!(field, "unit"),
                other => panic!("unexpected result for {:?}: {:?}", unit, other),
            }
        }
    }

    #[test]
    fn test_check_rejects_negative_stock() {
        match input("kg", Decimal::NEGATIVE_ONE).check() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "available_quantity"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_row_round_trip_keeps_unit() {
        let now = Utc::now();
        for unit in [UnitOfMeasure::Kilogram, UnitOfMeasure::Liter] {
            let row = ProductRow {
                id: Uuid::new_v4(),
                company_id: Uuid::new_v4(),
                commercial_name: "Zolfo ventilato".to_string(),
                product_type: ProductType::Fertilizer.as_str().to_string(),
                available_quantity: Decimal::new(255, 1),
                unit: unit.symbol().to_string(),
                created_at: now,
                updated_at: now,
            };
            let product = Product::try_from(row).unwrap();
            assert_eq!(product.unit, unit);
            assert_eq!(product.product_type, ProductType::Fertilizer);
        }
    }

    #[test]
    fn test_row_with_unknown_unit_is_internal_error() {
        let now = Utc::now();
        let row = ProductRow {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            commercial_name: "Rame".to_string(),
            product_type: "plant_protection".to_string(),
            available_quantity: Decimal::ZERO,
            unit: "gal".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(Product::try_from(row), Err(AppError::Internal(_))));
    }
}

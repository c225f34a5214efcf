//! Company registry service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// A farm business owning fields, products and vehicles
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub vat_number: String,
    pub address: Option<String>,
    pub legal_representative: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for registering a company
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyInput {
    #[validate(length(min = 1, max = 200, message = "Company name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 32, message = "VAT number must be between 1 and 32 characters"))]
    pub vat_number: String,
    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 200, message = "Legal representative must be at most 200 characters"))]
    pub legal_representative: Option<String>,
}

/// Input for editing a company
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyInput {
    #[validate(length(min = 1, max = 200, message = "Company name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32, message = "VAT number must be between 1 and 32 characters"))]
    pub vat_number: Option<String>,
    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 200, message = "Legal representative must be at most 200 characters"))]
    pub legal_representative: Option<String>,
}

const COMPANY_COLUMNS: &str =
    "id, name, vat_number, address, legal_representative, created_at, updated_at";

/// Company service
#[derive(Clone)]
pub struct CompanyService {
    db: PgPool,
}

impl CompanyService {
    /// Create a new CompanyService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all companies
    pub async fn get_companies(&self) -> AppResult<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies ORDER BY name ASC",
            COMPANY_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(companies)
    }

    /// Get a company by ID
    pub async fn get_company(&self, company_id: Uuid) -> AppResult<Company> {
        sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies WHERE id = $1",
            COMPANY_COLUMNS
        ))
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))
    }

    /// Register a company. The VAT number must be unique.
    pub async fn create_company(&self, input: CreateCompanyInput) -> AppResult<Company> {
        input.validate()?;

        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            INSERT INTO companies (id, name, vat_number, address, legal_representative)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(input.vat_number.trim())
        .bind(&input.address)
        .bind(&input.legal_representative)
        .fetch_one(&self.db)
        .await
        .map_err(duplicate_vat_number)?;

        tracing::info!(company_id = %company.id, "company registered");

        Ok(company)
    }

    /// Edit company details
    pub async fn update_company(
        &self,
        company_id: Uuid,
        input: UpdateCompanyInput,
    ) -> AppResult<Company> {
        input.validate()?;

        let mut tx = self.db.begin().await?;

        let existing = sqlx::query_as::<_, Company>(&format!(
            "SELECT {} FROM companies WHERE id = $1 FOR UPDATE",
            COMPANY_COLUMNS
        ))
        .bind(company_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Company".to_string()))?;

        let name = input.name.map(|n| n.trim().to_string()).unwrap_or(existing.name);
        let vat_number = input
            .vat_number
            .map(|v| v.trim().to_string())
            .unwrap_or(existing.vat_number);
        let address = input.address.or(existing.address);
        let legal_representative = input.legal_representative.or(existing.legal_representative);

        let company = sqlx::query_as::<_, Company>(&format!(
            r#"
            UPDATE companies
            SET name = $1, vat_number = $2, address = $3, legal_representative = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING {}
            "#,
            COMPANY_COLUMNS
        ))
        .bind(name)
        .bind(vat_number)
        .bind(address)
        .bind(legal_representative)
        .bind(company_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(duplicate_vat_number)?;

        tx.commit().await?;

        Ok(company)
    }
}

/// Fail with NotFound unless the company exists
pub(crate) async fn ensure_company(db: &PgPool, company_id: Uuid) -> AppResult<()> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM companies WHERE id = $1")
        .bind(company_id)
        .fetch_one(db)
        .await?;

    if exists == 0 {
        return Err(AppError::NotFound("Company".to_string()));
    }
    Ok(())
}

fn duplicate_vat_number(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::Validation {
            field: "vat_number".to_string(),
            message: "VAT number already registered".to_string(),
            message_it: "P.IVA già esistente".to_string(),
        },
        _ => AppError::from(err),
    }
}

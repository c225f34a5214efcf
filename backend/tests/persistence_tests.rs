//! Database-backed tests
//!
//! Need a PostgreSQL database at `DATABASE_URL`; run with
//! `cargo test -- --ignored`.

use agrinote_backend::services::{
    company::CreateCompanyInput,
    field::{CreateFieldInput, UpdateFieldInput},
    product::CreateProductInput,
    treatment::CreateTreatmentInput,
    CompanyService, FieldService, ProductService, TreatmentService,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::json;
use shared::{GeometryCalculator, ProductType};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

async fn company(pool: &PgPool) -> Uuid {
    let vat = Uuid::new_v4().simple().to_string()[..11].to_string();
    CompanyService::new(pool.clone())
        .create_company(CreateCompanyInput {
            name: "Azienda Agricola Test".to_string(),
            vat_number: vat,
            address: None,
            legal_representative: None,
        })
        .await
        .unwrap()
        .id
}

fn square(side: f64) -> serde_json::Value {
    json!([
        [45.47, 9.19],
        [45.47 + side, 9.19],
        [45.47 + side, 9.19 + side],
        [45.47, 9.19 + side]
    ])
}

#[tokio::test]
#[ignore = "needs PostgreSQL at DATABASE_URL"]
async fn test_boundary_edit_keeps_register_totals() {
    let pool = pool().await;
    let company_id = company(&pool).await;
    let fields = FieldService::new(pool.clone(), GeometryCalculator::default());
    let treatments = TreatmentService::new(pool.clone());

    let product = ProductService::new(pool.clone())
        .create_product(
            company_id,
            CreateProductInput {
                commercial_name: "Poltiglia Bordolese".to_string(),
                product_type: ProductType::PlantProtection,
                available_quantity: dec("100"),
                unit: "kg".to_string(),
            },
        )
        .await
        .unwrap();

    let field = fields
        .create_field(
            company_id,
            CreateFieldInput {
                name: "Vigneto Sud".to_string(),
                boundary: Some(square(0.01)),
                current_crop: Some("Vite".to_string()),
            },
        )
        .await
        .unwrap();

    let treatment = treatments
        .create_treatment(
            company_id,
            CreateTreatmentInput {
                field_id: field.id,
                product_id: product.id,
                applied_on: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
                rate_per_hectare: dec("3.0"),
                target: Some("Peronospora".to_string()),
                operator: None,
                vehicle_id: None,
                weather_conditions: None,
                temperature_celsius: None,
                relative_humidity_percent: None,
                wind_speed_kmh: None,
                notes: None,
                product_lot_number: None,
            },
        )
        .await
        .unwrap();
    let recorded = treatment.total_quantity();
    assert_eq!(recorded, dec("3.0") * field.area_hectares());

    let redrawn = fields
        .update_field(
            company_id,
            field.id,
            UpdateFieldInput {
                name: None,
                boundary: Some(square(0.02)),
                current_crop: None,
            },
        )
        .await
        .unwrap();
    assert!(redrawn.area_hectares() > field.area_hectares());

    let register = treatments.get_register(company_id, None, None).await.unwrap();
    assert_eq!(register.len(), 1);
    assert_eq!(register[0].treatment.total_quantity(), recorded);
    assert_eq!(register[0].field_name, "Vigneto Sud");
}

#[tokio::test]
#[ignore = "needs PostgreSQL at DATABASE_URL"]
async fn test_concurrent_rename_and_redraw_both_survive() {
    let pool = pool().await;
    let company_id = company(&pool).await;
    let fields = FieldService::new(pool.clone(), GeometryCalculator::default());

    let field = fields
        .create_field(
            company_id,
            CreateFieldInput {
                name: "Campo Est".to_string(),
                boundary: Some(square(0.01)),
                current_crop: None,
            },
        )
        .await
        .unwrap();

    let redraw = fields.update_field(
        company_id,
        field.id,
        UpdateFieldInput {
            name: None,
            boundary: Some(square(0.03)),
            current_crop: None,
        },
    );
    let rename = fields.update_field(
        company_id,
        field.id,
        UpdateFieldInput {
            name: Some("Campo Est Nuovo".to_string()),
            boundary: None,
            current_crop: None,
        },
    );
    let (redrawn, renamed) = tokio::join!(redraw, rename);
    redrawn.unwrap();
    renamed.unwrap();

    let stored = fields.get_field(company_id, field.id).await.unwrap();
    let expected_area = GeometryCalculator::default()
        .compute(&shared::Boundary::from_json(&square(0.03)).unwrap())
        .unwrap()
        .area_hectares;

    assert_eq!(stored.name, "Campo Est Nuovo");
    assert_eq!(stored.area_hectares(), expected_area);
}

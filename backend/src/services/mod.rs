//! Business logic services for AgriNote

pub mod company;
pub mod field;
pub mod product;
pub mod treatment;
pub mod vehicle;

pub use company::CompanyService;
pub use field::FieldService;
pub use product::ProductService;
pub use treatment::TreatmentService;
pub use vehicle::VehicleService;

//! Domain models for AgriNote

mod field;
mod product;
mod treatment;

pub use field::*;
pub use product::*;
pub use treatment::*;

//! HTTP handlers for AgriNote

mod company;
mod field;
mod health;
mod product;
mod treatment;
mod vehicle;

pub use company::*;
pub use field::*;
pub use health::*;
pub use product::*;
pub use treatment::*;
pub use vehicle::*;

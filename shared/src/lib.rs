//! Shared types and models for AgriNote
//!
//! This crate contains the field geometry and treatment accounting core,
//! shared between the backend, the map page (via WASM), and other
//! components of the system.

pub mod accounting;
pub mod geometry;
pub mod models;
pub mod types;
pub mod validation;

pub use accounting::*;
pub use geometry::*;
pub use models::*;
pub use types::*;
pub use validation::*;

//! Shared types and analytics for the AcciNex risk platform
//!
//! This crate contains the data model and the pure analytic core shared
//! between the backend service and the dashboard (via WASM).

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;

//! HTTP handlers for the AcciNex risk analytics API

pub mod analytics;
pub mod exif;
pub mod health;
pub mod reports;
pub mod risk;
pub mod severity;

pub use analytics::*;
pub use exif::*;
pub use health::*;
pub use reports::*;
pub use risk::*;
pub use severity::*;

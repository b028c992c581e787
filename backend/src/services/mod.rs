//! Business logic services for the AcciNex risk analytics service

pub mod analytics;
pub mod exif;
pub mod reporting;
pub mod risk;

pub use analytics::AnalyticsService;
pub use exif::ExifService;
pub use reporting::ReportingService;
pub use risk::RiskService;

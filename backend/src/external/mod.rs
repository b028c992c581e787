//! External API integrations

pub mod severity_classifier;

pub use severity_classifier::SeverityClassifierClient;

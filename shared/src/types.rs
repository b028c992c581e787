//! Common types used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// GPS coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsCoordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Identifier supplied by the caller, either numeric or textual
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Number(value)
    }
}

/// Errors raised by the analytic core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("No accident data provided")]
    EmptyInput,

    #[error("Grid size must be a positive number, got {0}")]
    InvalidGridSize(f64),

    #[error("Accident record {0} has no accident_time")]
    MissingTimestamp(usize),

    #[error("Model is not fitted")]
    UnfittedModel,

    #[error("Model storage error: {0}")]
    ModelIo(String),
}

/// Result type alias for analytic operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Round a value to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

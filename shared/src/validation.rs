//! Validation utilities for the AcciNex risk platform

use std::borrow::Cow;

use validator::ValidationError;

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Check latitude is within [-90, 90]
pub fn is_valid_latitude(latitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude)
}

/// Check longitude is within [-180, 180]
pub fn is_valid_longitude(longitude: f64) -> bool {
    (-180.0..=180.0).contains(&longitude)
}

/// Validate a coordinate pair; absent values never validate
pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> bool {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => is_valid_latitude(lat) && is_valid_longitude(lng),
        _ => false,
    }
}

// ============================================================================
// Request Field Validations
// ============================================================================

/// Validate heatmap grid size is a positive, finite number of degrees
pub fn validate_grid_size(grid_size: f64) -> Result<(), ValidationError> {
    if grid_size.is_finite() && grid_size > 0.0 {
        Ok(())
    } else {
        let mut error = ValidationError::new("grid_size");
        error.message = Some(Cow::from("Grid size must be a positive number of degrees"));
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_bounds() {
        assert!(is_valid_latitude(-90.0));
        assert!(is_valid_latitude(0.0));
        assert!(is_valid_latitude(90.0));
        assert!(!is_valid_latitude(90.000001));
        assert!(!is_valid_latitude(f64::NAN));
    }

    #[test]
    fn test_longitude_bounds() {
        assert!(is_valid_longitude(-180.0));
        assert!(is_valid_longitude(180.0));
        assert!(!is_valid_longitude(-180.5));
    }

    #[test]
    fn test_validate_coordinates_requires_both() {
        assert!(validate_coordinates(Some(12.97), Some(77.59)));
        assert!(!validate_coordinates(Some(12.97), None));
        assert!(!validate_coordinates(None, Some(77.59)));
        assert!(!validate_coordinates(Some(95.0), Some(77.59)));
        assert!(!validate_coordinates(Some(12.97), Some(200.0)));
    }

    #[test]
    fn test_validate_grid_size() {
        assert!(validate_grid_size(0.01).is_ok());
        assert!(validate_grid_size(1.0).is_ok());
        assert!(validate_grid_size(0.0).is_err());
        assert!(validate_grid_size(-0.5).is_err());
        assert!(validate_grid_size(f64::INFINITY).is_err());
    }
}

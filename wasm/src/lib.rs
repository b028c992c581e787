//! WebAssembly module for the AcciNex risk dashboard
//!
//! Provides client-side computation for:
//! - Composite risk scores and levels
//! - Hotspot proximity alerts
//! - Heatmap grid binning

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Compute the composite risk score from a `RiskInputs` JSON object
#[wasm_bindgen]
pub fn compute_risk_score(inputs_json: &str) -> Result<f64, JsValue> {
    let inputs: RiskInputs = serde_json::from_str(inputs_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid risk inputs JSON: {}", e)))?;

    Ok(compute_risk(&inputs, &RiskWeights::default()).score)
}

/// Score plus per-factor breakdown, as JSON
#[wasm_bindgen]
pub fn compute_risk_breakdown(inputs_json: &str) -> Result<String, JsValue> {
    let inputs: RiskInputs = serde_json::from_str(inputs_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid risk inputs JSON: {}", e)))?;

    let result = compute_risk(&inputs, &RiskWeights::default());
    serde_json::to_string(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Classify a score as LOW, MEDIUM, HIGH or CRITICAL
#[wasm_bindgen]
pub fn classify_risk_level(score: f64) -> String {
    RiskLevel::from_score(score).to_string()
}

#[wasm_bindgen]
pub fn should_alert_for_score(score: f64, threshold: f64) -> bool {
    should_alert(score, threshold)
}

/// Check a position against hotspots (JSON array); returns alerts as JSON
#[wasm_bindgen]
pub fn check_hotspot_alerts(
    user_lat: f64,
    user_lng: f64,
    hotspots_json: &str,
    weather: Option<String>,
) -> Result<String, JsValue> {
    let hotspots: Vec<Hotspot> = serde_json::from_str(hotspots_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid hotspots JSON: {}", e)))?;

    let alerts = check_user_location(
        user_lat,
        user_lng,
        &hotspots,
        weather.as_deref(),
        &AlertSettings::default(),
    );
    serde_json::to_string(&alerts).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Great-circle distance in meters
#[wasm_bindgen]
pub fn distance_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    haversine_meters(&GpsCoordinates::new(lat1, lng1), &GpsCoordinates::new(lat2, lng2))
}

/// South-west corner of the heatmap cell containing `coordinate`
///
/// Returns NaN for a non-positive grid size, or one too fine to index.
#[wasm_bindgen]
pub fn heatmap_bin(coordinate: f64, grid_size: f64) -> f64 {
    if validate_grid_size(grid_size).is_err() {
        return f64::NAN;
    }
    grid_index(coordinate, grid_size)
        .map(|index| grid_origin(index, grid_size))
        .unwrap_or(f64::NAN)
}

#[wasm_bindgen]
pub fn is_valid_location(latitude: f64, longitude: f64) -> bool {
    validate_coordinates(Some(latitude), Some(longitude))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_risk_score() {
        let score = compute_risk_score(
            r#"{"historical_rate": 0.8, "traffic_level": 0.7, "weather_severity": 0.6, "infrastructure_score": 0.4}"#,
        )
        .unwrap();
        assert_eq!(score, 69.5);
    }

    #[test]
    fn test_compute_risk_breakdown() {
        let json = compute_risk_breakdown(r#"{"historical_rate": 1.0}"#).unwrap();
        assert!(json.contains("historical_component"));
        assert!(json.contains("\"score\":35.0"));
    }

    #[test]
    fn test_classify_risk_level() {
        assert_eq!(classify_risk_level(69.5), "HIGH");
        assert_eq!(classify_risk_level(70.0), "CRITICAL");
        assert_eq!(classify_risk_level(30.0), "MEDIUM");
        assert_eq!(classify_risk_level(0.0), "LOW");
    }

    #[test]
    fn test_should_alert_for_score() {
        assert!(should_alert_for_score(80.0, 75.0));
        assert!(!should_alert_for_score(74.0, 75.0));
    }

    #[test]
    fn test_check_hotspot_alerts() {
        let json = check_hotspot_alerts(
            12.9716,
            77.5946,
            r#"[{"id": "h1", "latitude": 12.9716, "longitude": 77.5946}]"#,
            Some("rain".to_string()),
        )
        .unwrap();
        assert!(json.contains("\"triggered\":true"));
    }

    #[test]
    fn test_heatmap_bin() {
        assert!((heatmap_bin(12.345, 0.01) - 12.34).abs() < 1e-9);
        assert!((heatmap_bin(-0.5, 1.0) + 1.0).abs() < 1e-9);
        assert!(heatmap_bin(1.0, 0.0).is_nan());
        assert!(heatmap_bin(12.0, 1e-18).is_nan());
    }

    #[test]
    fn test_distance_and_location() {
        assert_eq!(distance_meters(10.0, 10.0, 10.0, 10.0), 0.0);
        assert!(is_valid_location(45.0, 120.0));
        assert!(!is_valid_location(-91.0, 0.0));
    }
}

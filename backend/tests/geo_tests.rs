//! Spatial analytics tests
//!
//! Tests for heatmap binning, hotspot detection and proximity alerts.

use proptest::prelude::*;
use shared::{
    build_heatmap, check_user_location, detect_hotspots, haversine_meters, AccidentRecord,
    AlertSettings, AnalyticsError, ClusterParams, GpsCoordinates, Hotspot, Severity,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn severity_strategy() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Minor),
        Just(Severity::Dangerous),
        Just(Severity::Major),
        Just(Severity::Unknown),
    ]
}

/// Records scattered over a small city-sized area
fn record_strategy() -> impl Strategy<Value = AccidentRecord> {
    (12.9f64..13.1, 77.5f64..77.7, severity_strategy())
        .prop_map(|(lat, lng, severity)| AccidentRecord::new(lat, lng, severity))
}

/// Grid sizes from sub-nanodegree to multi-degree cells
fn grid_size_strategy() -> impl Strategy<Value = f64> {
    (-15.0f64..1.0).prop_map(|exponent| 10f64.powf(exponent))
}

fn hotspot_strategy() -> impl Strategy<Value = Hotspot> {
    (0i64..1000, 12.9f64..13.1, 77.5f64..77.7, 50.0f64..2000.0).prop_map(
        |(id, lat, lng, radius)| Hotspot::new(id, lat, lng).with_radius(radius),
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_heatmap_reference_cell() {
        let records = vec![
            AccidentRecord::new(12.345, 77.456, Severity::Dangerous),
            AccidentRecord::new(12.349, 77.459, Severity::Minor),
        ];
        let cells = build_heatmap(&records, 0.01).unwrap();

        assert_eq!(cells.len(), 1);
        assert!((cells[0].lat_bin - 12.34).abs() < 1e-9);
        assert!((cells[0].lng_bin - 77.45).abs() < 1e-9);
        assert_eq!(cells[0].incident_count, 2);
        assert_eq!(cells[0].dangerous_count, 1);
        assert_eq!(cells[0].intensity, 100.0);
        assert_eq!(cells[0].danger_percentage, 50.0);
    }

    #[test]
    fn test_heatmap_rejects_bad_grid() {
        let records = vec![AccidentRecord::new(1.0, 1.0, Severity::Minor)];
        assert!(matches!(
            build_heatmap(&records, -0.5),
            Err(AnalyticsError::InvalidGridSize(_))
        ));
        assert!(matches!(build_heatmap(&[], 0.01), Err(AnalyticsError::EmptyInput)));
    }

    #[test]
    fn test_heatmap_grid_too_fine_is_rejected() {
        let records = vec![
            AccidentRecord::new(12.0, 77.0, Severity::Minor),
            AccidentRecord::new(13.0, 78.0, Severity::Minor),
        ];
        assert!(matches!(
            build_heatmap(&records, 1e-18),
            Err(AnalyticsError::InvalidGridSize(_))
        ));
        assert_eq!(build_heatmap(&records, 1e-15).unwrap().len(), 2);
    }

    #[test]
    fn test_single_dense_cluster_becomes_hotspot() {
        let mut records: Vec<AccidentRecord> = (0..5)
            .map(|i| AccidentRecord::new(12.9716 + i as f64 * 0.0002, 77.5946, Severity::Dangerous))
            .collect();
        records.push(AccidentRecord::new(13.5, 78.5, Severity::Minor));

        let hotspots = detect_hotspots(&records, &ClusterParams::hotspots()).unwrap();

        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].incident_count, Some(5));
        assert_eq!(hotspots[0].dangerous_count, Some(5));
        assert!(hotspots[0].radius_meters.unwrap_or_default() >= 100.0);
    }

    #[test]
    fn test_alert_inside_and_outside() {
        let hotspots = vec![
            Hotspot::new("near", 12.9716, 77.5946).with_radius(500.0),
            Hotspot::new("far", 13.0827, 80.2707).with_radius(500.0),
        ];
        let alerts = check_user_location(12.9717, 77.5947, &hotspots, None, &AlertSettings::default());

        assert_eq!(alerts.len(), 2);
        assert!(alerts[0].triggered);
        assert!(!alerts[1].triggered);
    }

    #[test]
    fn test_storm_widens_radius() {
        let hotspot = Hotspot::new(1, 12.9716, 77.5946).with_radius(500.0);
        // Roughly 700 m north
        let user = (12.9779, 77.5946);

        let clear = check_user_location(user.0, user.1, &[hotspot.clone()], None, &AlertSettings::default());
        let storm = check_user_location(
            user.0,
            user.1,
            &[hotspot],
            Some("storm"),
            &AlertSettings::default(),
        );

        assert!(!clear[0].triggered);
        assert!(storm[0].triggered);
        assert!((storm[0].effective_radius - 950.0).abs() < 0.01);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every record lands in exactly one cell and intensities cover 100%
        #[test]
        fn prop_heatmap_conserves_incidents(
            records in prop::collection::vec(record_strategy(), 1..60),
            grid_size in grid_size_strategy()
        ) {
            let cells = build_heatmap(&records, grid_size).unwrap();

            let total: usize = cells.iter().map(|c| c.incident_count).sum();
            prop_assert_eq!(total, records.len());

            let intensity: f64 = cells.iter().map(|c| c.intensity).sum();
            prop_assert!((intensity - 100.0).abs() <= 0.005 * cells.len() as f64 + 1e-6);

            for cell in &cells {
                prop_assert!(cell.dangerous_count <= cell.incident_count);
                prop_assert!((0.0..=100.0).contains(&cell.danger_percentage));
            }
        }

        /// Triggering follows distance vs effective radius, nearest first
        #[test]
        fn prop_alerts_consistent(
            lat in 12.9f64..13.1,
            lng in 77.5f64..77.7,
            hotspots in prop::collection::vec(hotspot_strategy(), 0..20)
        ) {
            let alerts = check_user_location(lat, lng, &hotspots, Some("rain"), &AlertSettings::default());

            prop_assert_eq!(alerts.len(), hotspots.len());
            for alert in &alerts {
                if alert.triggered {
                    prop_assert!(alert.distance <= alert.effective_radius);
                } else {
                    prop_assert!(alert.distance >= alert.effective_radius);
                }
            }
            for pair in alerts.windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
            }
        }

        /// Haversine distance is symmetric and zero on the diagonal
        #[test]
        fn prop_distance_symmetric(
            a_lat in -89.0f64..89.0, a_lng in -179.0f64..179.0,
            b_lat in -89.0f64..89.0, b_lng in -179.0f64..179.0
        ) {
            let a = GpsCoordinates::new(a_lat, a_lng);
            let b = GpsCoordinates::new(b_lat, b_lng);

            prop_assert!((haversine_meters(&a, &b) - haversine_meters(&b, &a)).abs() < 1e-6);
            prop_assert!(haversine_meters(&a, &a).abs() < 1e-6);
        }
    }
}

//! Hotspot detection from accident clusters

use std::collections::BTreeMap;

use crate::models::accident::AccidentRecord;
use crate::models::alert::Hotspot;
use crate::models::cluster::{dbscan, haversine_meters, ClusterParams, NOISE};
use crate::models::risk::RiskLevel;
use crate::types::{round_to, AnalyticsError, AnalyticsResult, GpsCoordinates, RecordId};

/// Smallest radius reported for a detected hotspot
pub const MIN_HOTSPOT_RADIUS_METERS: f64 = 100.0;

/// Cluster accident records into ranked hotspots
///
/// Noise points are dropped. Hotspots are ordered by incident count
/// (descending), then by id.
pub fn detect_hotspots(
    records: &[AccidentRecord],
    params: &ClusterParams,
) -> AnalyticsResult<Vec<Hotspot>> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let points: Vec<GpsCoordinates> = records.iter().map(AccidentRecord::coordinates).collect();
    let labels = dbscan(&points, params);

    let mut members: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (index, label) in labels.iter().enumerate() {
        if *label != NOISE {
            members.entry(*label).or_default().push(index);
        }
    }

    let mut hotspots: Vec<Hotspot> = members
        .into_iter()
        .map(|(label, indices)| build_hotspot(label, &indices, records, &points))
        .collect();

    hotspots.sort_by(|a, b| {
        b.incident_count
            .cmp(&a.incident_count)
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(hotspots)
}

fn build_hotspot(
    label: i32,
    indices: &[usize],
    records: &[AccidentRecord],
    points: &[GpsCoordinates],
) -> Hotspot {
    let count = indices.len();
    let center = GpsCoordinates::new(
        indices.iter().map(|&i| points[i].latitude).sum::<f64>() / count as f64,
        indices.iter().map(|&i| points[i].longitude).sum::<f64>() / count as f64,
    );
    let spread = indices
        .iter()
        .map(|&i| haversine_meters(&center, &points[i]))
        .fold(0.0, f64::max);
    let dangerous = indices.iter().filter(|&&i| records[i].is_dangerous()).count();
    let danger_share = dangerous as f64 / count as f64 * 100.0;

    Hotspot {
        id: RecordId::Text(format!("hotspot-{}", label)),
        latitude: round_to(center.latitude, 6),
        longitude: round_to(center.longitude, 6),
        radius_meters: Some(round_to(spread.max(MIN_HOTSPOT_RADIUS_METERS), 2)),
        risk_level: Some(RiskLevel::from_score(danger_share)),
        incident_count: Some(count),
        dangerous_count: Some(dangerous),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::accident::Severity;

    fn cluster_at(lat: f64, lng: f64, n: usize, dangerous: usize) -> Vec<AccidentRecord> {
        (0..n)
            .map(|i| {
                let severity = if i < dangerous {
                    Severity::Dangerous
                } else {
                    Severity::Minor
                };
                AccidentRecord::new(lat + i as f64 * 0.0005, lng, severity)
            })
            .collect()
    }

    #[test]
    fn test_detects_ranked_hotspots() {
        let mut records = cluster_at(12.97, 77.59, 3, 3);
        records.extend(cluster_at(13.20, 77.70, 5, 1));
        records.push(AccidentRecord::new(-33.86, 151.21, Severity::Major));

        let hotspots = detect_hotspots(&records, &ClusterParams::hotspots()).unwrap();
        assert_eq!(hotspots.len(), 2);

        assert_eq!(hotspots[0].id, RecordId::from("hotspot-1"));
        assert_eq!(hotspots[0].incident_count, Some(5));
        assert_eq!(hotspots[0].risk_level, Some(RiskLevel::Low));

        assert_eq!(hotspots[1].id, RecordId::from("hotspot-0"));
        assert_eq!(hotspots[1].dangerous_count, Some(3));
        assert_eq!(hotspots[1].risk_level, Some(RiskLevel::Critical));
    }

    #[test]
    fn test_radius_has_floor() {
        let records = vec![
            AccidentRecord::new(10.0, 10.0, Severity::Minor),
            AccidentRecord::new(10.0, 10.0, Severity::Minor),
            AccidentRecord::new(10.0, 10.0, Severity::Minor),
        ];
        let hotspots = detect_hotspots(&records, &ClusterParams::hotspots()).unwrap();
        assert_eq!(hotspots[0].radius_meters, Some(MIN_HOTSPOT_RADIUS_METERS));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            detect_hotspots(&[], &ClusterParams::hotspots()),
            Err(AnalyticsError::EmptyInput)
        );
    }
}

//! Temporal and spatial accident pattern aggregation

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::accident::{AccidentRecord, Severity};
use crate::models::cluster::{dbscan, ClusterParams};
use crate::types::{AnalyticsError, AnalyticsResult, GpsCoordinates};

/// Aggregated view of a batch of accidents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternSummary {
    /// Hour of day (0-23) -> count
    pub hourly: BTreeMap<u32, usize>,
    /// Day of week (0 = Monday .. 6 = Sunday) -> count
    pub daily: BTreeMap<u32, usize>,
    /// Month (1-12) -> count
    pub monthly: BTreeMap<u32, usize>,
    pub severity: BTreeMap<Severity, usize>,
    /// Cluster label -> count, with -1 for unclustered points
    pub location_clusters: BTreeMap<i32, usize>,
    pub total_accidents: usize,
    pub peak_hour: u32,
    pub peak_day: u32,
}

fn zero_filled(keys: std::ops::RangeInclusive<u32>) -> BTreeMap<u32, usize> {
    keys.map(|k| (k, 0)).collect()
}

/// Key with the highest count; ties go to the lowest key
fn peak(histogram: &BTreeMap<u32, usize>) -> u32 {
    histogram
        .iter()
        .fold(None, |best: Option<(u32, usize)>, (&key, &count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((key, count)),
        })
        .map(|(key, _)| key)
        .unwrap_or(0)
}

/// Summarize when, how badly and where accidents happen
///
/// Every record must carry a timestamp.
pub fn analyze_patterns(
    records: &[AccidentRecord],
    params: &ClusterParams,
) -> AnalyticsResult<PatternSummary> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }

    let mut hourly = zero_filled(0..=23);
    let mut daily = zero_filled(0..=6);
    let mut monthly = zero_filled(1..=12);
    let mut severity: BTreeMap<Severity, usize> = BTreeMap::new();

    for (index, record) in records.iter().enumerate() {
        let ts = record
            .timestamp
            .ok_or(AnalyticsError::MissingTimestamp(index))?;

        *hourly.entry(ts.hour()).or_insert(0) += 1;
        *daily.entry(ts.weekday().num_days_from_monday()).or_insert(0) += 1;
        *monthly.entry(ts.month()).or_insert(0) += 1;
        *severity.entry(record.severity).or_insert(0) += 1;
    }

    let points: Vec<GpsCoordinates> = records.iter().map(AccidentRecord::coordinates).collect();
    let mut location_clusters: BTreeMap<i32, usize> = BTreeMap::new();
    for label in dbscan(&points, params) {
        *location_clusters.entry(label).or_insert(0) += 1;
    }

    Ok(PatternSummary {
        peak_hour: peak(&hourly),
        peak_day: peak(&daily),
        hourly,
        daily,
        monthly,
        severity,
        location_clusters,
        total_accidents: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cluster::NOISE;
    use chrono::NaiveDate;

    fn record(lat: f64, day: u32, hour: u32, severity: Severity) -> AccidentRecord {
        // January 2024 starts on a Monday
        let ts = NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap();
        AccidentRecord::new(lat, 77.59, severity).with_timestamp(ts)
    }

    #[test]
    fn test_histograms_and_peaks() {
        let records = vec![
            record(12.97, 1, 8, Severity::Minor),
            record(12.97, 1, 8, Severity::Dangerous),
            record(12.97, 3, 18, Severity::Dangerous),
            record(12.97, 3, 18, Severity::Major),
            record(40.00, 7, 2, Severity::Unknown),
        ];
        let summary = analyze_patterns(&records, &ClusterParams::patterns()).unwrap();

        assert_eq!(summary.total_accidents, 5);
        assert_eq!(summary.hourly.len(), 24);
        assert_eq!(summary.hourly[&8], 2);
        assert_eq!(summary.hourly[&18], 2);
        // tie between 8 and 18 resolves to the lower hour
        assert_eq!(summary.peak_hour, 8);

        assert_eq!(summary.daily[&0], 2);
        assert_eq!(summary.daily[&2], 2);
        assert_eq!(summary.daily[&6], 1);
        assert_eq!(summary.peak_day, 0);

        assert_eq!(summary.monthly[&1], 5);
        assert_eq!(summary.monthly[&12], 0);

        assert_eq!(summary.severity[&Severity::Dangerous], 2);
        assert_eq!(summary.severity[&Severity::Unknown], 1);
        assert_eq!(summary.severity[&Severity::Minor], 1);

        assert_eq!(summary.location_clusters[&0], 4);
        assert_eq!(summary.location_clusters[&NOISE], 1);
    }

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(
            analyze_patterns(&[], &ClusterParams::patterns()),
            Err(AnalyticsError::EmptyInput)
        );
    }

    #[test]
    fn test_missing_timestamp_reports_index() {
        let records = vec![
            record(12.97, 1, 8, Severity::Minor),
            AccidentRecord::new(12.97, 77.59, Severity::Minor),
        ];
        assert_eq!(
            analyze_patterns(&records, &ClusterParams::patterns()),
            Err(AnalyticsError::MissingTimestamp(1))
        );
    }

    #[test]
    fn test_severity_serializes_by_name() {
        let records = vec![record(12.97, 2, 9, Severity::Major)];
        let summary = analyze_patterns(&records, &ClusterParams::patterns()).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["severity"]["major"], 1);
        assert_eq!(json["location_clusters"]["-1"], 1);
        assert_eq!(json["hourly"]["9"], 1);
    }
}

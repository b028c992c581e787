//! Grid heatmap models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::accident::AccidentRecord;
use crate::types::{round_to, AnalyticsError, AnalyticsResult};

/// Default cell edge in degrees (roughly 1.1 km of latitude)
pub const DEFAULT_GRID_SIZE: f64 = 0.01;

/// Aggregated incidents within one grid cell
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeatmapCell {
    /// South-west corner latitude
    pub lat_bin: f64,
    /// South-west corner longitude
    pub lng_bin: f64,
    pub incident_count: usize,
    pub dangerous_count: usize,
    /// Share of all input incidents, in percent
    pub intensity: f64,
    /// Share of this cell's incidents that are dangerous, in percent
    pub danger_percentage: f64,
}

/// Index of the cell containing `coordinate`, or `None` when the grid is so
/// fine that the index does not fit in an `i64`
pub fn grid_index(coordinate: f64, grid_size: f64) -> Option<i64> {
    let scaled = (coordinate / grid_size).floor();
    (scaled.is_finite() && scaled >= i64::MIN as f64 && scaled < i64::MAX as f64)
        .then_some(scaled as i64)
}

pub fn grid_origin(index: i64, grid_size: f64) -> f64 {
    index as f64 * grid_size
}

/// Bucket records into a lat/lng grid
///
/// Cells come back ordered by latitude bin, then longitude bin.
pub fn build_heatmap(records: &[AccidentRecord], grid_size: f64) -> AnalyticsResult<Vec<HeatmapCell>> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptyInput);
    }
    if !grid_size.is_finite() || grid_size <= 0.0 {
        return Err(AnalyticsError::InvalidGridSize(grid_size));
    }

    let mut cells: BTreeMap<(i64, i64), (usize, usize)> = BTreeMap::new();
    for record in records {
        let key = match (
            grid_index(record.latitude, grid_size),
            grid_index(record.longitude, grid_size),
        ) {
            (Some(lat_index), Some(lng_index)) => (lat_index, lng_index),
            _ => return Err(AnalyticsError::InvalidGridSize(grid_size)),
        };
        let entry = cells.entry(key).or_insert((0, 0));
        entry.0 += 1;
        if record.is_dangerous() {
            entry.1 += 1;
        }
    }

    let total = records.len() as f64;
    Ok(cells
        .into_iter()
        .map(|((lat_index, lng_index), (incidents, dangerous))| HeatmapCell {
            lat_bin: grid_origin(lat_index, grid_size),
            lng_bin: grid_origin(lng_index, grid_size),
            incident_count: incidents,
            dangerous_count: dangerous,
            intensity: round_to(incidents as f64 / total * 100.0, 2),
            danger_percentage: round_to(dangerous as f64 / incidents as f64 * 100.0, 2),
        })
        .collect())
}

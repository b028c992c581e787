//! Density-based spatial clustering over great-circle distance

use std::collections::VecDeque;

use geo::{HaversineDistance, Point};
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// Mean earth radius in meters (same constant `geo` uses)
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Label assigned to points that belong to no cluster
pub const NOISE: i32 = -1;

/// DBSCAN neighborhood parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClusterParams {
    /// Neighborhood radius in meters
    pub eps_meters: f64,
    /// Points (self included) needed for a core point
    pub min_points: usize,
}

impl ClusterParams {
    pub fn new(eps_meters: f64, min_points: usize) -> Self {
        Self {
            eps_meters,
            min_points,
        }
    }

    /// Coarse clustering for pattern summaries: 0.01 rad, 3 points
    pub fn patterns() -> Self {
        Self::new(0.01 * EARTH_RADIUS_METERS, 3)
    }

    /// Street-level clustering for hotspot detection: 500 m, 3 points
    pub fn hotspots() -> Self {
        Self::new(500.0, 3)
    }
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self::patterns()
    }
}

/// Great-circle distance in meters
pub fn haversine_meters(a: &GpsCoordinates, b: &GpsCoordinates) -> f64 {
    let from = Point::new(a.longitude, a.latitude);
    let to = Point::new(b.longitude, b.latitude);
    from.haversine_distance(&to)
}

/// Label each point with a cluster index, or [`NOISE`]
///
/// Clusters are numbered from 0 in the order their first core point appears
/// in the input. Neighbourhoods are computed on demand, at most once per
/// point, so memory stays linear in the number of points.
pub fn dbscan(points: &[GpsCoordinates], params: &ClusterParams) -> Vec<i32> {
    let region = |i: usize| -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, q)| haversine_meters(&points[i], q) <= params.eps_meters)
            .map(|(j, _)| j)
            .collect()
    };

    let mut labels = vec![NOISE; points.len()];
    let mut visited = vec![false; points.len()];
    let mut next_label = 0;

    for start in 0..points.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;

        let seeds = region(start);
        if seeds.len() < params.min_points {
            // may still become a border point of a later cluster
            continue;
        }

        labels[start] = next_label;
        let mut queue = VecDeque::new();
        for n in seeds {
            if labels[n] == NOISE {
                labels[n] = next_label;
            }
            if !visited[n] {
                visited[n] = true;
                queue.push_back(n);
            }
        }

        while let Some(current) = queue.pop_front() {
            let reach = region(current);
            if reach.len() < params.min_points {
                continue;
            }
            for n in reach {
                if labels[n] == NOISE {
                    labels[n] = next_label;
                }
                if !visited[n] {
                    visited[n] = true;
                    queue.push_back(n);
                }
            }
        }

        next_label += 1;
    }

    labels
}

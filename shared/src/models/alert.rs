//! Location-based hotspot alerting

use serde::{Deserialize, Serialize};

use crate::models::cluster::haversine_meters;
use crate::models::risk::{weather_severity, RiskLevel};
use crate::types::{round_to, GpsCoordinates, RecordId};

/// Radius used when a hotspot does not define one
pub const DEFAULT_HOTSPOT_RADIUS_METERS: f64 = 500.0;

/// A known high-risk location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hotspot {
    pub id: RecordId,
    #[serde(alias = "center_lat", alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "center_lng", alias = "lng")]
    pub longitude: f64,
    #[serde(default, alias = "radius", skip_serializing_if = "Option::is_none")]
    pub radius_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dangerous_count: Option<usize>,
}

impl Hotspot {
    pub fn new(id: impl Into<RecordId>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            radius_meters: None,
            risk_level: None,
            incident_count: None,
            dangerous_count: None,
        }
    }

    pub fn with_radius(mut self, radius_meters: f64) -> Self {
        self.radius_meters = Some(radius_meters);
        self
    }

    pub fn center(&self) -> GpsCoordinates {
        GpsCoordinates::new(self.latitude, self.longitude)
    }
}

/// Weather as sent by clients: a bare condition or a provider object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WeatherReport {
    Condition(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        main: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl WeatherReport {
    /// Condition text, preferring `condition`, then `main`, then `description`
    pub fn condition(&self) -> &str {
        match self {
            WeatherReport::Condition(condition) => condition,
            WeatherReport::Detailed {
                condition,
                main,
                description,
            } => condition
                .as_deref()
                .or(main.as_deref())
                .or(description.as_deref())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AlertSettings {
    pub default_radius_meters: f64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            default_radius_meters: DEFAULT_HOTSPOT_RADIUS_METERS,
        }
    }
}

/// Proximity result for one (user, hotspot) pair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotspotAlert {
    pub hotspot_id: RecordId,
    /// Meters from the user to the hotspot center
    pub distance: f64,
    pub effective_radius: f64,
    pub triggered: bool,
    pub reason: String,
}

/// Factor applied to hotspot radii under bad weather
///
/// Clear weather keeps the radius; rain, fog and storms widen it by their
/// severity (rain ×1.6, fog ×1.5, storm ×1.9).
pub fn weather_radius_multiplier(weather: Option<&str>) -> f64 {
    1.0 + weather.map(weather_severity).unwrap_or(0.0)
}

pub fn check_user_location(
    user_lat: f64,
    user_lng: f64,
    hotspots: &[Hotspot],
    weather: Option<&str>,
    settings: &AlertSettings,
) -> Vec<HotspotAlert> {
    let user = GpsCoordinates::new(user_lat, user_lng);
    let multiplier = weather_radius_multiplier(weather);

    let mut alerts: Vec<HotspotAlert> = hotspots
        .iter()
        .map(|hotspot| {
            let distance = haversine_meters(&user, &hotspot.center());
            let base_radius = hotspot
                .radius_meters
                .unwrap_or(settings.default_radius_meters);
            let effective_radius = base_radius * multiplier;
            let triggered = distance <= effective_radius;

            let mut reason = if triggered {
                format!(
                    "Within {:.0} m of hotspot {} ({:.0} m away)",
                    effective_radius, hotspot.id, distance
                )
            } else {
                format!(
                    "Outside the {:.0} m radius of hotspot {} ({:.0} m away)",
                    effective_radius, hotspot.id, distance
                )
            };
            if multiplier > 1.0 {
                if let Some(condition) = weather {
                    reason.push_str(&format!(
                        "; radius widened ×{:.1} for {} weather",
                        multiplier,
                        condition.to_lowercase()
                    ));
                }
            }

            HotspotAlert {
                hotspot_id: hotspot.id.clone(),
                distance: round_to(distance, 2),
                effective_radius: round_to(effective_radius, 2),
                triggered,
                reason,
            }
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.hotspot_id.cmp(&b.hotspot_id))
    });
    alerts
}

//! Location risk scoring and proximity alert service

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    assess_risk, check_user_location, AlertSettings, GpsCoordinates, Hotspot, HotspotAlert,
    RiskContext, RiskLevel, WeatherReport,
};
use validator::Validate;

use crate::config::Config;
use crate::error::AppResult;

/// Risk service for scoring locations and checking hotspot proximity
#[derive(Clone)]
pub struct RiskService {
    config: Arc<Config>,
}

/// Input for predicting the risk of a location
#[derive(Debug, Deserialize, Validate)]
pub struct PredictRiskInput {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    pub weather_condition: Option<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub traffic_level: Option<f64>,
    #[validate(range(max = 23))]
    pub hour: Option<u32>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub historical_rate: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub infrastructure_score: Option<f64>,
}

/// Risk prediction response
#[derive(Debug, Serialize)]
pub struct RiskPrediction {
    pub success: bool,
    pub location: GpsCoordinates,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub breakdown: BTreeMap<String, f64>,
    pub alert: bool,
    pub recommendations: Vec<String>,
    pub message: String,
}

/// Input for checking a user's position against known hotspots
#[derive(Debug, Deserialize, Validate)]
pub struct CheckAlertsInput {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
    #[serde(default)]
    pub weather: Option<WeatherReport>,
}

#[derive(Debug, Serialize)]
pub struct AlertCheck {
    pub alerts: Vec<HotspotAlert>,
    pub triggered_count: usize,
}

impl RiskService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Score a location from the request signals
    pub fn predict_risk(&self, input: PredictRiskInput) -> AppResult<RiskPrediction> {
        input.validate()?;

        let defaults = RiskContext::default();
        let ctx = RiskContext {
            weather_condition: input
                .weather_condition
                .unwrap_or(defaults.weather_condition),
            traffic_level: input.traffic_level.unwrap_or(defaults.traffic_level),
            hour: input.hour,
            historical_rate: input.historical_rate.unwrap_or(defaults.historical_rate),
            infrastructure_score: input
                .infrastructure_score
                .unwrap_or(self.config.risk.default_infrastructure_score),
        };

        let assessment = assess_risk(&ctx, &self.config.risk.weights, self.config.risk.alert_threshold);
        tracing::info!(
            latitude = input.latitude,
            longitude = input.longitude,
            score = assessment.result.score,
            level = %assessment.level,
            "Risk predicted"
        );

        Ok(RiskPrediction {
            success: true,
            location: GpsCoordinates::new(input.latitude, input.longitude),
            risk_score: assessment.result.score,
            message: format!(
                "Risk prediction: {} ({}/100)",
                assessment.level, assessment.result.score
            ),
            risk_level: assessment.level,
            breakdown: assessment.result.breakdown,
            alert: assessment.alert,
            recommendations: assessment.recommendations,
        })
    }

    /// Check which hotspots the user is within range of
    pub fn check_alerts(&self, input: CheckAlertsInput) -> AppResult<AlertCheck> {
        input.validate()?;

        let settings = AlertSettings {
            default_radius_meters: self.config.alerts.default_radius_meters,
        };
        let weather = input.weather.as_ref().map(WeatherReport::condition);
        let alerts = check_user_location(
            input.latitude,
            input.longitude,
            &input.hotspots,
            weather,
            &settings,
        );
        let triggered_count = alerts.iter().filter(|a| a.triggered).count();

        tracing::debug!(
            hotspots = input.hotspots.len(),
            triggered = triggered_count,
            "Alerts checked"
        );

        Ok(AlertCheck {
            alerts,
            triggered_count,
        })
    }
}

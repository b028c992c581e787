//! Composite risk scoring models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::round_to;

/// Score at or above which a location raises an alert
pub const DEFAULT_ALERT_THRESHOLD: f64 = 75.0;

/// Normalized risk signals, each nominally in [0, 1]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskInputs {
    pub historical_rate: f64,
    pub traffic_level: f64,
    pub weather_severity: f64,
    /// 1.0 means good infrastructure
    pub infrastructure_score: f64,
}

impl Default for RiskInputs {
    fn default() -> Self {
        Self {
            historical_rate: 0.0,
            traffic_level: 0.0,
            weather_severity: 0.0,
            infrastructure_score: 1.0,
        }
    }
}

/// Factor weights for the composite score
///
/// The score only stays within [0, 100] when the weights sum to 1.0; this is
/// left to whoever configures them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskWeights {
    pub historical: f64,
    pub traffic: f64,
    pub weather: f64,
    pub infrastructure: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            historical: 0.35,
            traffic: 0.25,
            weather: 0.2,
            infrastructure: 0.2,
        }
    }
}

impl RiskWeights {
    pub fn total(&self) -> f64 {
        self.historical + self.traffic + self.weather + self.infrastructure
    }

    /// Pair each input with its weight; infrastructure is inverted
    pub fn factors(&self, inputs: &RiskInputs) -> Vec<RiskFactor> {
        vec![
            RiskFactor::new("historical", inputs.historical_rate, self.historical),
            RiskFactor::new("traffic", inputs.traffic_level, self.traffic),
            RiskFactor::new("weather", inputs.weather_severity, self.weather),
            RiskFactor::inverted(
                "infrastructure",
                inputs.infrastructure_score,
                self.infrastructure,
            ),
        ]
    }
}

/// One weighted term of the composite score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFactor {
    pub name: String,
    pub value: f64,
    pub weight: f64,
    /// Higher values lower the risk
    #[serde(default)]
    pub inverted: bool,
}

impl RiskFactor {
    pub fn new(name: impl Into<String>, value: f64, weight: f64) -> Self {
        Self {
            name: name.into(),
            value,
            weight,
            inverted: false,
        }
    }

    pub fn inverted(name: impl Into<String>, value: f64, weight: f64) -> Self {
        Self {
            inverted: true,
            ..Self::new(name, value, weight)
        }
    }

    pub fn risk_value(&self) -> f64 {
        if self.inverted {
            1.0 - self.value
        } else {
            self.value
        }
    }

    pub fn contribution(&self) -> f64 {
        self.risk_value() * self.weight
    }
}

/// Composite score with its per-factor breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskResult {
    /// Clamped to [0, 100], rounded to 2 decimals
    pub score: f64,
    /// `{name}_component` -> contribution × 100, neither clamped nor rounded
    pub breakdown: BTreeMap<String, f64>,
}

/// Evaluate an arbitrary list of weighted factors
pub fn evaluate_factors(factors: &[RiskFactor]) -> RiskResult {
    let weighted: f64 = factors.iter().map(RiskFactor::contribution).sum();
    let breakdown = factors
        .iter()
        .map(|f| (format!("{}_component", f.name), f.contribution() * 100.0))
        .collect();

    RiskResult {
        score: round_to(weighted.clamp(0.0, 1.0) * 100.0, 2),
        breakdown,
    }
}

/// Compute the composite risk score for the four standard factors
pub fn compute_risk(inputs: &RiskInputs, weights: &RiskWeights) -> RiskResult {
    evaluate_factors(&weights.factors(inputs))
}

pub fn should_alert(score: f64, threshold: f64) -> bool {
    score >= threshold
}

/// Categorical risk level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 30.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ============================================================================
// Request Signal Derivation
// ============================================================================

/// Severity in [0, 1] for a free-text weather condition
///
/// Keywords are matched in order: rain, storm, fog.
pub fn weather_severity(condition: &str) -> f64 {
    let condition = condition.to_lowercase();
    if condition.contains("rain") {
        0.6
    } else if condition.contains("storm") {
        0.9
    } else if condition.contains("fog") {
        0.5
    } else {
        0.0
    }
}

pub fn is_night_hour(hour: u32) -> bool {
    hour < 6 || hour > 18
}

const NIGHT_TRAFFIC_BOOST: f64 = 0.2;

/// Raw request signals before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RiskContext {
    pub weather_condition: String,
    pub traffic_level: f64,
    pub hour: Option<u32>,
    pub historical_rate: f64,
    pub infrastructure_score: f64,
}

impl Default for RiskContext {
    fn default() -> Self {
        Self {
            weather_condition: "clear".to_string(),
            traffic_level: 0.5,
            hour: None,
            historical_rate: 0.3,
            infrastructure_score: 0.7,
        }
    }
}

impl RiskContext {
    pub fn is_night(&self) -> bool {
        self.hour.map(is_night_hour).unwrap_or(false)
    }
}

pub fn derive_risk_inputs(ctx: &RiskContext) -> RiskInputs {
    let traffic_level = if ctx.is_night() {
        (ctx.traffic_level + NIGHT_TRAFFIC_BOOST).min(1.0)
    } else {
        ctx.traffic_level
    };

    RiskInputs {
        historical_rate: ctx.historical_rate,
        traffic_level,
        weather_severity: weather_severity(&ctx.weather_condition),
        infrastructure_score: ctx.infrastructure_score,
    }
}

pub fn recommendations(score: f64, inputs: &RiskInputs, night: bool) -> Vec<String> {
    let mut advice = Vec::new();
    if score > 50.0 {
        advice.push("Reduce speed in this area".to_string());
    }
    if inputs.weather_severity > 0.5 {
        advice.push("Use caution during rainy conditions".to_string());
    }
    if night {
        advice.push("Be extra alert during night hours".to_string());
    }
    advice
}

/// Full assessment of a location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskAssessment {
    pub inputs: RiskInputs,
    pub result: RiskResult,
    pub level: RiskLevel,
    pub alert: bool,
    pub recommendations: Vec<String>,
}

pub fn assess_risk(ctx: &RiskContext, weights: &RiskWeights, threshold: f64) -> RiskAssessment {
    let inputs = derive_risk_inputs(ctx);
    let result = compute_risk(&inputs, weights);
    let advice = recommendations(result.score, &inputs, ctx.is_night());

    RiskAssessment {
        inputs,
        level: RiskLevel::from_score(result.score),
        alert: should_alert(result.score, threshold),
        recommendations: advice,
        result,
    }
}

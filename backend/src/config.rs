//! Configuration management for the AcciNex risk analytics service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ACCINEX_ prefix

use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{ClusterParams, ForecastStrategy, RiskWeights};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Risk scoring configuration
    pub risk: RiskConfig,

    /// Proximity alert configuration
    pub alerts: AlertsConfig,

    /// Clustering used by pattern analysis
    pub patterns: ClusterConfig,

    /// Clustering used by hotspot detection
    pub hotspots: ClusterConfig,

    /// Heatmap configuration
    pub heatmap: HeatmapConfig,

    /// Forecaster configuration
    pub forecast: ForecastConfig,

    /// Image metadata configuration
    pub exif: ExifConfig,

    /// External severity classifier
    pub severity: SeverityConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RiskConfig {
    /// Score at or above which `alert` is set
    pub alert_threshold: f64,

    /// Infrastructure score assumed when a request omits it
    pub default_infrastructure_score: f64,

    /// Factor weights
    pub weights: RiskWeights,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AlertsConfig {
    /// Radius for hotspots that do not define one
    pub default_radius_meters: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClusterConfig {
    pub eps_meters: f64,
    pub min_points: usize,
}

impl ClusterConfig {
    pub fn params(&self) -> ClusterParams {
        ClusterParams::new(self.eps_meters, self.min_points)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HeatmapConfig {
    /// Grid cell size in degrees
    pub default_grid_size: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastConfig {
    pub strategy: ForecastStrategy,

    /// Location of the persisted model blob
    pub model_path: PathBuf,

    /// Save the fitted model after each forecast
    pub persist_model: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExifConfig {
    /// Fall back to the file modification time for the capture timestamp
    pub mtime_fallback: bool,

    /// When set, image paths must resolve inside this directory
    pub upload_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeverityConfig {
    /// Severity classifier endpoint
    pub endpoint: Option<String>,

    /// Severity classifier API key
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ACCINEX_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ACCINEX_ prefix)
            .add_source(
                Environment::with_prefix("ACCINEX")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Code defaults only, no files or environment
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("development")?.build()?.try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let weights = RiskWeights::default();

        config::Config::builder()
            // Start with default values
            .set_default("environment", environment)?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("risk.alert_threshold", shared::DEFAULT_ALERT_THRESHOLD)?
            .set_default("risk.default_infrastructure_score", 0.7)?
            .set_default("risk.weights.historical", weights.historical)?
            .set_default("risk.weights.traffic", weights.traffic)?
            .set_default("risk.weights.weather", weights.weather)?
            .set_default("risk.weights.infrastructure", weights.infrastructure)?
            .set_default("alerts.default_radius_meters", shared::DEFAULT_HOTSPOT_RADIUS_METERS)?
            .set_default("patterns.eps_meters", ClusterParams::patterns().eps_meters)?
            .set_default("patterns.min_points", 3)?
            .set_default("hotspots.eps_meters", ClusterParams::hotspots().eps_meters)?
            .set_default("hotspots.min_points", 3)?
            .set_default("heatmap.default_grid_size", shared::DEFAULT_GRID_SIZE)?
            .set_default("forecast.strategy", "trend")?
            .set_default("forecast.model_path", "ai_models/forecaster.json")?
            .set_default("forecast.persist_model", false)?
            .set_default("exif.mtime_fallback", true)?
            .set_default("severity.timeout_secs", 30)
    }
}

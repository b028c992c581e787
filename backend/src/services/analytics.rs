//! Accident analytics service: patterns, heatmaps, hotspots and forecasts

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{
    analyze_patterns, build_heatmap, daily_counts, detect_hotspots, AccidentRecord, AccidentTime,
    ClusterParams, FittedForecast, ForecastPoint, ForecastStrategy, Forecaster, HeatmapCell,
    Hotspot, PatternSummary,
};
use validator::Validate;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Default forecast horizon in days
pub const DEFAULT_FORECAST_PERIODS: usize = 7;

/// Analytics service over request-scoped accident records
#[derive(Clone)]
pub struct AnalyticsService {
    config: Arc<Config>,
}

/// Batch of accident records
#[derive(Debug, Deserialize, Validate)]
pub struct AccidentsInput {
    #[serde(default)]
    #[validate]
    pub accidents: Vec<AccidentRecord>,
}

#[derive(Debug, Serialize)]
pub struct PatternsResponse {
    pub success: bool,
    pub patterns: PatternSummary,
    pub message: String,
}

/// Input for heatmap generation
#[derive(Debug, Deserialize, Validate)]
pub struct HeatmapInput {
    #[serde(default)]
    #[validate]
    pub accidents: Vec<AccidentRecord>,
    pub grid_size: Option<f64>,
    /// "json" (default) or "csv"
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HeatmapResponse {
    pub success: bool,
    pub heatmap_cells: Vec<HeatmapCell>,
    pub total_cells: usize,
    pub total_incidents: usize,
    pub message: String,
}

/// Hotspot detection accepts a bare record list or a parameterized request
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DetectHotspotsInput {
    Records(Vec<AccidentRecord>),
    Request {
        #[serde(default)]
        accidents: Vec<AccidentRecord>,
        eps_meters: Option<f64>,
        min_points: Option<usize>,
    },
}

impl DetectHotspotsInput {
    pub fn records(&self) -> &[AccidentRecord] {
        match self {
            DetectHotspotsInput::Records(records) => records,
            DetectHotspotsInput::Request { accidents, .. } => accidents,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HotspotsResponse {
    pub success: bool,
    pub hotspots: Vec<Hotspot>,
    pub total_hotspots: usize,
    pub message: String,
}

/// Input for accident forecasting
#[derive(Debug, Deserialize)]
pub struct ForecastInput {
    pub periods: Option<usize>,
    #[serde(default)]
    pub accidents: Vec<AccidentTime>,
    pub strategy: Option<ForecastStrategy>,
    /// Predict from the persisted model instead of fitting
    #[serde(default)]
    pub use_saved_model: bool,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    pub success: bool,
    pub forecast: Vec<ForecastPoint>,
    pub periods: usize,
    pub strategy: ForecastStrategy,
    pub message: String,
}

impl AnalyticsService {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Temporal, severity and spatial patterns
    pub fn analyze_patterns(&self, input: AccidentsInput) -> AppResult<PatternsResponse> {
        input.validate()?;

        let patterns = analyze_patterns(&input.accidents, &self.config.patterns.params())?;
        tracing::info!(
            accidents = patterns.total_accidents,
            clusters = patterns.location_clusters.len(),
            "Patterns analyzed"
        );

        Ok(PatternsResponse {
            success: true,
            patterns,
            message: "Pattern analysis completed".to_string(),
        })
    }

    /// Grid heatmap of incident density
    pub fn heatmap(&self, input: &HeatmapInput) -> AppResult<HeatmapResponse> {
        input.validate()?;

        let grid_size = input
            .grid_size
            .unwrap_or(self.config.heatmap.default_grid_size);
        let cells = build_heatmap(&input.accidents, grid_size)?;
        tracing::info!(
            accidents = input.accidents.len(),
            cells = cells.len(),
            grid_size,
            "Heatmap generated"
        );

        Ok(HeatmapResponse {
            success: true,
            total_cells: cells.len(),
            total_incidents: input.accidents.len(),
            message: format!("Generated {} heatmap cells", cells.len()),
            heatmap_cells: cells,
        })
    }

    /// Cluster records into ranked hotspots
    pub fn detect_hotspots(&self, input: DetectHotspotsInput) -> AppResult<HotspotsResponse> {
        for record in input.records() {
            record.validate()?;
        }

        let defaults = self.config.hotspots.params();
        let params = match &input {
            DetectHotspotsInput::Records(_) => defaults,
            DetectHotspotsInput::Request {
                eps_meters,
                min_points,
                ..
            } => ClusterParams::new(
                eps_meters.unwrap_or(defaults.eps_meters),
                min_points.unwrap_or(defaults.min_points),
            ),
        };
        if !(params.eps_meters.is_finite() && params.eps_meters > 0.0) {
            return Err(AppError::invalid("eps_meters", "eps_meters must be a positive distance"));
        }
        if params.min_points == 0 {
            return Err(AppError::invalid("min_points", "min_points must be at least 1"));
        }

        let hotspots = detect_hotspots(input.records(), &params)?;
        tracing::info!(
            accidents = input.records().len(),
            hotspots = hotspots.len(),
            eps_meters = params.eps_meters,
            "Hotspots detected"
        );

        Ok(HotspotsResponse {
            success: true,
            total_hotspots: hotspots.len(),
            message: format!("Detected {} hotspots", hotspots.len()),
            hotspots,
        })
    }

    /// Fit a forecaster to the accident history and project it forward
    pub fn forecast(&self, input: ForecastInput) -> AppResult<ForecastResponse> {
        let settings = &self.config.forecast;
        let periods = input
            .periods
            .unwrap_or(DEFAULT_FORECAST_PERIODS)
            .min(shared::MAX_FORECAST_PERIODS);

        let forecaster = if input.use_saved_model {
            let model = FittedForecast::load(&settings.model_path)?.ok_or(AppError::UnfittedModel)?;
            Forecaster::with_model(model)
        } else {
            if input.accidents.is_empty() {
                return Err(AppError::EmptyInput("No accident data provided".to_string()));
            }
            let timestamps: Vec<_> = input.accidents.iter().map(|a| a.timestamp).collect();
            let series = daily_counts(&timestamps);

            let mut forecaster = Forecaster::new(input.strategy.unwrap_or(settings.strategy));
            let model = forecaster.fit(&series)?;
            if settings.persist_model {
                model.save(&settings.model_path)?;
                tracing::debug!(path = %settings.model_path.display(), "Forecast model saved");
            }
            forecaster
        };

        let forecast = forecaster.predict(periods)?;
        let strategy = forecaster
            .model()
            .map(FittedForecast::strategy)
            .unwrap_or(settings.strategy);
        tracing::info!(periods, %strategy, "Forecast generated");

        Ok(ForecastResponse {
            success: true,
            periods: forecast.len(),
            message: format!("Forecast generated for {} days", forecast.len()),
            forecast,
            strategy,
        })
    }
}

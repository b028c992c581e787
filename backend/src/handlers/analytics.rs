//! HTTP handlers for accident analytics endpoints

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::WithRejection;

use crate::error::{AppError, AppResult};
use crate::services::analytics::{
    AccidentsInput, DetectHotspotsInput, ForecastInput, ForecastResponse, HeatmapInput,
    HotspotsResponse, PatternsResponse,
};
use crate::services::{AnalyticsService, ReportingService};
use crate::AppState;

/// Run CPU-bound analytics off the async worker threads
async fn run_blocking<T, F>(task: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::Internal(format!("Analytics task failed: {}", e)))?
}

/// Hourly, daily, monthly, severity and location patterns
pub async fn analyze_patterns(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<AccidentsInput>, AppError>,
) -> AppResult<Json<PatternsResponse>> {
    let service = AnalyticsService::new(state.config);
    let patterns = run_blocking(move || service.analyze_patterns(input)).await?;
    Ok(Json(patterns))
}

/// Grid heatmap as JSON, or CSV when `format` is "csv"
pub async fn heatmap_data(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<HeatmapInput>, AppError>,
) -> AppResult<Response> {
    let service = AnalyticsService::new(state.config);
    let format = input.format.clone();
    let heatmap = run_blocking(move || service.heatmap(&input)).await?;

    match format.as_deref() {
        Some("csv") => {
            let csv = ReportingService::export_to_csv(&heatmap.heatmap_cells)?;
            let headers = [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"heatmap.csv\"",
                ),
            ];
            Ok((headers, csv).into_response())
        }
        Some("json") | None => Ok(Json(heatmap).into_response()),
        Some(other) => Err(AppError::invalid(
            "format",
            format!("Unsupported format '{}', expected json or csv", other),
        )),
    }
}

/// Cluster accidents into ranked hotspots
pub async fn detect_hotspots(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<DetectHotspotsInput>, AppError>,
) -> AppResult<Json<HotspotsResponse>> {
    let service = AnalyticsService::new(state.config);
    let hotspots = run_blocking(move || service.detect_hotspots(input)).await?;
    Ok(Json(hotspots))
}

/// Forecast daily accident counts
pub async fn forecast_accidents(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<ForecastInput>, AppError>,
) -> AppResult<Json<ForecastResponse>> {
    let service = AnalyticsService::new(state.config);
    // fitting and model persistence both block
    let forecast = run_blocking(move || service.forecast(input)).await?;
    Ok(Json(forecast))
}

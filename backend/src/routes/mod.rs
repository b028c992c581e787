//! Route definitions for the AcciNex risk analytics service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .merge(analytics_routes())
}

/// Analytics routes, all POST with JSON bodies
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/predict-severity", post(handlers::predict_severity))
        .route("/detect-hotspots", post(handlers::detect_hotspots))
        .route("/check-alerts", post(handlers::check_alerts))
        .route("/extract-exif", post(handlers::extract_exif))
        .route("/forecast-accidents", post(handlers::forecast_accidents))
        .route("/analyze-patterns", post(handlers::analyze_patterns))
        .route("/predict-risk", post(handlers::predict_risk))
        .route("/heatmap-data", post(handlers::heatmap_data))
        .route("/summarize-reports", post(handlers::summarize_reports))
}

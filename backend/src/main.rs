//! AcciNex Risk Analytics - Backend Server
//!
//! Accident-risk analytics over HTTP: risk scoring, hotspot detection and
//! alerting, EXIF GPS extraction, forecasting, pattern analysis and heatmaps.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;
use external::SeverityClassifierClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub severity_client: Option<SeverityClassifierClient>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let severity_client = SeverityClassifierClient::from_config(&config.severity)?;

        Ok(Self {
            config: Arc::new(config),
            severity_client,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let json_logs = std::env::var("ACCINEX_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accinex_server=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // Load configuration
    let config = config::Config::load()?;

    tracing::info!("Starting AcciNex Risk Analytics Server");
    tracing::info!("Environment: {}", config.environment);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config)?;
    if state.severity_client.is_none() {
        tracing::warn!("Severity classifier endpoint not configured; /predict-severity will fail");
    }

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes())
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "AcciNex Risk Analytics API v1.0"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        create_app(AppState::new(Config::defaults().unwrap()).unwrap())
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app()
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_version() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn predict_risk_reference_scenario() {
        let (status, body) = post_json(
            "/predict-risk",
            json!({
                "latitude": 12.97,
                "longitude": 77.59,
                "weather_condition": "rain",
                "traffic_level": 0.7,
                "historical_rate": 0.8,
                "infrastructure_score": 0.4,
                "hour": 12
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["risk_score"], 69.5);
        assert_eq!(body["risk_level"], "HIGH");
        assert_eq!(body["alert"], false);
    }

    #[tokio::test]
    async fn versioned_prefix_is_mounted() {
        let (status, body) = post_json(
            "/api/v1/check-alerts",
            json!({"latitude": 12.97, "longitude": 77.59, "hotspots": []}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["triggered_count"], 0);
    }

    #[tokio::test]
    async fn check_alerts_accepts_provider_weather() {
        let (status, body) = post_json(
            "/check-alerts",
            json!({
                "latitude": 12.9716,
                "longitude": 77.5946,
                "hotspots": [{"id": 1, "latitude": 12.9716, "longitude": 77.5946}],
                "weather": {"main": "Rain", "description": "light rain"}
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["triggered_count"], 1);
        assert_eq!(body["alerts"][0]["effective_radius"], 800.0);
    }

    #[tokio::test]
    async fn missing_field_uses_error_envelope() {
        let (status, body) = post_json("/predict-risk", json!({"longitude": 77.59})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INPUT_MISSING");
    }

    #[tokio::test]
    async fn empty_patterns_is_bad_request() {
        let (status, body) = post_json("/analyze-patterns", json!({"accidents": []})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EMPTY_INPUT");
        assert_eq!(body["error"], "No accident data provided");
    }

    #[tokio::test]
    async fn heatmap_json_envelope() {
        let (status, body) = post_json(
            "/heatmap-data",
            json!({
                "accidents": [
                    {"latitude": 12.345, "longitude": 77.456, "severity": "dangerous"},
                    {"latitude": 12.349, "longitude": 77.459, "severity": "minor"}
                ],
                "grid_size": 0.01
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_cells"], 1);
        assert_eq!(body["heatmap_cells"][0]["incident_count"], 2);
    }

    #[tokio::test]
    async fn heatmap_csv_export() {
        let request = Request::post("/heatmap-data")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({
                    "accidents": [{"latitude": 1.5, "longitude": 2.5}],
                    "grid_size": 1.0,
                    "format": "csv"
                })
                .to_string(),
            ))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(csv.starts_with("lat_bin,lng_bin"));
    }

    #[tokio::test]
    async fn invalid_grid_size_names_field() {
        let (status, body) = post_json(
            "/heatmap-data",
            json!({"accidents": [{"latitude": 1.0, "longitude": 1.0}], "grid_size": 0}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "grid_size");
    }

    #[tokio::test]
    async fn malformed_json_uses_error_envelope() {
        let response = app()
            .oneshot(
                Request::post("/detect-hotspots")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn unconfigured_severity_classifier() {
        let (status, body) = post_json("/predict-severity", json!({"speed": 80})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "EXTERNAL_SERVICE_ERROR");
    }

    #[tokio::test]
    async fn extract_exif_missing_file() {
        let (status, body) = post_json(
            "/extract-exif",
            json!({"image_path": "/no/such/file.jpg", "filename": "file.jpg"}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "RESOURCE_NOT_FOUND");
        assert_eq!(body["error"], "Image file not found");
    }

    #[tokio::test]
    async fn forecast_defaults_to_seven_days() {
        let (status, body) = post_json(
            "/forecast-accidents",
            json!({"accidents": [
                {"accident_time": "2024-04-01T08:00:00"},
                {"accident_time": "2024-04-01T18:00:00"},
                {"accident_time": "2024-04-03T07:30:00"}
            ]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["periods"], 7);
        assert_eq!(body["forecast"].as_array().map(Vec::len), Some(7));
        assert_eq!(body["forecast"][0]["date"], "2024-04-04");
    }

    #[tokio::test]
    async fn forecast_model_persists_between_requests() {
        let dir = std::env::temp_dir().join(format!("accinex-router-{}", std::process::id()));
        let mut config = Config::defaults().unwrap();
        config.forecast.persist_model = true;
        config.forecast.model_path = dir.join("forecaster.json");
        let app = create_app(AppState::new(config).unwrap());

        let send = |body: Value| {
            Request::post("/forecast-accidents")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        };
        let fitted = app
            .clone()
            .oneshot(send(json!({
                "strategy": "naive",
                "accidents": [
                    {"accident_time": "2024-04-01T08:00:00"},
                    {"accident_time": "2024-04-02T09:00:00"}
                ]
            })))
            .await
            .unwrap();
        assert_eq!(fitted.status(), StatusCode::OK);
        assert!(dir.join("forecaster.json").exists());

        let reused = app
            .oneshot(send(json!({"periods": 3, "use_saved_model": true})))
            .await
            .unwrap();
        let status = reused.status();
        let bytes = to_bytes(reused.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["periods"], 3);
        assert_eq!(body["strategy"], "naive");
    }

    #[tokio::test]
    async fn summarize_reports_endpoint() {
        let (status, body) = post_json(
            "/summarize-reports",
            json!({"reports": [{"description": "Bus skid on wet road"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["severity_counts"]["unknown"], 1);
    }
}

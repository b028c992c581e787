//! HTTP handlers for severity prediction

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Forward a feature payload to the severity classifier
pub async fn predict_severity(
    State(state): State<AppState>,
    WithRejection(Json(features), _): WithRejection<Json<Value>, AppError>,
) -> AppResult<Json<Value>> {
    let client = state
        .severity_client
        .as_ref()
        .ok_or_else(|| AppError::ExternalService("Severity classifier not configured".to_string()))?;

    tracing::debug!(endpoint = client.endpoint(), "Forwarding severity prediction");
    let prediction = client.predict(&features).await?;
    Ok(Json(prediction))
}

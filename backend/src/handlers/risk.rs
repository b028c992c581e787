//! HTTP handlers for location risk and proximity alerts

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use crate::error::{AppError, AppResult};
use crate::services::risk::{AlertCheck, CheckAlertsInput, PredictRiskInput, RiskPrediction};
use crate::services::RiskService;
use crate::AppState;

/// Score the accident risk of a location
pub async fn predict_risk(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<PredictRiskInput>, AppError>,
) -> AppResult<Json<RiskPrediction>> {
    let service = RiskService::new(state.config);
    let prediction = service.predict_risk(input)?;
    Ok(Json(prediction))
}

/// Check a user's position against known hotspots
pub async fn check_alerts(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<CheckAlertsInput>, AppError>,
) -> AppResult<Json<AlertCheck>> {
    let service = RiskService::new(state.config);
    let check = service.check_alerts(input)?;
    Ok(Json(check))
}

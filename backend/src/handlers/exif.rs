//! HTTP handlers for image metadata extraction

use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;

use crate::error::{AppError, AppResult};
use crate::services::exif::{ExifResponse, ExtractExifInput};
use crate::services::ExifService;
use crate::AppState;

/// Extract GPS coordinates and capture time from a stored image
pub async fn extract_exif(
    State(state): State<AppState>,
    WithRejection(Json(input), _): WithRejection<Json<ExtractExifInput>, AppError>,
) -> AppResult<Json<ExifResponse>> {
    let service = ExifService::new(state.config);
    let response = service.extract(input).await?;
    Ok(Json(response))
}

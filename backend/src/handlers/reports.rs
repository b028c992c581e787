//! HTTP handlers for incident report summaries

use axum::Json;
use axum_extra::extract::WithRejection;

use crate::error::AppError;
use crate::services::reporting::{SummarizeReportsInput, SummaryResponse};
use crate::services::ReportingService;

/// Summarize free-text incident reports
pub async fn summarize_reports(
    WithRejection(Json(input), _): WithRejection<Json<SummarizeReportsInput>, AppError>,
) -> Json<SummaryResponse> {
    Json(ReportingService::new().summarize(input))
}

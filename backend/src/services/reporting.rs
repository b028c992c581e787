//! Reporting service for report summaries and data export

use serde::{Deserialize, Serialize};
use shared::{summarize_reports, IncidentReport, ReportSummary};

use crate::error::{AppError, AppResult};

#[derive(Clone, Default)]
pub struct ReportingService;

#[derive(Debug, Deserialize)]
pub struct SummarizeReportsInput {
    #[serde(default)]
    pub reports: Vec<IncidentReport>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: ReportSummary,
}

impl ReportingService {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, input: SummarizeReportsInput) -> SummaryResponse {
        let summary = summarize_reports(&input.reports);
        tracing::info!(
            reports = summary.total_reports,
            terms = summary.common_terms.len(),
            "Reports summarized"
        );
        SummaryResponse {
            success: true,
            summary,
        }
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

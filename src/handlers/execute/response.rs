//! Execution response DTOs

use serde::Serialize;

use crate::judge::grader::ValidationReport;

/// Validation report of a stored submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(flatten)]
    pub report: ValidationReport,
    pub submitted: bool,
}

impl From<ValidationReport> for SubmitResponse {
    fn from(report: ValidationReport) -> Self {
        Self {
            report,
            submitted: true,
        }
    }
}

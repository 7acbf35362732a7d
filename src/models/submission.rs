//! Submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Language;
use crate::constants::statuses;
use crate::judge::grader::GradedResult;

/// Overall verdict of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Passed,
    Failed,
    /// At least one case could not be executed by the sandbox
    Error,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed => statuses::PASSED,
            Self::Failed => statuses::FAILED,
            Self::Error => statuses::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            statuses::PASSED => Some(Self::Passed),
            statuses::FAILED => Some(Self::Failed),
            statuses::ERROR => Some(Self::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionVerdict {
    pub id: Uuid,
    pub problem_key: String,
    pub applicant_id: String,
    #[serde(skip_serializing)]
    pub code: String,
    pub language: Language,
    pub status: SubmissionStatus,
    pub output: String,
    /// Visible results only
    pub test_results: Vec<GradedResult>,
    pub is_auto_submitted: bool,
    pub created_at: DateTime<Utc>,
}

/// Submission data handed to the submission store
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub applicant_id: String,
    pub problem_key: String,
    pub code: String,
    pub language: Language,
    pub status: SubmissionStatus,
    pub output: String,
    pub test_results: Vec<GradedResult>,
    pub is_auto_submitted: bool,
}

impl NewSubmission {
    /// Materialize into a stored verdict with a fresh id
    pub fn into_verdict(self) -> SubmissionVerdict {
        SubmissionVerdict {
            id: Uuid::new_v4(),
            problem_key: self.problem_key,
            applicant_id: self.applicant_id,
            code: self.code,
            language: self.language,
            status: self.status,
            output: self.output,
            test_results: self.test_results,
            is_auto_submitted: self.is_auto_submitted,
            created_at: Utc::now(),
        }
    }
}

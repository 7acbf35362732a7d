//! Collaborator interfaces used by the submission pipeline

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{ExecutionTarget, Language, NewSubmission, SubmissionVerdict},
};

pub const PROBLEM_NOT_FOUND: &str = "Problem not found";
pub const ENTRY_POINT_NOT_FOUND: &str = "Signature or function name not found";

/// Read-only access to problems
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProblemStore: Send + Sync {
    /// Problem by key together with its entry point for `language`
    ///
    /// Fails with `NotFound` when the problem is missing, and with a
    /// distinct `NotFound` when it has no signature or function name for
    /// the language. Test cases come back in creation order.
    async fn execution_target(&self, problem_key: &str, language: Language)
    -> AppResult<ExecutionTarget>;
}

/// Write-once storage of submission verdicts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn save(&self, submission: NewSubmission) -> AppResult<SubmissionVerdict>;
}

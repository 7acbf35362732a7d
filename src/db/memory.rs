//! In-memory stores, used when no database is configured

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::seed::{ProblemRecord, demo_problems};
use super::store::{PROBLEM_NOT_FOUND, ProblemStore, SubmissionStore};
use crate::{
    error::{AppError, AppResult},
    models::{ExecutionTarget, Language, NewSubmission, SubmissionVerdict},
};

#[derive(Debug, Default)]
pub struct InMemoryProblemStore {
    problems: RwLock<HashMap<String, ProblemRecord>>,
}

impl InMemoryProblemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the demo problems
    pub fn with_demo_problems() -> Self {
        let problems = demo_problems()
            .into_iter()
            .map(|problem| (problem.spec.key.clone(), problem))
            .collect();
        Self {
            problems: RwLock::new(problems),
        }
    }

    pub async fn insert(&self, problem: ProblemRecord) {
        self.problems
            .write()
            .await
            .insert(problem.spec.key.clone(), problem);
    }
}

#[async_trait]
impl ProblemStore for InMemoryProblemStore {
    async fn execution_target(
        &self,
        problem_key: &str,
        language: Language,
    ) -> AppResult<ExecutionTarget> {
        let problems = self.problems.read().await;
        let problem = problems
            .get(problem_key)
            .ok_or_else(|| AppError::NotFound(PROBLEM_NOT_FOUND.to_string()))?;
        problem.target(language)
    }
}

#[derive(Debug, Default)]
pub struct InMemorySubmissionStore {
    submissions: RwLock<Vec<SubmissionVerdict>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored submissions of one applicant, oldest first
    pub async fn for_applicant(&self, applicant_id: &str) -> Vec<SubmissionVerdict> {
        self.submissions
            .read()
            .await
            .iter()
            .filter(|s| s.applicant_id == applicant_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn save(&self, submission: NewSubmission) -> AppResult<SubmissionVerdict> {
        let verdict = submission.into_verdict();
        self.submissions.write().await.push(verdict.clone());
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::ENTRY_POINT_NOT_FOUND;
    use crate::models::{Difficulty, SubmissionStatus};

    #[tokio::test]
    async fn test_demo_problem_lookup() {
        let store = InMemoryProblemStore::with_demo_problems();

        for language in Language::ALL {
            let target = store
                .execution_target("sumTwoNumbers", language)
                .await
                .unwrap();
            assert!(!target.signature.is_empty());
            assert_eq!(target.test_cases.len(), 3);
            assert_eq!(target.test_cases[0].input, "10 20");
            assert!(target.test_cases[2].is_hidden);
        }
    }

    #[tokio::test]
    async fn test_missing_problem_and_entry_point() {
        let store = InMemoryProblemStore::new();
        store
            .insert(
                ProblemRecord::new("onlyPython", "Only Python", Difficulty::Medium)
                    .entry_point(Language::Python, "def f(x):", "f"),
            )
            .await;

        let err = store
            .execution_target("nope", Language::Python)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == PROBLEM_NOT_FOUND));

        let err = store
            .execution_target("onlyPython", Language::Java)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref m) if m == ENTRY_POINT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_save_submission() {
        let store = InMemorySubmissionStore::new();
        let saved = store
            .save(NewSubmission {
                applicant_id: "applicant-1".into(),
                problem_key: "sumTwoNumbers".into(),
                code: "return a + b".into(),
                language: Language::Python,
                status: SubmissionStatus::Passed,
                output: "30\n20\n300".into(),
                test_results: Vec::new(),
                is_auto_submitted: true,
            })
            .await
            .unwrap();

        let stored = store.for_applicant("applicant-1").await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, saved.id);
        assert!(stored[0].is_auto_submitted);
        assert!(store.for_applicant("someone-else").await.is_empty());
    }
}

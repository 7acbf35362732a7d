//! Code execution service

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;

use crate::{
    db::{ProblemStore, SubmissionStore},
    error::{AppError, AppResult},
    judge::{
        HarnessRequest, Sandbox, generate_harness,
        grader::{ValidationReport, aggregate, grade_case},
        sandbox::ExecutionResult,
    },
    models::{Language, NewSubmission, SubmissionVerdict},
};

/// Validate-and-submit pipeline
#[derive(Clone)]
pub struct ExecuteService {
    problems: Arc<dyn ProblemStore>,
    submissions: Arc<dyn SubmissionStore>,
    sandbox: Arc<dyn Sandbox>,
}

/// Input of a submit call
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub applicant_id: &'a str,
    pub problem_key: &'a str,
    pub user_code: &'a str,
    pub language: Language,
    pub is_auto_submitted: bool,
}

impl ExecuteService {
    pub fn new(
        problems: Arc<dyn ProblemStore>,
        submissions: Arc<dyn SubmissionStore>,
        sandbox: Arc<dyn Sandbox>,
    ) -> Self {
        Self {
            problems,
            submissions,
            sandbox,
        }
    }

    /// Run code as-is with optional stdin, without grading
    pub async fn run_code(
        &self,
        language: Language,
        code: &str,
        input: Option<&str>,
    ) -> ExecutionResult {
        let started = Instant::now();
        let result = self
            .sandbox
            .execute(language, code, input.unwrap_or_default())
            .await;

        tracing::info!(
            %language,
            exit_code = result.exit_code,
            timed_out = result.timed_out,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Code run finished"
        );
        result
    }

    /// Grade candidate code against every test case of a problem
    pub async fn validate(
        &self,
        problem_key: &str,
        language: Language,
        user_code: &str,
    ) -> AppResult<ValidationReport> {
        let target = self.problems.execution_target(problem_key, language).await?;
        let started = Instant::now();

        // the harness reads its input from stdin, so one program serves every case
        let harness = generate_harness(
            language,
            &HarnessRequest {
                user_code,
                signature: &target.signature,
                function_name: &target.function_name,
            },
        );

        let runs = target
            .test_cases
            .iter()
            .map(|case| self.sandbox.execute(language, &harness, &case.input));
        let executions = join_all(runs).await;

        let graded = target
            .test_cases
            .iter()
            .zip(&executions)
            .map(|(case, execution)| grade_case(case, execution))
            .collect();
        let report = aggregate(&target.test_cases, graded);

        tracing::info!(
            problem_key,
            %language,
            status = %report.status,
            passed = report.passed,
            total = report.total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Validation finished"
        );
        Ok(report)
    }

    /// Validate, then persist the verdict
    ///
    /// The report is returned even when it failed; only a storage fault
    /// turns into an error, carrying the report with it.
    pub async fn submit(
        &self,
        submission: Submission<'_>,
    ) -> AppResult<(ValidationReport, SubmissionVerdict)> {
        let report = self
            .validate(submission.problem_key, submission.language, submission.user_code)
            .await?;

        let record = NewSubmission {
            applicant_id: submission.applicant_id.to_string(),
            problem_key: submission.problem_key.to_string(),
            code: submission.user_code.to_string(),
            language: submission.language,
            status: report.status,
            output: report.output.clone(),
            test_results: report.test_results.clone(),
            is_auto_submitted: submission.is_auto_submitted,
        };

        match self.submissions.save(record).await {
            Ok(verdict) => {
                tracing::info!(
                    submission_id = %verdict.id,
                    problem_key = submission.problem_key,
                    applicant_id = submission.applicant_id,
                    status = %verdict.status,
                    "Submission stored"
                );
                Ok((report, verdict))
            }
            Err(e) => Err(AppError::PersistenceFailed {
                reason: e.to_string(),
                report: Box::new(report),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::db::memory::{InMemoryProblemStore, InMemorySubmissionStore};
    use crate::db::store::{MockProblemStore, MockSubmissionStore};
    use crate::judge::grader::CaseOutcome;
    use crate::judge::sandbox::MockSandbox;
    use crate::models::SubmissionStatus;

    /// Adds the two integers of the input, like a correct candidate would
    fn adding_sandbox() -> MockSandbox {
        let mut sandbox = MockSandbox::new();
        sandbox
            .expect_execute()
            .withf(|language, source, _| {
                *language == Language::Python && source.contains("sumTwoNumbers")
            })
            .returning(|_, _, stdin| {
                let sum: i64 = stdin
                    .split_whitespace()
                    .filter_map(|t| t.parse::<i64>().ok())
                    .sum();
                ExecutionResult::completed(format!("{sum}\n"), String::new(), 0)
            });
        sandbox
    }

    fn service(sandbox: impl Sandbox + 'static) -> ExecuteService {
        ExecuteService::new(
            Arc::new(InMemoryProblemStore::with_demo_problems()),
            Arc::new(InMemorySubmissionStore::new()),
            Arc::new(sandbox),
        )
    }

    const CODE: &str = "def sumTwoNumbers(a, b):\n    return a + b\n";

    #[tokio::test]
    async fn test_validate_all_cases_pass() {
        let report = service(adding_sandbox())
            .validate("sumTwoNumbers", Language::Python, CODE)
            .await
            .unwrap();

        assert_eq!(report.status, SubmissionStatus::Passed);
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 3);
        assert_eq!(report.output, "30\n20\n300");
        assert_eq!(report.test_results.len(), 2);
        assert_eq!(report.hidden_summary.total_hidden, 1);
        assert_eq!(report.hidden_summary.passed_hidden, 1);
    }

    #[tokio::test]
    async fn test_validate_wrong_answer_fails() {
        let mut sandbox = MockSandbox::new();
        sandbox
            .expect_execute()
            .times(3)
            .returning(|_, _, _| ExecutionResult::completed("0".into(), String::new(), 0));

        let report = service(sandbox)
            .validate("sumTwoNumbers", Language::Python, CODE)
            .await
            .unwrap();
        assert_eq!(report.status, SubmissionStatus::Failed);
        assert_eq!(report.passed, 0);
        assert!(
            report
                .test_results
                .iter()
                .all(|r| r.outcome == CaseOutcome::WrongAnswer)
        );
    }

    #[tokio::test]
    async fn test_validate_unknown_problem_is_not_found() {
        let mut problems = MockProblemStore::new();
        problems
            .expect_execution_target()
            .returning(|_, _| Err(AppError::NotFound("Problem not found".into())));
        let mut sandbox = MockSandbox::new();
        sandbox.expect_execute().never();

        let service = ExecuteService::new(
            Arc::new(problems),
            Arc::new(MockSubmissionStore::new()),
            Arc::new(sandbox),
        );
        let err = service
            .validate("missing", Language::Java, "class Main {}")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    /// Sleeps longer for earlier cases so completion order is reversed
    struct SlowFirstSandbox;

    #[async_trait]
    impl Sandbox for SlowFirstSandbox {
        async fn execute(&self, _: Language, _: &str, stdin: &str) -> ExecutionResult {
            if stdin == "10 20" {
                tokio::time::sleep(Duration::from_millis(50)).await;
                return ExecutionResult::timed_out(String::new(), String::new(), 50);
            }
            let sum: i64 = stdin.split_whitespace().filter_map(|t| t.parse::<i64>().ok()).sum();
            ExecutionResult::completed(sum.to_string(), String::new(), 0)
        }
    }

    #[tokio::test]
    async fn test_validate_keeps_case_order_and_isolates_timeouts() {
        let report = service(SlowFirstSandbox)
            .validate("sumTwoNumbers", Language::Python, CODE)
            .await
            .unwrap();

        assert_eq!(report.status, SubmissionStatus::Failed);
        assert_eq!(report.total, 3);
        assert_eq!(report.passed, 2);
        assert_eq!(report.test_results[0].input, "10 20");
        assert_eq!(report.test_results[0].outcome, CaseOutcome::TimedOut);
        assert!(!report.test_results[0].passed);
        assert_eq!(report.test_results[1].input, "5 15");
        assert!(report.test_results[1].passed);
        assert_eq!(report.hidden_summary.passed_hidden, 1);
    }

    #[tokio::test]
    async fn test_submit_persists_verdict() {
        let submissions = Arc::new(InMemorySubmissionStore::new());
        let service = ExecuteService::new(
            Arc::new(InMemoryProblemStore::with_demo_problems()),
            submissions.clone(),
            Arc::new(adding_sandbox()),
        );

        let (report, verdict) = service
            .submit(Submission {
                applicant_id: "applicant-7",
                problem_key: "sumTwoNumbers",
                user_code: CODE,
                language: Language::Python,
                is_auto_submitted: false,
            })
            .await
            .unwrap();

        assert_eq!(report.status, SubmissionStatus::Passed);
        assert_eq!(verdict.status, SubmissionStatus::Passed);
        assert_eq!(verdict.code, CODE);
        assert_eq!(verdict.test_results.len(), 2);
        assert_eq!(submissions.for_applicant("applicant-7").await.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_persistence_fault_keeps_report() {
        let mut store = MockSubmissionStore::new();
        store
            .expect_save()
            .times(1)
            .returning(|_| Err(AppError::Database("connection reset".into())));

        let service = ExecuteService::new(
            Arc::new(InMemoryProblemStore::with_demo_problems()),
            Arc::new(store),
            Arc::new(adding_sandbox()),
        );
        let err = service
            .submit(Submission {
                applicant_id: "applicant-7",
                problem_key: "sumTwoNumbers",
                user_code: CODE,
                language: Language::Python,
                is_auto_submitted: true,
            })
            .await
            .unwrap_err();

        match err {
            AppError::PersistenceFailed { reason, report } => {
                assert!(reason.contains("connection reset"));
                assert_eq!(report.status, SubmissionStatus::Passed);
                assert_eq!(report.passed, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_code_passes_input_through() {
        let mut sandbox = MockSandbox::new();
        sandbox
            .expect_execute()
            .withf(|language, source, stdin| {
                *language == Language::Javascript && source == "console.log(1)" && stdin.is_empty()
            })
            .times(1)
            .returning(|_, _, _| ExecutionResult::completed("1\n".into(), String::new(), 0));

        let result = service(sandbox)
            .run_code(Language::Javascript, "console.log(1)", None)
            .await;
        assert_eq!(result.stdout, "1\n");
        assert_eq!(result.exit_code, 0);
    }
}

//! Output normalization and grading

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::judge::sandbox::ExecutionResult;
use crate::models::{SubmissionStatus, TestCase};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static AFTER_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\s+").expect("valid regex"));
static BEFORE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\]").expect("valid regex"));
static AFTER_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s+").expect("valid regex"));

/// Canonical text form used for comparison
///
/// Whitespace runs collapse to one space, brackets and commas lose their
/// padding and everything is lowercased.
pub fn normalize(text: &str) -> String {
    let text = WHITESPACE.replace_all(text.trim(), " ");
    let text = AFTER_OPEN.replace_all(&text, "[");
    let text = BEFORE_CLOSE.replace_all(&text, "]");
    let text = AFTER_COMMA.replace_all(&text, ",");
    text.to_lowercase()
}

/// Compare outputs as normalized text; there is no numeric tolerance
pub fn grade(expected: &str, actual: &str) -> bool {
    normalize(expected) == normalize(actual)
}

/// Why a case passed or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    WrongAnswer,
    RuntimeError,
    TimedOut,
    SandboxError,
}

/// Grading of one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradedResult {
    pub input: String,
    /// Normalized expected output
    pub expected: String,
    /// Normalized actual output
    pub actual: String,
    pub passed: bool,
    pub stderr: String,
    pub outcome: CaseOutcome,
}

/// Grade one execution against its test case
pub fn grade_case(test_case: &TestCase, execution: &ExecutionResult) -> GradedResult {
    let expected = normalize(&test_case.expected_output);

    if execution.sandbox_fault {
        return GradedResult {
            input: test_case.input.clone(),
            expected,
            actual: String::new(),
            passed: false,
            stderr: execution.stderr.clone(),
            outcome: CaseOutcome::SandboxError,
        };
    }

    let actual = normalize(&execution.stdout);
    let passed = !execution.timed_out && expected == actual;
    let outcome = if execution.timed_out {
        CaseOutcome::TimedOut
    } else if passed {
        CaseOutcome::Passed
    } else if execution.exit_code != 0 {
        CaseOutcome::RuntimeError
    } else {
        CaseOutcome::WrongAnswer
    };

    GradedResult {
        input: test_case.input.clone(),
        expected,
        actual,
        passed,
        stderr: execution.stderr.clone(),
        outcome,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenSummary {
    pub total_hidden: usize,
    pub passed_hidden: usize,
}

/// Result of validating candidate code against every test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub status: SubmissionStatus,
    pub total: usize,
    pub passed: usize,
    /// Normalized actual outputs of all cases, one per line
    pub output: String,
    /// Visible cases only
    pub test_results: Vec<GradedResult>,
    pub hidden_summary: HiddenSummary,
}

/// Fold graded cases into a report
///
/// `graded` must be in the same order as `test_cases`.
pub fn aggregate(test_cases: &[TestCase], graded: Vec<GradedResult>) -> ValidationReport {
    debug_assert_eq!(test_cases.len(), graded.len());

    let total = graded.len();
    let passed = graded.iter().filter(|r| r.passed).count();

    let status = if passed == total {
        SubmissionStatus::Passed
    } else {
        SubmissionStatus::Failed
    };

    let output = graded
        .iter()
        .map(|r| r.actual.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let mut hidden_summary = HiddenSummary::default();
    let mut test_results = Vec::with_capacity(total);
    for (case, result) in test_cases.iter().zip(graded) {
        if case.is_hidden {
            hidden_summary.total_hidden += 1;
            if result.passed {
                hidden_summary.passed_hidden += 1;
            }
        } else {
            test_results.push(result);
        }
    }

    ValidationReport {
        status,
        total,
        passed,
        output,
        test_results,
        hidden_summary,
    }
}

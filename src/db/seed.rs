//! Problem records and the demo problem set

use std::collections::HashMap;

use super::store::ENTRY_POINT_NOT_FOUND;
use crate::{
    error::{AppError, AppResult},
    models::{Difficulty, ExecutionTarget, Language, ProblemSpec, TestCase},
};

/// A problem with its per-language entry points
#[derive(Debug, Clone)]
pub struct ProblemRecord {
    pub spec: ProblemSpec,
    pub signatures: HashMap<Language, String>,
    pub function_names: HashMap<Language, String>,
    pub test_cases: Vec<TestCase>,
}

impl ProblemRecord {
    pub fn new(key: &str, title: &str, difficulty: Difficulty) -> Self {
        Self {
            spec: ProblemSpec {
                key: key.to_string(),
                title: title.to_string(),
                description: String::new(),
                difficulty,
            },
            signatures: HashMap::new(),
            function_names: HashMap::new(),
            test_cases: Vec::new(),
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.spec.description = description.to_string();
        self
    }

    pub fn entry_point(mut self, language: Language, signature: &str, function_name: &str) -> Self {
        self.signatures.insert(language, signature.to_string());
        self.function_names.insert(language, function_name.to_string());
        self
    }

    pub fn case(mut self, test_case: TestCase) -> Self {
        self.test_cases.push(test_case);
        self
    }

    pub(crate) fn target(&self, language: Language) -> AppResult<ExecutionTarget> {
        let (Some(signature), Some(function_name)) = (
            self.signatures.get(&language),
            self.function_names.get(&language),
        ) else {
            return Err(AppError::NotFound(ENTRY_POINT_NOT_FOUND.to_string()));
        };

        Ok(ExecutionTarget {
            problem: self.spec.clone(),
            signature: signature.clone(),
            function_name: function_name.clone(),
            test_cases: self.test_cases.clone(),
        })
    }
}

/// Demo problem: add two integers
pub fn sum_two_numbers() -> ProblemRecord {
    ProblemRecord::new("sumTwoNumbers", "Sum Two Numbers", Difficulty::Easy)
        .describe("Return the sum of two integers a and b.")
        .entry_point(
            Language::Python,
            "def sumTwoNumbers(a: int, b: int) -> int:",
            "sumTwoNumbers",
        )
        .entry_point(Language::Javascript, "function sumTwoNumbers(a, b)", "sumTwoNumbers")
        .entry_point(Language::C, "int sumTwoNumbers(int a, int b)", "sumTwoNumbers")
        .entry_point(Language::Cpp, "int sumTwoNumbers(int a, int b)", "sumTwoNumbers")
        .entry_point(
            Language::Java,
            "public static int sumTwoNumbers(int a, int b)",
            "sumTwoNumbers",
        )
        .entry_point(
            Language::Csharp,
            "public static int SumTwoNumbers(int a, int b)",
            "SumTwoNumbers",
        )
        .case(TestCase::visible("10 20", "30"))
        .case(TestCase::visible("5 15", "20"))
        .case(TestCase::hidden("100 200", "300"))
}

/// Problems seeded when `SEED_DEMO_PROBLEMS` is set
pub fn demo_problems() -> Vec<ProblemRecord> {
    vec![sum_two_numbers()]
}

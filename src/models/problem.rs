//! Problem model

use serde::{Deserialize, Serialize};

use super::TestCase;

/// A gradable problem as seen by the engine (read-only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSpec {
    /// Unique problem key, e.g. "sumTwoNumbers"
    pub key: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
}

/// Problem difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything needed to grade one problem in one language
#[derive(Debug, Clone)]
pub struct ExecutionTarget {
    pub problem: ProblemSpec,
    /// Raw signature text for the requested language
    pub signature: String,
    pub function_name: String,
    /// Ordered by creation
    pub test_cases: Vec<TestCase>,
}

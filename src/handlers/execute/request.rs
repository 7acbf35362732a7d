//! Execution request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_PROBLEM_KEY_LENGTH, MAX_SOURCE_CODE_SIZE, MAX_STDIN_SIZE};

/// Run arbitrary code with optional stdin
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RunCodeRequest {
    #[validate(length(min = 1))]
    pub language: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_SIZE))]
    pub code: String,

    #[validate(length(max = MAX_STDIN_SIZE))]
    pub input: Option<String>,
}

/// Grade code against a problem without storing anything
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[validate(length(min = 1, max = MAX_PROBLEM_KEY_LENGTH))]
    pub problem_key: String,

    #[validate(length(min = 1))]
    pub language: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_SIZE))]
    pub user_code: String,
}

/// Grade code and store the verdict
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    #[validate(length(min = 1, max = 128))]
    pub applicant_id: String,

    #[validate(length(min = 1, max = MAX_PROBLEM_KEY_LENGTH))]
    pub problem_key: String,

    #[validate(length(min = 1, max = MAX_SOURCE_CODE_SIZE))]
    pub user_code: String,

    #[validate(length(min = 1))]
    pub language: String,

    #[serde(default)]
    pub is_auto_submitted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_request_defaults_auto_flag() {
        let request: SubmitRequest = serde_json::from_value(serde_json::json!({
            "applicantId": "a-1",
            "problemKey": "sumTwoNumbers",
            "userCode": "return a + b",
            "language": "python"
        }))
        .unwrap();
        assert!(!request.is_auto_submitted);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_code_is_rejected() {
        let request = ValidateRequest {
            problem_key: "sumTwoNumbers".into(),
            language: "python".into(),
            user_code: String::new(),
        };
        assert!(request.validate().is_err());
    }
}

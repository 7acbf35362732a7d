//! Execution handler implementations

use axum::{Json, extract::State};
use validator::Validate;

use crate::{
    error::AppResult,
    judge::{grader::ValidationReport, sandbox::ExecutionResult},
    models::Language,
    services::Submission,
    state::AppState,
};

use super::{
    request::{RunCodeRequest, SubmitRequest, ValidateRequest},
    response::SubmitResponse,
};

/// Run code with optional stdin and return the raw execution result
pub async fn run_code(
    State(state): State<AppState>,
    Json(payload): Json<RunCodeRequest>,
) -> AppResult<Json<ExecutionResult>> {
    payload.validate()?;
    let language: Language = payload.language.parse()?;

    let result = state
        .execute()
        .run_code(language, &payload.code, payload.input.as_deref())
        .await;

    Ok(Json(result))
}

/// Grade code against every test case of a problem
pub async fn validate(
    State(state): State<AppState>,
    Json(payload): Json<ValidateRequest>,
) -> AppResult<Json<ValidationReport>> {
    payload.validate()?;
    let language: Language = payload.language.parse()?;

    let report = state
        .execute()
        .validate(&payload.problem_key, language, &payload.user_code)
        .await?;

    Ok(Json(report))
}

/// Grade code and store the verdict
pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitRequest>,
) -> AppResult<Json<SubmitResponse>> {
    payload.validate()?;
    let language: Language = payload.language.parse()?;

    let (report, _) = state
        .execute()
        .submit(Submission {
            applicant_id: &payload.applicant_id,
            problem_key: &payload.problem_key,
            user_code: &payload.user_code,
            language,
            is_auto_submitted: payload.is_auto_submitted,
        })
        .await?;

    Ok(Json(report.into()))
}

//! Submission repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};
use uuid::Uuid;

use crate::{
    db::store::SubmissionStore,
    error::{AppError, AppResult},
    judge::grader::GradedResult,
    models::{Language, NewSubmission, SubmissionStatus, SubmissionVerdict},
};

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    problem_key: String,
    applicant_id: String,
    code: String,
    language: String,
    status: String,
    output: String,
    test_results: Json<Vec<GradedResult>>,
    is_auto_submitted: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<SubmissionRow> for SubmissionVerdict {
    type Error = AppError;

    fn try_from(row: SubmissionRow) -> Result<Self, Self::Error> {
        let language: Language = row.language.parse()?;
        let status = SubmissionStatus::from_str(&row.status)
            .ok_or_else(|| AppError::Database(format!("unknown status '{}'", row.status)))?;

        Ok(Self {
            id: row.id,
            problem_key: row.problem_key,
            applicant_id: row.applicant_id,
            code: row.code,
            language,
            status,
            output: row.output,
            test_results: row.test_results.0,
            is_auto_submitted: row.is_auto_submitted,
            created_at: row.created_at,
        })
    }
}

/// Repository for submission database operations
pub struct SubmissionRepository;

impl SubmissionRepository {
    /// Insert a graded submission
    pub async fn create(pool: &PgPool, submission: &NewSubmission) -> AppResult<SubmissionVerdict> {
        let row = sqlx::query_as::<_, SubmissionRow>(
            r#"
            INSERT INTO submissions (
                id, problem_key, applicant_id, code, language, status,
                output, test_results, is_auto_submitted
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&submission.problem_key)
        .bind(&submission.applicant_id)
        .bind(&submission.code)
        .bind(submission.language.as_str())
        .bind(submission.status.as_str())
        .bind(&submission.output)
        .bind(Json(&submission.test_results))
        .bind(submission.is_auto_submitted)
        .fetch_one(pool)
        .await?;

        row.try_into()
    }

    /// Find submission by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<SubmissionVerdict>> {
        let row = sqlx::query_as::<_, SubmissionRow>(r#"SELECT * FROM submissions WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(SubmissionVerdict::try_from).transpose()
    }
}

/// `SubmissionStore` backed by Postgres
#[derive(Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn save(&self, submission: NewSubmission) -> AppResult<SubmissionVerdict> {
        SubmissionRepository::create(&self.pool, &submission).await
    }
}

//! Problem repository

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    db::seed::ProblemRecord,
    db::store::{ENTRY_POINT_NOT_FOUND, PROBLEM_NOT_FOUND, ProblemStore},
    error::{AppError, AppResult},
    models::{Difficulty, ExecutionTarget, Language, ProblemSpec, TestCase},
};

#[derive(Debug, sqlx::FromRow)]
struct ProblemRow {
    key: String,
    title: String,
    description: String,
    difficulty: String,
}

impl TryFrom<ProblemRow> for ProblemSpec {
    type Error = AppError;

    fn try_from(row: ProblemRow) -> Result<Self, Self::Error> {
        let difficulty = Difficulty::from_str(&row.difficulty).ok_or_else(|| {
            AppError::Database(format!("unknown difficulty '{}'", row.difficulty))
        })?;

        Ok(Self {
            key: row.key,
            title: row.title,
            description: row.description,
            difficulty,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TestCaseRow {
    input: String,
    expected_output: String,
    is_hidden: bool,
}

impl From<TestCaseRow> for TestCase {
    fn from(row: TestCaseRow) -> Self {
        Self {
            input: row.input,
            expected_output: row.expected_output,
            is_hidden: row.is_hidden,
        }
    }
}

/// Repository for problem database operations
pub struct ProblemRepository;

impl ProblemRepository {
    /// Find problem by key
    pub async fn find_by_key(pool: &PgPool, key: &str) -> AppResult<Option<ProblemSpec>> {
        let row = sqlx::query_as::<_, ProblemRow>(
            r#"SELECT key, title, description, difficulty FROM problems WHERE key = $1"#,
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        row.map(ProblemSpec::try_from).transpose()
    }

    /// Signature text of a problem in one language
    pub async fn find_signature(
        pool: &PgPool,
        key: &str,
        language: Language,
    ) -> AppResult<Option<String>> {
        let signature = sqlx::query_scalar::<_, String>(
            r#"
            SELECT signature FROM function_signatures
            WHERE problem_key = $1 AND language = $2
            "#,
        )
        .bind(key)
        .bind(language.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(signature)
    }

    /// Function name of a problem in one language
    pub async fn find_function_name(
        pool: &PgPool,
        key: &str,
        language: Language,
    ) -> AppResult<Option<String>> {
        let name = sqlx::query_scalar::<_, String>(
            r#"
            SELECT function_name FROM function_names
            WHERE problem_key = $1 AND language = $2
            "#,
        )
        .bind(key)
        .bind(language.as_str())
        .fetch_optional(pool)
        .await?;

        Ok(name)
    }

    /// Test cases in creation order
    pub async fn list_test_cases(pool: &PgPool, key: &str) -> AppResult<Vec<TestCase>> {
        let rows = sqlx::query_as::<_, TestCaseRow>(
            r#"
            SELECT input, expected_output, is_hidden
            FROM test_cases
            WHERE problem_key = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(key)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(TestCase::from).collect())
    }

    /// Insert a problem with its entry points and test cases
    ///
    /// Returns `false` and leaves the stored problem untouched when the key
    /// already exists.
    pub async fn insert_if_absent(pool: &PgPool, problem: &ProblemRecord) -> AppResult<bool> {
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO problems (key, title, description, difficulty)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(&problem.spec.key)
        .bind(&problem.spec.title)
        .bind(&problem.spec.description)
        .bind(problem.spec.difficulty.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected()
            > 0;

        if !inserted {
            tx.rollback().await?;
            return Ok(false);
        }

        for (language, signature) in &problem.signatures {
            sqlx::query(
                r#"INSERT INTO function_signatures (problem_key, language, signature) VALUES ($1, $2, $3)"#,
            )
            .bind(&problem.spec.key)
            .bind(language.as_str())
            .bind(signature)
            .execute(&mut *tx)
            .await?;
        }

        for (language, name) in &problem.function_names {
            sqlx::query(
                r#"INSERT INTO function_names (problem_key, language, function_name) VALUES ($1, $2, $3)"#,
            )
            .bind(&problem.spec.key)
            .bind(language.as_str())
            .bind(name)
            .execute(&mut *tx)
            .await?;
        }

        for (position, case) in problem.test_cases.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO test_cases (problem_key, position, input, expected_output, is_hidden)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(&problem.spec.key)
            .bind(position as i32)
            .bind(&case.input)
            .bind(&case.expected_output)
            .bind(case.is_hidden)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }
}

/// `ProblemStore` backed by Postgres
#[derive(Clone)]
pub struct PgProblemStore {
    pool: PgPool,
}

impl PgProblemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProblemStore for PgProblemStore {
    async fn execution_target(
        &self,
        problem_key: &str,
        language: Language,
    ) -> AppResult<ExecutionTarget> {
        let problem = ProblemRepository::find_by_key(&self.pool, problem_key)
            .await?
            .ok_or_else(|| AppError::NotFound(PROBLEM_NOT_FOUND.to_string()))?;

        let signature = ProblemRepository::find_signature(&self.pool, problem_key, language).await?;
        let function_name =
            ProblemRepository::find_function_name(&self.pool, problem_key, language).await?;
        let (Some(signature), Some(function_name)) = (signature, function_name) else {
            return Err(AppError::NotFound(ENTRY_POINT_NOT_FOUND.to_string()));
        };

        let test_cases = ProblemRepository::list_test_cases(&self.pool, problem_key).await?;

        Ok(ExecutionTarget {
            problem,
            signature,
            function_name,
            test_cases,
        })
    }
}

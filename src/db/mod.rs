//! Problem and submission storage
//!
//! The pipeline only sees the `ProblemStore` and `SubmissionStore` traits.
//! Postgres backs them when `DATABASE_URL` is set, the in-memory stores
//! otherwise.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod seed;
pub mod store;

use sqlx::PgPool;

pub use connection::*;
pub use memory::{InMemoryProblemStore, InMemorySubmissionStore};
pub use repositories::{PgProblemStore, PgSubmissionStore};
pub use seed::{ProblemRecord, demo_problems};
pub use store::{ProblemStore, SubmissionStore};

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Insert the demo problems that are not stored yet
pub async fn seed_demo_problems(pool: &PgPool) -> crate::error::AppResult<usize> {
    let mut inserted = 0;
    for problem in demo_problems() {
        if repositories::ProblemRepository::insert_if_absent(pool, &problem).await? {
            tracing::info!(problem_key = %problem.spec.key, "Seeded demo problem");
            inserted += 1;
        }
    }
    Ok(inserted)
}

//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod problem_repo;
pub mod submission_repo;

pub use problem_repo::{PgProblemStore, ProblemRepository};
pub use submission_repo::{PgSubmissionStore, SubmissionRepository};

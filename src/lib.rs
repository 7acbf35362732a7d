//! CodeGrade - Multi-language code execution and grading engine
//!
//! Candidate code is wrapped in a generated harness for its language, run
//! once per test case in a resource-limited Docker container and graded by
//! comparing normalized output with the expected output.
//!
//! # Supported languages
//!
//! Python, JavaScript, C, C++, Java and C#.
//!
//! # Architecture
//!
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: the validate/submit pipeline
//! - **Judge**: signature parsing, harness generation, sandbox and grading
//! - **DB**: problem lookup and submission storage (Postgres or in-memory)
//! - **Models**: domain models

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod judge;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

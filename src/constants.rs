//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// SANDBOX DEFAULTS
// =============================================================================

/// Default wall-clock timeout per sandbox run in milliseconds
pub const DEFAULT_SANDBOX_TIMEOUT_MS: u64 = 10_000;

/// Default memory ceiling per sandbox in megabytes
pub const DEFAULT_SANDBOX_MEMORY_MB: u64 = 256;

/// Default CPU ceiling per sandbox (fraction of one core)
pub const DEFAULT_SANDBOX_CPUS: f64 = 0.5;

/// Default number of sandboxes allowed to run at the same time
pub const DEFAULT_SANDBOX_MAX_CONCURRENCY: usize = 4;

/// Default process limit inside a sandbox
pub const DEFAULT_SANDBOX_PIDS_LIMIT: i64 = 64;

/// Exit code reported for runs killed by the wall-clock timeout
pub const TIMEOUT_EXIT_CODE: i64 = 124;

/// Mount point of the harness file inside the sandbox
pub const SANDBOX_WORKDIR: &str = "/app";

/// Placeholder substituted with the mounted file path in command templates
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Label attached to every sandbox container
pub const SANDBOX_LABEL: &str = "codegrade.execution";

/// Upper bound on captured stdout/stderr per run (1 MB each)
pub const MAX_CAPTURED_OUTPUT: usize = 1024 * 1024;

// =============================================================================
// SUPPORTED LANGUAGES
// =============================================================================

/// Language identifiers
pub mod languages {
    pub const PYTHON: &str = "python";
    pub const JAVASCRIPT: &str = "javascript";
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";
    pub const JAVA: &str = "java";
    pub const CSHARP: &str = "csharp";

    /// All supported language identifiers
    pub const ALL: &[&str] = &[PYTHON, JAVASCRIPT, C, CPP, JAVA, CSHARP];
}

/// Default container images for each language
pub mod container_images {
    pub const PYTHON: &str = "python:3.10.4";
    pub const JAVASCRIPT: &str = "node:18.15.0";
    pub const C: &str = "gcc:13.2.0";
    pub const CPP: &str = "gcc:13.2.0";
    pub const JAVA: &str = "openjdk:17";
    pub const CSHARP: &str = "mono";
}

/// File extensions for each language
pub mod file_extensions {
    pub const PYTHON: &str = "py";
    pub const JAVASCRIPT: &str = "js";
    pub const C: &str = "c";
    pub const CPP: &str = "cpp";
    pub const JAVA: &str = "java";
    pub const CSHARP: &str = "cs";
}

// =============================================================================
// SUBMISSION STATUSES
// =============================================================================

/// Submission statuses as persisted
pub mod statuses {
    pub const PASSED: &str = "Passed";
    pub const FAILED: &str = "Failed";
    pub const ERROR: &str = "Error";
}

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum source code size in bytes (1 MB)
pub const MAX_SOURCE_CODE_SIZE: u64 = 1024 * 1024;

/// Maximum ad hoc stdin size in bytes (1 MB)
pub const MAX_STDIN_SIZE: u64 = 1024 * 1024;

/// Maximum problem key length
pub const MAX_PROBLEM_KEY_LENGTH: u64 = 128;

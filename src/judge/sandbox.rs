//! Sandbox abstraction
//!
//! A sandbox runs one generated program with one stdin and reports what
//! happened. Faults of the sandbox itself are folded into the result so a
//! single broken case never aborts the whole validation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tempfile::TempDir;

use crate::constants::TIMEOUT_EXIT_CODE;
use crate::models::Language;

/// Outcome of one execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i64,
    pub timed_out: bool,
    /// The sandbox could not run the program at all
    #[serde(skip)]
    pub sandbox_fault: bool,
}

impl ExecutionResult {
    /// Finished run, successful or not
    pub fn completed(stdout: String, stderr: String, exit_code: i64) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            timed_out: false,
            sandbox_fault: false,
        }
    }

    /// Run killed at the wall-clock limit; partial output is kept
    pub fn timed_out(stdout: String, stderr: String, timeout_ms: u64) -> Self {
        let mut stderr = stderr;
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&format!("execution timed out after {timeout_ms} ms"));

        Self {
            stdout,
            stderr,
            exit_code: TIMEOUT_EXIT_CODE,
            timed_out: true,
            sandbox_fault: false,
        }
    }

    /// The sandbox failed before or while running the program
    pub fn fault(message: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: 1,
            timed_out: false,
            sandbox_fault: true,
        }
    }
}

/// Isolated program execution
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Run `source` written in `language`, feeding `stdin`
    async fn execute(&self, language: Language, source: &str, stdin: &str) -> ExecutionResult;
}

/// Per-execution scratch directory holding the source file
///
/// The directory is deleted when the workspace is dropped.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    file_name: String,
}

impl Workspace {
    /// Create a fresh directory under `root` and write `source` into it
    pub async fn create(root: &Path, file_name: &str, source: &str) -> std::io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;

        let dir = tempfile::Builder::new()
            .prefix("codegrade-")
            .tempdir_in(root)?;
        tokio::fs::write(dir.path().join(file_name), source).await?;

        Ok(Self {
            dir,
            file_name: file_name.to_string(),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Absolute host path of the source file
    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join(&self.file_name)
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

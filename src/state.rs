//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::services::ExecuteService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Grading pipeline over the configured stores and sandbox
    execute: ExecuteService,
}

impl AppState {
    /// Create a new application state
    pub fn new(execute: ExecuteService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { execute }),
        }
    }

    /// Get a reference to the execution service
    pub fn execute(&self) -> &ExecuteService {
        &self.inner.execute
    }
}

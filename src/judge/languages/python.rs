//! Python runtime

use super::LanguageRuntime;
use crate::constants::{container_images, file_extensions};

/// Get runtime for Python
pub fn runtime() -> LanguageRuntime {
    LanguageRuntime::new(container_images::PYTHON, file_extensions::PYTHON, "python {file}")
}

//! JavaScript runtime (Node.js)

use super::LanguageRuntime;
use crate::constants::{container_images, file_extensions};

/// Get runtime for JavaScript
pub fn runtime() -> LanguageRuntime {
    LanguageRuntime::new(
        container_images::JAVASCRIPT,
        file_extensions::JAVASCRIPT,
        "node {file}",
    )
}

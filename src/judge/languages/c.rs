//! C runtime

use super::LanguageRuntime;
use crate::constants::{container_images, file_extensions};

/// Get runtime for C
///
/// The source is mounted read-only, so the binary goes to /tmp.
pub fn runtime() -> LanguageRuntime {
    LanguageRuntime::new(
        container_images::C,
        file_extensions::C,
        "gcc {file} -o /tmp/out -lm && /tmp/out",
    )
}

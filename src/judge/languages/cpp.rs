//! C++ runtime

use super::LanguageRuntime;
use crate::constants::{container_images, file_extensions};

/// Get runtime for C++
pub fn runtime() -> LanguageRuntime {
    LanguageRuntime::new(
        container_images::CPP,
        file_extensions::CPP,
        "g++ {file} -o /tmp/out && /tmp/out",
    )
}

//! C# runtime (Mono)

use super::LanguageRuntime;
use crate::constants::{container_images, file_extensions};

/// Get runtime for C#
pub fn runtime() -> LanguageRuntime {
    LanguageRuntime::new(
        container_images::CSHARP,
        file_extensions::CSHARP,
        "csc -nologo {file} -out:/tmp/program.exe && mono /tmp/program.exe",
    )
}

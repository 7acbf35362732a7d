//! Java runtime

use super::LanguageRuntime;
use crate::constants::{container_images, file_extensions};

/// File name required by `public class Main`
pub const SOURCE_FILE: &str = "Main.java";

/// Get runtime for Java
pub fn runtime() -> LanguageRuntime {
    LanguageRuntime::new(
        container_images::JAVA,
        file_extensions::JAVA,
        "javac -d /tmp {file} && java -cp /tmp Main",
    )
}

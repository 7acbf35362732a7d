//! Language runtimes: container image, source extension and command template

pub mod c;
pub mod cpp;
pub mod csharp;
pub mod java;
pub mod javascript;
pub mod python;

use uuid::Uuid;

use crate::constants::FILE_PLACEHOLDER;
use crate::models::Language;

/// How to run a single source file of one language inside a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRuntime {
    /// Docker image, e.g. `python:3.10.4`
    pub image: String,
    /// Source file extension without the dot
    pub extension: String,
    /// Shell command template; `{file}` is replaced by the source file name
    pub command: String,
}

impl LanguageRuntime {
    pub(crate) fn new(image: &str, extension: &str, command: &str) -> Self {
        Self {
            image: image.to_string(),
            extension: extension.to_string(),
            command: command.to_string(),
        }
    }

    /// Reject runtimes that cannot run a source file
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.image.trim().is_empty() {
            return Err(RuntimeError::EmptyImage);
        }
        if self.extension.trim().is_empty() {
            return Err(RuntimeError::EmptyExtension);
        }
        if !self.command.contains(FILE_PLACEHOLDER) {
            return Err(RuntimeError::MissingPlaceholder);
        }
        Ok(())
    }

    /// Command with the placeholder substituted
    pub fn command_for(&self, file_name: &str) -> String {
        self.command.replace(FILE_PLACEHOLDER, file_name)
    }
}

/// Why a runtime definition was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("image must not be empty")]
    EmptyImage,

    #[error("extension must not be empty")]
    EmptyExtension,

    #[error("command must contain {}", FILE_PLACEHOLDER)]
    MissingPlaceholder,
}

impl RuntimeError {
    /// Field of the runtime at fault, as used in `SANDBOX_<LANG>_<FIELD>`
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyImage => "IMAGE",
            Self::EmptyExtension => "EXTENSION",
            Self::MissingPlaceholder => "COMMAND",
        }
    }
}

/// Source file name for one execution
///
/// Java requires the file of `public class Main` to be named `Main.java`;
/// every other language gets a unique name.
pub fn source_file_name(language: Language, runtime: &LanguageRuntime) -> String {
    match language {
        Language::Java => java::SOURCE_FILE.to_string(),
        _ => format!("{}.{}", Uuid::new_v4(), runtime.extension),
    }
}

/// Runtime table for every supported language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRegistry {
    python: LanguageRuntime,
    javascript: LanguageRuntime,
    c: LanguageRuntime,
    cpp: LanguageRuntime,
    java: LanguageRuntime,
    csharp: LanguageRuntime,
}

impl LanguageRegistry {
    /// Built-in runtimes
    pub fn defaults() -> Self {
        Self {
            python: python::runtime(),
            javascript: javascript::runtime(),
            c: c::runtime(),
            cpp: cpp::runtime(),
            java: java::runtime(),
            csharp: csharp::runtime(),
        }
    }

    pub fn runtime(&self, language: Language) -> &LanguageRuntime {
        match language {
            Language::Python => &self.python,
            Language::Javascript => &self.javascript,
            Language::C => &self.c,
            Language::Cpp => &self.cpp,
            Language::Java => &self.java,
            Language::Csharp => &self.csharp,
        }
    }

    pub fn set(&mut self, language: Language, runtime: LanguageRuntime) {
        let slot = match language {
            Language::Python => &mut self.python,
            Language::Javascript => &mut self.javascript,
            Language::C => &mut self.c,
            Language::Cpp => &mut self.cpp,
            Language::Java => &mut self.java,
            Language::Csharp => &mut self.csharp,
        };
        *slot = runtime;
    }

    /// Distinct images across all runtimes
    pub fn images(&self) -> Vec<String> {
        let mut images: Vec<String> = Language::ALL
            .iter()
            .map(|language| self.runtime(*language).image.clone())
            .collect();
        images.sort();
        images.dedup();
        images
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let registry = LanguageRegistry::defaults();
        for language in Language::ALL {
            assert!(registry.runtime(language).validate().is_ok(), "{language}");
        }
        assert_eq!(registry.runtime(Language::Python).image, "python:3.10.4");
        assert_eq!(registry.runtime(Language::Csharp).extension, "cs");
    }

    #[test]
    fn test_command_substitution() {
        let runtime = python::runtime();
        assert_eq!(runtime.command_for("abc.py"), "python abc.py");
    }

    #[test]
    fn test_source_file_names() {
        let registry = LanguageRegistry::defaults();
        assert_eq!(
            source_file_name(Language::Java, registry.runtime(Language::Java)),
            "Main.java"
        );
        let name = source_file_name(Language::Cpp, registry.runtime(Language::Cpp));
        assert!(name.ends_with(".cpp"));
        assert_ne!(name, source_file_name(Language::Cpp, registry.runtime(Language::Cpp)));
    }

    #[test]
    fn test_override_and_images() {
        let mut registry = LanguageRegistry::defaults();
        registry.set(
            Language::Python,
            LanguageRuntime::new("python:3.12", "py", "python3 {file}"),
        );
        assert_eq!(registry.runtime(Language::Python).command_for("x.py"), "python3 x.py");

        // c and cpp share gcc
        assert_eq!(registry.images().len(), 5);
    }

    #[test]
    fn test_validation_requires_placeholder() {
        let runtime = LanguageRuntime::new("node:18", "js", "node main.js");
        assert_eq!(runtime.validate(), Err(RuntimeError::MissingPlaceholder));

        let runtime = LanguageRuntime::new(" ", "js", "node {file}");
        let err = runtime.validate().unwrap_err();
        assert_eq!(err, RuntimeError::EmptyImage);
        assert_eq!(err.field(), "IMAGE");

        let runtime = LanguageRuntime::new("node:18", "", "node {file}");
        assert_eq!(runtime.validate().map_err(|e| e.field()), Err("EXTENSION"));
    }
}

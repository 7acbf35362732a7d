//! Supported target languages

use serde::{Deserialize, Serialize};

use crate::constants::languages;
use crate::error::AppError;

/// Closed set of languages the engine can grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    C,
    Cpp,
    Java,
    Csharp,
}

impl Language {
    /// Every supported language, in registry order
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::Javascript,
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Csharp,
    ];

    /// Get language as its wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Python => languages::PYTHON,
            Self::Javascript => languages::JAVASCRIPT,
            Self::C => languages::C,
            Self::Cpp => languages::CPP,
            Self::Java => languages::JAVA,
            Self::Csharp => languages::CSHARP,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.as_str() == wanted)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unsupported language '{}'. Supported: {}",
                    s,
                    languages::ALL.join(", ")
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!("python".parse::<Language>().unwrap(), Language::Python);
        assert_eq!(" CSharp ".parse::<Language>().unwrap(), Language::Csharp);
        assert!("rust".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_is_lowercase() {
        let json = serde_json::to_string(&Language::Javascript).unwrap();
        assert_eq!(json, "\"javascript\"");

        let parsed: Language = serde_json::from_str("\"cpp\"").unwrap();
        assert_eq!(parsed, Language::Cpp);
    }

    #[test]
    fn test_all_matches_identifiers() {
        let ids: Vec<&str> = Language::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(ids, languages::ALL);
    }
}

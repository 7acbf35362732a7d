//! Harness generation
//!
//! A harness is a complete program in the candidate's language that embeds
//! the candidate's code, reads one test input from stdin, calls the target
//! function positionally and prints the result in a canonical form. Every
//! generator implements the same textual input convention:
//!
//! - stdin is split into lines and blank lines are dropped
//! - `int`/`float`/`bool` consume the next token (separated by whitespace or commas)
//! - `string` and every collection consume the rest of the current line
//! - 1-D collections split on commas/whitespace, ignoring `[` and `]`
//! - 2-D collections split rows on `;`
//!
//! Output: 1-D collections print as `[a, b]`, 2-D as rows joined by `;`.

use std::sync::LazyLock;

use regex::Regex;

use super::signature::{Parameter, SemanticType, parse_return_type, parse_signature};
use crate::models::Language;

pub mod builder;
pub mod c;
pub mod cpp;
pub mod csharp;
pub mod java;
pub mod javascript;
pub mod python;

pub use builder::CodeBuilder;

/// Inputs to harness generation
///
/// The harness reads its test input from stdin, so one harness serves
/// every test case of a problem.
#[derive(Debug, Clone, Copy)]
pub struct HarnessRequest<'a> {
    pub user_code: &'a str,
    pub signature: &'a str,
    pub function_name: &'a str,
}

impl HarnessRequest<'_> {
    /// Return type spelling from the signature (statically typed languages)
    pub fn return_type(&self) -> String {
        parse_return_type(self.signature, self.function_name)
    }
}

/// Language-specific harness generator
pub trait HarnessGenerator: Send + Sync {
    fn language(&self) -> Language;

    /// Build the full program text. Never fails: unsupported parameters
    /// become placeholder comments and the program fails when run.
    fn generate(&self, request: &HarnessRequest<'_>, params: &[Parameter]) -> String;
}

/// Resolve the generator for a language
pub fn generator_for(language: Language) -> &'static dyn HarnessGenerator {
    match language {
        Language::Python => &python::PythonHarness,
        Language::Javascript => &javascript::JavascriptHarness,
        Language::C => &c::CHarness,
        Language::Cpp => &cpp::CppHarness,
        Language::Java => &java::JavaHarness,
        Language::Csharp => &csharp::CsharpHarness,
    }
}

/// Parse the signature and generate a harness for `language`
pub fn generate_harness(language: Language, request: &HarnessRequest<'_>) -> String {
    let params = parse_signature(request.signature);
    let generator = generator_for(language);

    tracing::debug!(
        language = %language,
        function = %request.function_name,
        params = params.len(),
        unknown = params.iter().filter(|p| p.ty == SemanticType::Unknown).count(),
        "Generating harness"
    );

    generator.generate(request, &params)
}

/// Placeholder emitted instead of reading an unsupported parameter
pub(crate) fn unsupported_comment(param: &Parameter) -> String {
    format!("Unsupported type for {}", param.name)
}

/// Comma-separated argument names in declaration order
pub(crate) fn argument_list(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Numeric representation requested by a declared type spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumericWidth {
    Int,
    Long,
    LongLong,
    Float,
    Double,
}

impl NumericWidth {
    /// Width for the scalar element of `param`
    pub(crate) fn of(param: &Parameter) -> Self {
        let declared = param.declared.to_lowercase();
        let integral = param.ty.element() == SemanticType::Int;

        if declared.contains("longlong") {
            Self::LongLong
        } else if declared.contains("long") || declared.contains("int64") {
            Self::Long
        } else if !integral && declared.contains("float") {
            Self::Float
        } else if integral {
            Self::Int
        } else {
            Self::Double
        }
    }
}

/// Whether the declared spelling is a `List<...>` rather than an array
pub(crate) fn is_generic_list(param: &Parameter) -> bool {
    param.declared.to_lowercase().contains("list<")
}

/// Whether `code` already contains a definition of `function_name`
///
/// Candidates usually submit the whole function; when only the body was
/// sent the generator wraps it in the signature.
pub fn declares_function(language: Language, code: &str, function_name: &str) -> bool {
    if function_name.is_empty() {
        return false;
    }
    let name = regex::escape(function_name);

    let pattern = match language {
        Language::Python => format!(r"(?m)^\s*(?:async\s+)?def\s+{name}\s*\("),
        Language::Javascript => format!(
            r"(?:function\s*\*?\s*{name}\s*\()|(?:(?:const|let|var)\s+{name}\s*=)"
        ),
        Language::C | Language::Cpp | Language::Java | Language::Csharp => {
            return brace_definition(code, function_name);
        }
    };

    Regex::new(&pattern)
        .map(|re| re.is_match(code))
        .unwrap_or(false)
}

static STATIC_MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bstatic\b").expect("valid regex"));

/// Whether the definition of `function_name` in `code` carries `static`
pub(crate) fn is_static_definition(code: &str, function_name: &str) -> bool {
    definition_start(code, function_name)
        .map(|index| {
            let line_start = code[..index].rfind(['\n', ';', '}', '{']).map_or(0, |i| i + 1);
            STATIC_MODIFIER.is_match(&code[line_start..index])
        })
        .unwrap_or(false)
}

fn brace_definition(code: &str, function_name: &str) -> bool {
    definition_start(code, function_name).is_some()
}

/// Byte index of `name` where it is followed by a parameter list and `{`
fn definition_start(code: &str, name: &str) -> Option<usize> {
    code.match_indices(name).map(|(index, _)| index).find(|&index| {
        let before_ok = code[..index]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        before_ok && opens_body(&code[index + name.len()..])
    })
}

/// `(...)` followed by optional qualifiers (`const`, `throws X`) and `{`
fn opens_body(rest: &str) -> bool {
    let rest = rest.trim_start();
    if !rest.starts_with('(') {
        return false;
    }

    let mut depth = 0usize;
    let mut close = None;
    for (index, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return false;
    };

    let tail = &rest[close + 1..];
    let Some(brace) = tail.find(['{', ';']) else {
        return false;
    };
    tail[brace..].starts_with('{')
        && tail[..brace]
            .chars()
            .all(|c| c.is_alphanumeric() || c.is_whitespace() || matches!(c, '_' | ',' | '.'))
}

/// Candidate code as a complete definition, wrapping a bare body in
/// `signature { body }` for brace languages
pub(crate) fn brace_function(language: Language, request: &HarnessRequest<'_>) -> String {
    if declares_function(language, request.user_code, request.function_name) {
        return request.user_code.to_string();
    }

    let signature = request.signature.trim().trim_end_matches('{').trim_end();
    format!("{signature} {{\n{}\n}}\n", request.user_code.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(code: &'a str, signature: &'a str, name: &'a str) -> HarnessRequest<'a> {
        HarnessRequest {
            user_code: code,
            signature,
            function_name: name,
        }
    }

    #[test]
    fn test_declares_function_brace_languages() {
        let full = "int sum(int a, int b) {\n    return a + b;\n}";
        assert!(declares_function(Language::C, full, "sum"));

        let body = "return a + b;";
        assert!(!declares_function(Language::Cpp, body, "sum"));

        let recursive = "if (n < 2) return n;\nreturn fib(n - 1) + fib(n - 2);";
        assert!(!declares_function(Language::Java, recursive, "fib"));

        let guarded = "while (check(x)) { x++; }";
        assert!(!declares_function(Language::Csharp, guarded, "check"));

        let java = "public static int[] solve(int[] a) throws Exception {\n return a;\n}";
        assert!(declares_function(Language::Java, java, "solve"));
    }

    #[test]
    fn test_declares_function_scripting_languages() {
        assert!(declares_function(
            Language::Python,
            "def sum(a, b):\n    return a + b",
            "sum"
        ));
        assert!(!declares_function(Language::Python, "return a + b", "sum"));
        assert!(declares_function(
            Language::Javascript,
            "const sum = (a, b) => a + b;",
            "sum"
        ));
        assert!(declares_function(
            Language::Javascript,
            "function sum(a, b) { return a + b; }",
            "sum"
        ));
        assert!(!declares_function(Language::Javascript, "return sum2(a, b);", "sum"));
    }

    #[test]
    fn test_static_detection() {
        let code = "public static int sum(int a, int b) { return a + b; }";
        assert!(is_static_definition(code, "sum"));

        let instance = "class X {}\npublic int sum(int a, int b) { return a + b; }";
        assert!(!is_static_definition(instance, "sum"));
    }

    #[test]
    fn test_body_only_code_is_wrapped() {
        let wrapped = brace_function(
            Language::C,
            &request("return a + b;", "int sum(int a, int b)", "sum"),
        );
        assert_eq!(wrapped, "int sum(int a, int b) {\nreturn a + b;\n}\n");
    }

    #[test]
    fn test_numeric_width() {
        let params = parse_signature("void f(long long a, long[] b, float c, double d, int e)");
        let widths: Vec<NumericWidth> = params.iter().map(NumericWidth::of).collect();
        assert_eq!(
            widths,
            vec![
                NumericWidth::LongLong,
                NumericWidth::Long,
                NumericWidth::Float,
                NumericWidth::Double,
                NumericWidth::Int,
            ]
        );
    }

    #[test]
    fn test_every_language_has_a_generator() {
        for language in Language::ALL {
            assert_eq!(generator_for(language).language(), language);
        }
    }
}

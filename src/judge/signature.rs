//! Function signature parsing and parameter type inference
//!
//! Signatures arrive as free text in any of the six target languages
//! (`int sum(int a, int b)`, `def f(nums: List[int])`, `function f(a, b)`).
//! Parsing never fails: anything that cannot be understood degrades to
//! [`SemanticType::Unknown`] and the harness emits a placeholder for it.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Language-neutral parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SemanticType {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int[]")]
    IntArray,
    #[serde(rename = "float[]")]
    FloatArray,
    #[serde(rename = "bool[]")]
    BoolArray,
    #[serde(rename = "string[]")]
    StringArray,
    #[serde(rename = "int[][]")]
    IntMatrix,
    #[serde(rename = "string[][]")]
    StringMatrix,
    #[serde(rename = "unknown")]
    Unknown,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::IntArray => "int[]",
            Self::FloatArray => "float[]",
            Self::BoolArray => "bool[]",
            Self::StringArray => "string[]",
            Self::IntMatrix => "int[][]",
            Self::StringMatrix => "string[][]",
            Self::Unknown => "unknown",
        }
    }

    /// Number of collection dimensions (0 for scalars)
    pub fn dimensions(&self) -> usize {
        match self {
            Self::IntArray | Self::FloatArray | Self::BoolArray | Self::StringArray => 1,
            Self::IntMatrix | Self::StringMatrix => 2,
            _ => 0,
        }
    }

    /// Scalar element type of a collection; scalars map to themselves
    pub fn element(&self) -> SemanticType {
        match self {
            Self::IntArray | Self::IntMatrix => Self::Int,
            Self::FloatArray => Self::Float,
            Self::BoolArray => Self::Bool,
            Self::StringArray | Self::StringMatrix => Self::String,
            other => *other,
        }
    }

    /// Whether the value is read from a whole line rather than a single token
    pub fn reads_line(&self) -> bool {
        self.dimensions() > 0 || *self == Self::String
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One positional parameter of a signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: SemanticType,
    /// Whitespace-stripped type spelling as written; empty for untyped names
    pub declared: String,
}

impl Parameter {
    fn new(name: impl Into<String>, ty: SemanticType, declared: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            declared: declared.into(),
        }
    }

    fn unknown() -> Self {
        Self::new("param", SemanticType::Unknown, "")
    }
}

// Ordered by priority: every 2-D spelling, then 1-D, then scalars.
// Keys are lowercase with whitespace removed and match by containment.
const TYPE_TABLE: &[(&str, SemanticType)] = &[
    ("int[][]", SemanticType::IntMatrix),
    ("int[,]", SemanticType::IntMatrix),
    ("int**", SemanticType::IntMatrix),
    ("vector<vector<int>>", SemanticType::IntMatrix),
    ("vector<vector<long", SemanticType::IntMatrix),
    ("list<list<integer>>", SemanticType::IntMatrix),
    ("list<list<int>>", SemanticType::IntMatrix),
    ("list[list[int]]", SemanticType::IntMatrix),
    ("long[][]", SemanticType::IntMatrix),
    ("number[][]", SemanticType::IntMatrix),
    ("string[][]", SemanticType::StringMatrix),
    ("vector<vector<string>>", SemanticType::StringMatrix),
    ("list<list<string>>", SemanticType::StringMatrix),
    ("list[list[str]]", SemanticType::StringMatrix),
    ("char***", SemanticType::StringMatrix),
    ("int[]", SemanticType::IntArray),
    ("integer[]", SemanticType::IntArray),
    ("long[]", SemanticType::IntArray),
    ("int*", SemanticType::IntArray),
    ("long*", SemanticType::IntArray),
    ("vector<int>", SemanticType::IntArray),
    ("vector<long", SemanticType::IntArray),
    ("list<integer>", SemanticType::IntArray),
    ("list<int>", SemanticType::IntArray),
    ("list<long>", SemanticType::IntArray),
    ("list[int]", SemanticType::IntArray),
    ("float[]", SemanticType::FloatArray),
    ("double[]", SemanticType::FloatArray),
    ("number[]", SemanticType::FloatArray),
    ("float*", SemanticType::FloatArray),
    ("double*", SemanticType::FloatArray),
    ("vector<double>", SemanticType::FloatArray),
    ("vector<float>", SemanticType::FloatArray),
    ("list<double>", SemanticType::FloatArray),
    ("list<float>", SemanticType::FloatArray),
    ("list[float]", SemanticType::FloatArray),
    ("bool[]", SemanticType::BoolArray),
    ("boolean[]", SemanticType::BoolArray),
    ("bool*", SemanticType::BoolArray),
    ("vector<bool>", SemanticType::BoolArray),
    ("list<boolean>", SemanticType::BoolArray),
    ("list<bool>", SemanticType::BoolArray),
    ("list[bool]", SemanticType::BoolArray),
    ("string[]", SemanticType::StringArray),
    ("char**", SemanticType::StringArray),
    ("vector<string>", SemanticType::StringArray),
    ("list<string>", SemanticType::StringArray),
    ("list[str]", SemanticType::StringArray),
    ("char*", SemanticType::String),
    ("string", SemanticType::String),
    ("bool", SemanticType::Bool),
    ("float", SemanticType::Float),
    ("double", SemanticType::Float),
    ("decimal", SemanticType::Float),
    ("number", SemanticType::Float),
    ("int", SemanticType::Int),
    ("long", SemanticType::Int),
    ("short", SemanticType::Int),
    ("size_t", SemanticType::Int),
    ("str", SemanticType::String),
    ("char", SemanticType::String),
];

static COMMENT_ANNOTATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_$][\w$]*)\s*/\*\s*(.+?)\s*\*/$").expect("valid regex")
});

// `[^:]` keeps `std::vector<int> v` out of the annotation form.
static NAME_THEN_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_$][\w$]*)\s*:\s*([^:].*)$").expect("valid regex")
});

static TYPE_THEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?[\s*&>\]])\s*([A-Za-z_$][\w$]*)\s*((?:\[\s*\]\s*)*)$").expect("valid regex")
});

static BARE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_$][\w$]*$").expect("valid regex"));

static MATRIX_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)matrix|grid|data").expect("valid regex"));
static ARRAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)nums|arr|list").expect("valid regex"));
static WORDS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)words|strings").expect("valid regex"));

const RETURN_TYPE_MODIFIERS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "final", "inline", "extern",
    "virtual", "override", "async", "export", "function", "def",
];

/// Parse the parameter list of a signature into positional [`Parameter`]s
pub fn parse_signature(signature: &str) -> Vec<Parameter> {
    let (Some(open), Some(close)) = (signature.find('('), signature.find(')')) else {
        return Vec::new();
    };
    if open > close {
        return Vec::new();
    }

    let inner = signature[open + 1..close].trim();
    if inner.is_empty() || inner.eq_ignore_ascii_case("void") {
        return Vec::new();
    }

    split_top_level(inner)
        .into_iter()
        .map(strip_default)
        .filter(|fragment| !fragment.is_empty())
        .map(parse_parameter)
        .collect()
}

/// Return type spelling written before `function_name`, modifiers removed
///
/// `public static int[] twoSum(...)` yields `int[]` and `const char * f(...)`
/// yields `const char*`; an unknown name yields "".
pub fn parse_return_type(signature: &str, function_name: &str) -> String {
    let prefix = find_function_name(signature, function_name)
        .map(|index| &signature[..index])
        .unwrap_or_default();

    let kept: Vec<&str> = prefix
        .split_whitespace()
        .filter(|word| !RETURN_TYPE_MODIFIERS.contains(word))
        .collect();
    kept.join(" ").replace(" *", "*").replace(" &", "&")
}

/// Map a raw type spelling onto the semantic type table
pub fn classify_type(raw: &str) -> SemanticType {
    let key = strip_whitespace(raw).to_lowercase().replace("std::", "");
    if key.is_empty() {
        return SemanticType::Unknown;
    }
    TYPE_TABLE
        .iter()
        .find(|(pattern, _)| key.contains(pattern))
        .map(|(_, ty)| *ty)
        .unwrap_or(SemanticType::Unknown)
}

/// Guess a type from an untyped parameter name
pub fn infer_from_name(name: &str) -> SemanticType {
    if MATRIX_NAME.is_match(name) {
        SemanticType::IntMatrix
    } else if ARRAY_NAME.is_match(name) {
        SemanticType::IntArray
    } else if WORDS_NAME.is_match(name) {
        SemanticType::StringArray
    } else {
        SemanticType::Int
    }
}

fn parse_parameter(fragment: &str) -> Parameter {
    if let Some(caps) = COMMENT_ANNOTATED.captures(fragment) {
        return typed(&caps[1], &caps[2]);
    }

    if let Some(caps) = NAME_THEN_TYPE.captures(fragment) {
        return typed(&caps[1], &caps[2]);
    }

    if let Some(caps) = TYPE_THEN_NAME.captures(fragment) {
        let brackets = strip_whitespace(&caps[3]);
        let declared = format!("{}{}", strip_whitespace(&caps[1]), brackets);
        return typed(&caps[2], &declared);
    }

    if BARE_NAME.is_match(fragment) {
        return Parameter::new(fragment, infer_from_name(fragment), "");
    }

    Parameter::unknown()
}

fn typed(name: &str, raw_type: &str) -> Parameter {
    let declared = strip_whitespace(raw_type);
    Parameter::new(name, classify_type(&declared), declared)
}

/// Split on commas that are not nested inside `<>`, `[]`, `()` or `{}`
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (index, ch) in text.char_indices() {
        match ch {
            '<' | '[' | '(' | '{' => depth += 1,
            '>' | ']' | ')' | '}' => depth = (depth - 1).max(0),
            ',' if depth == 0 => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn strip_default(fragment: &str) -> &str {
    fragment
        .split_once('=')
        .map(|(before, _)| before)
        .unwrap_or(fragment)
        .trim()
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Byte index of `name` as a whole word followed by `(`
fn find_function_name(signature: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    signature.match_indices(name).map(|(index, _)| index).find(|&index| {
        let before_ok = signature[..index]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_'));
        let after_ok = signature[index + name.len()..].trim_start().starts_with('(');
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(signature: &str) -> Vec<(String, SemanticType)> {
        parse_signature(signature)
            .into_iter()
            .map(|p| (p.name, p.ty))
            .collect()
    }

    #[test]
    fn test_positional_order() {
        let params = parse_signature("int sum(int a, int b, int c)");
        let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(params.iter().all(|p| p.ty == SemanticType::Int));
    }

    #[test]
    fn test_nested_vector_is_matrix() {
        assert_eq!(
            types("int f(vector<vector<int>>& grid, vector<int> nums)"),
            vec![
                ("grid".to_string(), SemanticType::IntMatrix),
                ("nums".to_string(), SemanticType::IntArray),
            ]
        );
        assert_eq!(
            types("int f(std::vector<std::vector<int>> m)"),
            vec![("m".to_string(), SemanticType::IntMatrix)]
        );
    }

    #[test]
    fn test_empty_and_void() {
        assert!(parse_signature("int f()").is_empty());
        assert!(parse_signature("int f(void)").is_empty());
        assert!(parse_signature("no parens").is_empty());
        assert!(parse_signature("f) oops (").is_empty());
    }

    #[test]
    fn test_python_annotations_and_defaults() {
        assert_eq!(
            types("def f(nums: List[int], target: int = 0, name: str)"),
            vec![
                ("nums".to_string(), SemanticType::IntArray),
                ("target".to_string(), SemanticType::Int),
                ("name".to_string(), SemanticType::String),
            ]
        );
    }

    #[test]
    fn test_comment_annotated_javascript() {
        assert_eq!(
            types("function f(nums /* int[] */, flag /* boolean */)"),
            vec![
                ("nums".to_string(), SemanticType::IntArray),
                ("flag".to_string(), SemanticType::Bool),
            ]
        );
    }

    #[test]
    fn test_bare_names_are_inferred() {
        assert_eq!(
            types("function f(matrix, arr, words, k)"),
            vec![
                ("matrix".to_string(), SemanticType::IntMatrix),
                ("arr".to_string(), SemanticType::IntArray),
                ("words".to_string(), SemanticType::StringArray),
                ("k".to_string(), SemanticType::Int),
            ]
        );
    }

    #[test]
    fn test_c_pointers_and_brackets() {
        let params = parse_signature("int* twoSum(int* nums, int numsSize, char *s, int grid[][])");
        assert_eq!(params[0].ty, SemanticType::IntArray);
        assert_eq!(params[0].declared, "int*");
        assert_eq!(params[1].ty, SemanticType::Int);
        assert_eq!(params[2].ty, SemanticType::String);
        assert_eq!(params[2].name, "s");
        assert_eq!(params[3].ty, SemanticType::IntMatrix);
        assert_eq!(params[3].declared, "int[][]");
    }

    #[test]
    fn test_java_and_csharp_types() {
        assert_eq!(
            types("public static long f(long[] xs, List<List<Integer>> g, String[] w, double d, boolean b)"),
            vec![
                ("xs".to_string(), SemanticType::IntArray),
                ("g".to_string(), SemanticType::IntMatrix),
                ("w".to_string(), SemanticType::StringArray),
                ("d".to_string(), SemanticType::Float),
                ("b".to_string(), SemanticType::Bool),
            ]
        );
        assert_eq!(
            types("public static int F(int[,] grid, string s)"),
            vec![
                ("grid".to_string(), SemanticType::IntMatrix),
                ("s".to_string(), SemanticType::String),
            ]
        );
    }

    #[test]
    fn test_unknown_type_keeps_name() {
        let params = parse_signature("int f(TreeNode* root)");
        assert_eq!(params[0].name, "root");
        assert_eq!(params[0].ty, SemanticType::Unknown);
    }

    #[test]
    fn test_unparseable_fragment() {
        let params = parse_signature("int f(42)");
        assert_eq!(params, vec![Parameter::unknown()]);
    }

    #[test]
    fn test_return_type() {
        assert_eq!(parse_return_type("int sum(int a, int b)", "sum"), "int");
        assert_eq!(
            parse_return_type("public static int[] twoSum(int[] nums)", "twoSum"),
            "int[]"
        );
        assert_eq!(parse_return_type("char * reverse (char* s)", "reverse"), "char*");
        assert_eq!(parse_return_type("bool isSum(int a)", "sum"), "");
        assert_eq!(
            parse_return_type("unsigned long long big(int a)", "big"),
            "unsigned long long"
        );
    }
}

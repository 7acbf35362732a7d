//! Python harness generator

use super::{
    CodeBuilder, HarnessGenerator, HarnessRequest, argument_list, declares_function,
    unsupported_comment,
};
use crate::judge::signature::{Parameter, SemanticType};
use crate::models::Language;

const PRELUDE: &str = r#"import re
import sys
from typing import *


class _Input:
    def __init__(self, text):
        self.lines = [line.strip() for line in text.splitlines() if line.strip()]
        self.row = 0
        self.pos = 0

    def _fill(self):
        while self.row < len(self.lines):
            line = self.lines[self.row]
            while self.pos < len(line) and (line[self.pos].isspace() or line[self.pos] == ','):
                self.pos += 1
            if self.pos < len(line):
                return True
            self.row += 1
            self.pos = 0
        return False

    def token(self):
        if not self._fill():
            return ''
        line = self.lines[self.row]
        start = self.pos
        while self.pos < len(line) and not (line[self.pos].isspace() or line[self.pos] == ','):
            self.pos += 1
        return line[start:self.pos]

    def line(self):
        if not self._fill():
            return ''
        rest = self.lines[self.row][self.pos:].strip()
        self.row += 1
        self.pos = 0
        return rest


def _items(text):
    return [item for item in re.split(r'[\s,\[\]]+', text) if item]


def _rows(text):
    return [_items(row) for row in text.split(';') if _items(row)]


def _bool(text):
    return text.strip().lower() in ('true', '1')


def _format(value):
    if isinstance(value, (list, tuple)):
        if value and all(isinstance(item, (list, tuple)) for item in value):
            return ';'.join(_format(item) for item in value)
        return '[' + ', '.join(_format(item) for item in value) + ']'
    return str(value)
"#;

/// Generates a `python` script with the candidate function at module level
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonHarness;

impl HarnessGenerator for PythonHarness {
    fn language(&self) -> Language {
        Language::Python
    }

    fn generate(&self, request: &HarnessRequest<'_>, params: &[Parameter]) -> String {
        let mut code = CodeBuilder::new("    ");
        code.verbatim(PRELUDE).blank().blank();
        code.verbatim(&user_function(request)).blank().blank();

        code.suite("if __name__ == \"__main__\"", |b| {
            b.line("_in = _Input(sys.stdin.read())");
            for param in params {
                match read_expression(param.ty) {
                    Some(expr) => b.line(format!("{} = {}", param.name, expr)),
                    None => b.line(format!("# {}", unsupported_comment(param))),
                };
            }
            b.line(format!(
                "print(_format({}({})))",
                request.function_name,
                argument_list(params)
            ));
        });

        code.finish()
    }
}

fn read_expression(ty: SemanticType) -> Option<&'static str> {
    let expr = match ty {
        SemanticType::Int => "int(_in.token())",
        SemanticType::Float => "float(_in.token())",
        SemanticType::Bool => "_bool(_in.token())",
        SemanticType::String => "_in.line()",
        SemanticType::IntArray => "[int(x) for x in _items(_in.line())]",
        SemanticType::FloatArray => "[float(x) for x in _items(_in.line())]",
        SemanticType::BoolArray => "[_bool(x) for x in _items(_in.line())]",
        SemanticType::StringArray => "_items(_in.line())",
        SemanticType::IntMatrix => "[[int(x) for x in row] for row in _rows(_in.line())]",
        SemanticType::StringMatrix => "_rows(_in.line())",
        SemanticType::Unknown => return None,
    };
    Some(expr)
}

/// The candidate code, or the signature with the code as its indented body
fn user_function(request: &HarnessRequest<'_>) -> String {
    if declares_function(Language::Python, request.user_code, request.function_name) {
        return request.user_code.to_string();
    }

    let signature = request.signature.trim().trim_end_matches(':');
    let already_indented = request
        .user_code
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| line.starts_with([' ', '\t']));

    let mut code = CodeBuilder::new("    ");
    code.line(format!("{signature}:"));
    if already_indented {
        code.verbatim(request.user_code);
    } else {
        code.indent();
        for line in request.user_code.lines() {
            code.line(line);
        }
    }
    code.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::signature::parse_signature;

    fn generate(code: &str, signature: &str, name: &str) -> String {
        let request = HarnessRequest {
            user_code: code,
            signature,
            function_name: name,
        };
        PythonHarness.generate(&request, &parse_signature(signature))
    }

    #[test]
    fn test_scalar_parameters() {
        let source = generate(
            "def sum(a, b):\n    return a + b",
            "def sum(a: int, b: int)",
            "sum",
        );
        assert!(source.contains("def sum(a, b):\n    return a + b"));
        assert!(source.contains("    a = int(_in.token())\n    b = int(_in.token())"));
        assert!(source.contains("    print(_format(sum(a, b)))"));
    }

    #[test]
    fn test_collections() {
        let source = generate(
            "def f(grid, words):\n    return grid",
            "def f(grid: List[List[int]], words: List[str])",
            "f",
        );
        assert!(source.contains("grid = [[int(x) for x in row] for row in _rows(_in.line())]"));
        assert!(source.contains("words = _items(_in.line())"));
    }

    #[test]
    fn test_body_is_indented_under_signature() {
        let source = generate("return a * b", "def mul(a: int, b: int)", "mul");
        assert!(source.contains("def mul(a: int, b: int):\n    return a * b\n"));
    }

    #[test]
    fn test_unknown_parameter_placeholder() {
        let source = generate("def f(x):\n    return x", "def f(42)", "f");
        assert!(source.contains("# Unsupported type for param"));
        assert!(source.contains("print(_format(f(param)))"));
    }
}

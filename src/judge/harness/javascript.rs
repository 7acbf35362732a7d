//! JavaScript (Node.js) harness generator

use std::sync::LazyLock;

use regex::Regex;

use super::{
    CodeBuilder, HarnessGenerator, HarnessRequest, argument_list, declares_function,
    unsupported_comment,
};
use crate::judge::signature::{Parameter, SemanticType};
use crate::models::Language;

const PRELUDE: &str = r#"const __lines = require('fs')
  .readFileSync(0, 'utf8')
  .split(/\r?\n/)
  .map((line) => line.trim())
  .filter((line) => line.length > 0);
let __row = 0;
let __pos = 0;

function __isSep(ch) {
  return ch === ',' || /\s/.test(ch);
}

function __fill() {
  while (__row < __lines.length) {
    const line = __lines[__row];
    while (__pos < line.length && __isSep(line[__pos])) __pos++;
    if (__pos < line.length) return true;
    __row++;
    __pos = 0;
  }
  return false;
}

function __token() {
  if (!__fill()) return '';
  const line = __lines[__row];
  const start = __pos;
  while (__pos < line.length && !__isSep(line[__pos])) __pos++;
  return line.slice(start, __pos);
}

function __line() {
  if (!__fill()) return '';
  const rest = __lines[__row].slice(__pos).trim();
  __row++;
  __pos = 0;
  return rest;
}

function __items(text) {
  return text.split(/[\s,\[\]]+/).filter((item) => item.length > 0);
}

function __rows(text) {
  return text.split(';').map(__items).filter((row) => row.length > 0);
}

function __bool(text) {
  const value = text.trim().toLowerCase();
  return value === 'true' || value === '1';
}

function __format(value) {
  if (Array.isArray(value)) {
    if (value.length > 0 && value.every(Array.isArray)) {
      return value.map(__format).join(';');
    }
    return '[' + value.map(__format).join(', ') + ']';
  }
  return String(value);
}"#;

// `: number`, `: string[]`, `: Array<number>` annotations in a typed signature
static TYPE_ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*:\s*[\w$.<>\[\]]+").expect("valid regex"));

/// Generates a `node` script that calls a top-level function
#[derive(Debug, Clone, Copy, Default)]
pub struct JavascriptHarness;

impl HarnessGenerator for JavascriptHarness {
    fn language(&self) -> Language {
        Language::Javascript
    }

    fn generate(&self, request: &HarnessRequest<'_>, params: &[Parameter]) -> String {
        let mut code = CodeBuilder::new("  ");
        code.verbatim(&user_function(request)).blank();
        code.verbatim(PRELUDE).blank();

        code.line("(function __main() {").indent();
        for param in params {
            match read_expression(param.ty) {
                Some(expr) => code.line(format!("const {} = {};", param.name, expr)),
                None => code.line(format!("// {}", unsupported_comment(param))),
            };
        }
        code.line(format!(
            "console.log(__format({}({})));",
            request.function_name,
            argument_list(params)
        ));
        code.dedent().line("})();");

        code.finish()
    }
}

fn read_expression(ty: SemanticType) -> Option<&'static str> {
    let expr = match ty {
        SemanticType::Int => "parseInt(__token(), 10)",
        SemanticType::Float => "parseFloat(__token())",
        SemanticType::Bool => "__bool(__token())",
        SemanticType::String => "__line()",
        SemanticType::IntArray => "__items(__line()).map((x) => parseInt(x, 10))",
        SemanticType::FloatArray => "__items(__line()).map(parseFloat)",
        SemanticType::BoolArray => "__items(__line()).map(__bool)",
        SemanticType::StringArray => "__items(__line())",
        SemanticType::IntMatrix => "__rows(__line()).map((row) => row.map((x) => parseInt(x, 10)))",
        SemanticType::StringMatrix => "__rows(__line())",
        SemanticType::Unknown => return None,
    };
    Some(expr)
}

fn user_function(request: &HarnessRequest<'_>) -> String {
    if declares_function(Language::Javascript, request.user_code, request.function_name) {
        return request.user_code.to_string();
    }

    let signature = request.signature.trim().trim_end_matches('{').trim_end();
    let signature = TYPE_ANNOTATION.replace_all(signature, "");
    format!("{signature} {{\n{}\n}}\n", request.user_code.trim_end())
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
        JavascriptHarness.generate(&request, &parse_signature(signature))
    }

    #[test]
    fn test_reads_and_prints() {
        let source = generate(
            "function sum(a, b) {\n  return a + b;\n}",
            "function sum(a, b)",
            "sum",
        );
        assert!(source.starts_with("function sum(a, b) {\n  return a + b;\n}\n"));
        assert!(source.contains("  const a = parseInt(__token(), 10);\n  const b = parseInt(__token(), 10);"));
        assert!(source.contains("  console.log(__format(sum(a, b)));\n})();"));
    }

    #[test]
    fn test_annotated_collections() {
        let source = generate(
            "function f(nums, flags) { return nums; }",
            "function f(nums /* int[] */, flags /* bool[] */)",
            "f",
        );
        assert!(source.contains("const nums = __items(__line()).map((x) => parseInt(x, 10));"));
        assert!(source.contains("const flags = __items(__line()).map(__bool);"));
    }

    #[test]
    fn test_body_wrapped_without_type_annotations() {
        let source = generate(
            "return a - b;",
            "function diff(a: number, b: number): number",
            "diff",
        );
        assert!(source.starts_with("function diff(a, b) {\nreturn a - b;\n}\n"));
    }
}

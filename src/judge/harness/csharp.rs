//! C# (Mono) harness generator

use super::{
    CodeBuilder, HarnessGenerator, HarnessRequest, NumericWidth, argument_list, brace_function,
    is_generic_list, is_static_definition, unsupported_comment,
};
use crate::judge::signature::{Parameter, SemanticType};
use crate::models::Language;

const USINGS: &str = "using System;
using System.Collections;
using System.Collections.Generic;
using System.Globalization;
using System.Linq;";

const READER: &str = r#"static readonly List<string> __lines = new List<string>();
static int __row = 0;
static int __pos = 0;

static void __Load() {
    string line;
    while ((line = Console.ReadLine()) != null) {
        line = line.Trim();
        if (line.Length > 0) __lines.Add(line);
    }
}

static bool __Sep(char ch) {
    return ch == ',' || char.IsWhiteSpace(ch);
}

static bool __Fill() {
    while (__row < __lines.Count) {
        string line = __lines[__row];
        while (__pos < line.Length && __Sep(line[__pos])) __pos++;
        if (__pos < line.Length) return true;
        __row++;
        __pos = 0;
    }
    return false;
}

static string __Token() {
    if (!__Fill()) return "";
    string line = __lines[__row];
    int start = __pos;
    while (__pos < line.Length && !__Sep(line[__pos])) __pos++;
    return line.Substring(start, __pos - start);
}

static string __Line() {
    if (!__Fill()) return "";
    string rest = __lines[__row].Substring(__pos).Trim();
    __row++;
    __pos = 0;
    return rest;
}

static string[] __Items(string text) {
    return text.Split(new[] { ' ', '\t', ',', '[', ']' }, StringSplitOptions.RemoveEmptyEntries);
}

static string[][] __Rows(string text) {
    return text.Split(';').Select(__Items).Where(r => r.Length > 0).ToArray();
}

static bool __Bool(string text) {
    string value = text.Trim().ToLowerInvariant();
    return value == "true" || value == "1";
}

static string __Format(object value) {
    if (value == null) return "null";
    if (value is string text) return text;
    if (value is IEnumerable items) {
        var parts = new List<string>();
        bool nested = true;
        foreach (var item in items) {
            nested = nested && item is IEnumerable && !(item is string);
            parts.Add(__Format(item));
        }
        if (nested && parts.Count > 0) return string.Join(";", parts);
        return "[" + string.Join(", ", parts) + "]";
    }
    return Convert.ToString(value, CultureInfo.InvariantCulture);
}"#;

/// Generates a single-file program with `public class MainClass`
#[derive(Debug, Clone, Copy, Default)]
pub struct CsharpHarness;

impl HarnessGenerator for CsharpHarness {
    fn language(&self) -> Language {
        Language::Csharp
    }

    fn generate(&self, request: &HarnessRequest<'_>, params: &[Parameter]) -> String {
        let function = brace_function(Language::Csharp, request);
        // calling a static member through an instance does not compile in C#
        let call = if is_static_definition(&function, request.function_name) {
            format!("{}({})", request.function_name, argument_list(params))
        } else {
            format!("new MainClass().{}({})", request.function_name, argument_list(params))
        };

        let mut code = CodeBuilder::new("    ");
        code.lines(USINGS).blank();
        code.block("public class MainClass", |b| {
            b.verbatim(&function).blank();
            b.lines(READER).blank();
            b.block("public static void Main(string[] args)", |b| {
                b.line("__Load();");
                for param in params {
                    match declaration(param) {
                        Some(decl) => b.line(decl),
                        None => b.line(format!("// {}", unsupported_comment(param))),
                    };
                }
                if request.return_type() == "void" {
                    b.line(format!("{call};"));
                } else {
                    b.line(format!("Console.WriteLine(__Format({call}));"));
                }
            });
        });

        code.finish()
    }
}

/// C# element type and a lambda body parsing `x`
fn element(ty: SemanticType, width: NumericWidth) -> (&'static str, &'static str) {
    match (ty, width) {
        (SemanticType::Int, NumericWidth::Long | NumericWidth::LongLong) => {
            ("long", "long.Parse(x, CultureInfo.InvariantCulture)")
        }
        (SemanticType::Int, _) => ("int", "int.Parse(x, CultureInfo.InvariantCulture)"),
        (SemanticType::Float, NumericWidth::Float) => {
            ("float", "float.Parse(x, CultureInfo.InvariantCulture)")
        }
        (SemanticType::Float, _) => ("double", "double.Parse(x, CultureInfo.InvariantCulture)"),
        (SemanticType::Bool, _) => ("bool", "__Bool(x)"),
        _ => ("string", "x"),
    }
}

fn declaration(param: &Parameter) -> Option<String> {
    let name = &param.name;
    let (ty, parse) = element(param.ty.element(), NumericWidth::of(param));
    let list = is_generic_list(param);

    let decl = match param.ty {
        SemanticType::Bool => format!("bool {name} = __Bool(__Token());"),
        SemanticType::Int | SemanticType::Float => {
            format!("{ty} {name} = {ty}.Parse(__Token(), CultureInfo.InvariantCulture);")
        }
        SemanticType::String => format!("string {name} = __Line();"),
        SemanticType::IntArray | SemanticType::FloatArray | SemanticType::BoolArray
        | SemanticType::StringArray => {
            let (collection, finish) = if list {
                (format!("List<{ty}>"), "ToList()")
            } else {
                (format!("{ty}[]"), "ToArray()")
            };
            format!("{collection} {name} = __Items(__Line()).Select(x => {parse}).{finish};")
        }
        SemanticType::IntMatrix | SemanticType::StringMatrix => {
            if list {
                format!(
                    "List<List<{ty}>> {name} = __Rows(__Line()).Select(r => r.Select(x => {parse}).ToList()).ToList();"
                )
            } else {
                format!(
                    "{ty}[][] {name} = __Rows(__Line()).Select(r => r.Select(x => {parse}).ToArray()).ToArray();"
                )
            }
        }
        SemanticType::Unknown => return None,
    };
    Some(decl)
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
        CsharpHarness.generate(&request, &parse_signature(signature))
    }

    #[test]
    fn test_static_method_called_directly() {
        let source = generate(
            "public static int Sum(int a, int b) {\n    return a + b;\n}",
            "public static int Sum(int a, int b)",
            "Sum",
        );
        assert!(source.contains("public class MainClass {\npublic static int Sum(int a, int b) {"));
        assert!(source.contains("int a = int.Parse(__Token(), CultureInfo.InvariantCulture);"));
        assert!(source.contains("Console.WriteLine(__Format(Sum(a, b)));"));
    }

    #[test]
    fn test_instance_method_uses_new_instance() {
        let source = generate(
            "public bool IsEven(int n) { return n % 2 == 0; }",
            "public bool IsEven(int n)",
            "IsEven",
        );
        assert!(source.contains("Console.WriteLine(__Format(new MainClass().IsEven(n)));"));
    }

    #[test]
    fn test_collections() {
        let source = generate(
            "return nums.Length;",
            "public static int F(int[] nums, List<string> words, int[][] grid, bool flag)",
            "F",
        );
        assert!(source.contains(
            "int[] nums = __Items(__Line()).Select(x => int.Parse(x, CultureInfo.InvariantCulture)).ToArray();"
        ));
        assert!(source.contains("List<string> words = __Items(__Line()).Select(x => x).ToList();"));
        assert!(source.contains(
            "int[][] grid = __Rows(__Line()).Select(r => r.Select(x => int.Parse(x, CultureInfo.InvariantCulture)).ToArray()).ToArray();"
        ));
        assert!(source.contains("bool flag = __Bool(__Token());"));
    }
}

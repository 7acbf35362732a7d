//! C harness generator
//!
//! C has no length-carrying collections, so the generator also binds
//! LeetCode-style companion parameters: a size-like integer following a
//! pointer (`numsSize`, `len`, `gridColSize`) receives the parsed length, and
//! `return*` out-parameters (`int* returnSize`, `int** returnColumnSizes`)
//! are backed by harness locals that drive printing of array results.

use std::sync::LazyLock;

use regex::Regex;

use super::{
    CodeBuilder, HarnessGenerator, HarnessRequest, NumericWidth, brace_function,
    unsupported_comment,
};
use crate::judge::signature::{Parameter, SemanticType, classify_type};
use crate::models::Language;

const HEADERS: &str = "#include <ctype.h>
#include <limits.h>
#include <math.h>
#include <stdbool.h>
#include <stdio.h>
#include <stdlib.h>
#include <string.h>";

const READER: &str = r#"static char **judge_lines = NULL;
static int judge_line_count = 0;
static int judge_row = 0;
static size_t judge_pos = 0;

static char *judge_copy(const char *start, size_t len) {
    char *out = (char *)malloc(len + 1);
    memcpy(out, start, len);
    out[len] = '\0';
    return out;
}

static void judge_load(void) {
    size_t cap = 4096, len = 0;
    char *data = (char *)malloc(cap);
    int ch;
    while ((ch = getchar()) != EOF) {
        if (len + 1 >= cap) {
            cap *= 2;
            data = (char *)realloc(data, cap);
        }
        data[len++] = (char)ch;
    }
    data[len] = '\0';

    int line_cap = 16;
    judge_lines = (char **)malloc(sizeof(char *) * line_cap);
    char *cursor = data;
    while (*cursor) {
        char *end = strchr(cursor, '\n');
        size_t n = end ? (size_t)(end - cursor) : strlen(cursor);
        size_t b = 0, e = n;
        while (b < n && isspace((unsigned char)cursor[b])) b++;
        while (e > b && isspace((unsigned char)cursor[e - 1])) e--;
        if (e > b) {
            if (judge_line_count == line_cap) {
                line_cap *= 2;
                judge_lines = (char **)realloc(judge_lines, sizeof(char *) * line_cap);
            }
            judge_lines[judge_line_count++] = judge_copy(cursor + b, e - b);
        }
        if (!end) break;
        cursor = end + 1;
    }
    free(data);
}

static int judge_is_sep(char ch) {
    return ch == ',' || isspace((unsigned char)ch);
}

static int judge_is_item_sep(char ch) {
    return judge_is_sep(ch) || ch == '[' || ch == ']';
}

static int judge_fill(void) {
    while (judge_row < judge_line_count) {
        const char *line = judge_lines[judge_row];
        while (line[judge_pos] && judge_is_sep(line[judge_pos])) judge_pos++;
        if (line[judge_pos]) return 1;
        judge_row++;
        judge_pos = 0;
    }
    return 0;
}

static char *judge_token(void) {
    if (!judge_fill()) return judge_copy("", 0);
    const char *line = judge_lines[judge_row];
    size_t start = judge_pos;
    while (line[judge_pos] && !judge_is_sep(line[judge_pos])) judge_pos++;
    return judge_copy(line + start, judge_pos - start);
}

static char *judge_rest(void) {
    if (!judge_fill()) return judge_copy("", 0);
    const char *line = judge_lines[judge_row] + judge_pos;
    judge_row++;
    judge_pos = 0;
    return judge_copy(line, strlen(line));
}

static char **judge_items(const char *text, int *count) {
    int cap = 8;
    char **out = (char **)malloc(sizeof(char *) * cap);
    size_t i = 0;
    *count = 0;
    while (text[i]) {
        while (text[i] && judge_is_item_sep(text[i])) i++;
        if (!text[i]) break;
        size_t start = i;
        while (text[i] && !judge_is_item_sep(text[i])) i++;
        if (*count == cap) {
            cap *= 2;
            out = (char **)realloc(out, sizeof(char *) * cap);
        }
        out[(*count)++] = judge_copy(text + start, i - start);
    }
    return out;
}

static char ***judge_rows(const char *text, int *rows, int **cols) {
    int cap = 8;
    char ***out = (char ***)malloc(sizeof(char **) * cap);
    *cols = (int *)malloc(sizeof(int) * cap);
    *rows = 0;
    const char *cursor = text;
    while (1) {
        const char *end = strchr(cursor, ';');
        size_t n = end ? (size_t)(end - cursor) : strlen(cursor);
        char *part = judge_copy(cursor, n);
        int count = 0;
        char **cells = judge_items(part, &count);
        free(part);
        if (count > 0) {
            if (*rows == cap) {
                cap *= 2;
                out = (char ***)realloc(out, sizeof(char **) * cap);
                *cols = (int *)realloc(*cols, sizeof(int) * cap);
            }
            out[*rows] = cells;
            (*cols)[*rows] = count;
            (*rows)++;
        } else {
            free(cells);
        }
        if (!end) break;
        cursor = end + 1;
    }
    return out;
}

static bool judge_bool(const char *text) {
    char value[8];
    size_t n = strlen(text);
    if (n >= sizeof(value)) return false;
    for (size_t i = 0; i <= n; i++) value[i] = (char)tolower((unsigned char)text[i]);
    return strcmp(value, "true") == 0 || strcmp(value, "1") == 0;
}"#;

static SIZE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(size|sizes|len|length|count|rows|cols)$").expect("valid regex")
});

static OUT_PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)return").expect("valid regex"));

/// Generates a single C file built with `gcc`
#[derive(Debug, Clone, Copy, Default)]
pub struct CHarness;

impl HarnessGenerator for CHarness {
    fn language(&self) -> Language {
        Language::C
    }

    fn generate(&self, request: &HarnessRequest<'_>, params: &[Parameter]) -> String {
        let bindings = bind_parameters(params);
        let arguments: Vec<String> = bindings.iter().map(Binding::argument).collect();
        let call = format!("{}({})", request.function_name, arguments.join(", "));
        let out_rows = bindings.iter().find_map(|b| match b {
            Binding::OutSize { name } => Some(name.clone()),
            _ => None,
        });
        let out_cols = bindings.iter().find_map(|b| match b {
            Binding::OutColumns { name } => Some(name.clone()),
            _ => None,
        });

        let mut code = CodeBuilder::new("    ");
        code.lines(HEADERS).blank();
        code.verbatim(&brace_function(Language::C, request)).blank();
        code.lines(READER).blank();

        code.block("int main(void)", |b| {
            b.line("judge_load();");
            for binding in &bindings {
                binding.emit(b);
            }
            print_result(
                b,
                &request.return_type(),
                &call,
                out_rows.as_deref(),
                out_cols.as_deref(),
            );
            b.line("return 0;");
        });

        code.finish()
    }
}

/// How one declared parameter is satisfied by the harness
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    /// Read from stdin
    Input(Parameter),
    /// Length of an earlier 1-D collection, or row count of a matrix
    Length { name: String, of: String },
    /// Per-row column counts of an earlier matrix
    Columns { name: String, of: String, pointer: bool },
    /// `int* returnSize`
    OutSize { name: String },
    /// `int** returnColumnSizes`
    OutColumns { name: String },
    Unsupported(Parameter),
}

impl Binding {
    fn argument(&self) -> String {
        match self {
            Self::Input(p) | Self::Unsupported(p) => p.name.clone(),
            Self::Length { name, .. } | Self::Columns { name, .. } => name.clone(),
            Self::OutSize { name } | Self::OutColumns { name } => format!("&{name}"),
        }
    }

    fn emit(&self, code: &mut CodeBuilder) {
        match self {
            Self::Input(param) => emit_input(code, param),
            Self::Length { name, of } => {
                code.line(format!("int {name} = {of}_count;"));
            }
            Self::Columns {
                name,
                of,
                pointer: true,
            } => {
                code.line(format!("int *{name} = {of}_cols;"));
            }
            Self::Columns {
                name,
                of,
                pointer: false,
            } => {
                code.line(format!("int {name} = {of}_count > 0 ? {of}_cols[0] : 0;"));
            }
            Self::OutSize { name } => {
                code.line(format!("int {name} = 0;"));
            }
            Self::OutColumns { name } => {
                code.line(format!("int *{name} = NULL;"));
            }
            Self::Unsupported(param) => {
                code.line(format!("/* {} */", unsupported_comment(param)));
            }
        }
    }
}

/// Pair every parameter with its harness source
fn bind_parameters(params: &[Parameter]) -> Vec<Binding> {
    let mut bindings = Vec::with_capacity(params.len());
    // most recent collection and how many companions it already received
    let mut last_collection: Option<(String, usize, usize)> = None;

    for param in params {
        let is_pointer = param.declared.contains('*');

        if is_pointer && OUT_PARAMETER.is_match(&param.name) {
            let binding = if param.declared.matches('*').count() >= 2 {
                Binding::OutColumns {
                    name: param.name.clone(),
                }
            } else {
                Binding::OutSize {
                    name: param.name.clone(),
                }
            };
            bindings.push(binding);
            continue;
        }

        if let Some((of, dims, bound)) = last_collection.as_mut() {
            let size_like = SIZE_LIKE.is_match(&param.name)
                && classify_type(param.declared.trim_end_matches('*')) == SemanticType::Int;
            let binding = match (size_like, *dims, *bound) {
                (false, _, _) => None,
                (true, 1, 0) | (true, 2, 0) if !is_pointer => Some(Binding::Length {
                    name: param.name.clone(),
                    of: of.clone(),
                }),
                (true, 2, _) => Some(Binding::Columns {
                    name: param.name.clone(),
                    of: of.clone(),
                    pointer: is_pointer,
                }),
                _ => None,
            };
            if let Some(binding) = binding {
                *bound += 1;
                bindings.push(binding);
                continue;
            }
        }

        if param.ty.dimensions() > 0 {
            last_collection = Some((param.name.clone(), param.ty.dimensions(), 0));
        }

        bindings.push(match param.ty {
            SemanticType::Unknown => Binding::Unsupported(param.clone()),
            _ => Binding::Input(param.clone()),
        });
    }

    bindings
}

fn c_element(ty: SemanticType, width: NumericWidth) -> (&'static str, &'static str) {
    // (C type, conversion of `x`)
    match (ty, width) {
        (SemanticType::Int, NumericWidth::LongLong) => ("long long", "strtoll(x, NULL, 10)"),
        (SemanticType::Int, NumericWidth::Long) => ("long", "strtol(x, NULL, 10)"),
        (SemanticType::Int, _) => ("int", "(int)strtol(x, NULL, 10)"),
        (SemanticType::Float, NumericWidth::Float) => ("float", "strtof(x, NULL)"),
        (SemanticType::Float, _) => ("double", "strtod(x, NULL)"),
        (SemanticType::Bool, _) => ("bool", "judge_bool(x)"),
        _ => ("char *", "x"),
    }
}

fn emit_input(code: &mut CodeBuilder, param: &Parameter) {
    let name = &param.name;
    let (ty, convert) = c_element(param.ty.element(), NumericWidth::of(param));
    let star = if ty.ends_with('*') { "" } else { " " };

    match param.ty.dimensions() {
        0 if param.ty == SemanticType::String => {
            code.line(format!("char *{name} = judge_rest();"));
        }
        0 => {
            code.line(format!("{ty}{star}{name} = {};", convert.replace('x', "judge_token()")));
        }
        1 => {
            code.line(format!("int {name}_count = 0;"));
            code.line(format!("char **{name}_items = judge_items(judge_rest(), &{name}_count);"));
            code.line(format!(
                "{ty}{star}*{name} = ({ty}{star}*)malloc(sizeof({ty}) * ({name}_count > 0 ? {name}_count : 1));"
            ));
            code.line(format!(
                "for (int i = 0; i < {name}_count; i++) {name}[i] = {};",
                convert.replace('x', &format!("{name}_items[i]"))
            ));
        }
        _ => {
            code.line(format!("int {name}_count = 0;"));
            code.line(format!("int *{name}_cols = NULL;"));
            code.line(format!(
                "char ***{name}_cells = judge_rows(judge_rest(), &{name}_count, &{name}_cols);"
            ));
            code.line(format!(
                "{ty}{star}**{name} = ({ty}{star}**)malloc(sizeof({ty}{star}*) * ({name}_count > 0 ? {name}_count : 1));"
            ));
            code.block(format!("for (int i = 0; i < {name}_count; i++)"), |b| {
                b.line(format!(
                    "{name}[i] = ({ty}{star}*)malloc(sizeof({ty}) * ({name}_cols[i] > 0 ? {name}_cols[i] : 1));"
                ));
                b.line(format!(
                    "for (int j = 0; j < {name}_cols[i]; j++) {name}[i][j] = {};",
                    convert.replace('x', &format!("{name}_cells[i][j]"))
                ));
            });
        }
    }
}

/// printf format and argument cast for a scalar C type spelling
fn scalar_printer(ty: &str) -> (&'static str, &'static str) {
    let ty = ty.to_lowercase();
    if ty.contains("bool") {
        ("%s", "BOOL")
    } else if ty.contains("char*") {
        ("%s", "")
    } else if ty == "char" || ty == "const char" {
        ("%c", "")
    } else if ty.contains("double") || ty.contains("float") {
        ("%.15g", "(double)")
    } else {
        ("%lld", "(long long)")
    }
}

fn print_value(code: &mut CodeBuilder, ty: &str, expr: &str) {
    let (fmt, cast) = scalar_printer(ty);
    if cast == "BOOL" {
        code.line(format!("printf(\"{fmt}\", ({expr}) ? \"true\" : \"false\");"));
    } else {
        code.line(format!("printf(\"{fmt}\", {cast}{expr});"));
    }
}

fn print_result(
    code: &mut CodeBuilder,
    return_type: &str,
    call: &str,
    out_rows: Option<&str>,
    out_cols: Option<&str>,
) {
    let stars = return_type.matches('*').count();
    let base = return_type.trim_end_matches('*');
    let is_string = base.to_lowercase().ends_with("char") && stars == 1;

    if return_type == "void" {
        code.line(format!("{call};"));
        return;
    }

    if stars == 0 || is_string {
        let decl = if stars == 0 { base.to_string() } else { format!("{base} *") };
        code.line(format!("{decl} result = {call};"));
        print_value(code, return_type, "result");
        code.line("printf(\"\\n\");");
        return;
    }

    // array results are only printable when the size comes back through `returnSize`
    let rows = out_rows.unwrap_or("0");
    let element = if base.to_lowercase().ends_with("char") && stars == 2 {
        "char*".to_string()
    } else {
        base.to_string()
    };
    let pointer_decl = format!("{base} {}", "*".repeat(stars));
    code.line(format!("{pointer_decl}result = {call};"));

    if stars >= 2 && element != "char*" {
        let cols = out_cols.map(|c| format!("{c}[i]")).unwrap_or_else(|| "0".to_string());
        code.line(format!("if ({rows} == 0) printf(\"[]\");"));
        code.block(format!("for (int i = 0; i < {rows}; i++)"), |b| {
            b.line("if (i > 0) printf(\";\");");
            b.line("printf(\"[\");");
            b.block(format!("for (int j = 0; j < {cols}; j++)"), |b| {
                b.line("if (j > 0) printf(\", \");");
                print_value(b, &element, "result[i][j]");
            });
            b.line("printf(\"]\");");
        });
    } else {
        code.line("printf(\"[\");");
        code.block(format!("for (int i = 0; i < {rows}; i++)"), |b| {
            b.line("if (i > 0) printf(\", \");");
            print_value(b, &element, "result[i]");
        });
        code.line("printf(\"]\");");
    }
    code.line("printf(\"\\n\");");
}

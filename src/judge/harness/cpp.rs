//! C++ harness generator

use super::{
    CodeBuilder, HarnessGenerator, HarnessRequest, NumericWidth, argument_list, brace_function,
    unsupported_comment,
};
use crate::judge::signature::{Parameter, SemanticType};
use crate::models::Language;

const HEADERS: &str = "#include <bits/stdc++.h>
using namespace std;";

const READER: &str = r#"namespace judge_io {
static std::vector<std::string> lines;
static std::size_t row = 0;
static std::size_t pos = 0;

inline bool is_sep(char ch) {
    return ch == ',' || std::isspace(static_cast<unsigned char>(ch));
}

inline void load() {
    std::string line;
    while (std::getline(std::cin, line)) {
        std::size_t begin = line.find_first_not_of(" \t\r\n");
        if (begin == std::string::npos) continue;
        std::size_t end = line.find_last_not_of(" \t\r\n");
        lines.push_back(line.substr(begin, end - begin + 1));
    }
}

inline bool fill() {
    while (row < lines.size()) {
        const std::string& line = lines[row];
        while (pos < line.size() && is_sep(line[pos])) pos++;
        if (pos < line.size()) return true;
        row++;
        pos = 0;
    }
    return false;
}

inline std::string token() {
    if (!fill()) return "";
    const std::string& line = lines[row];
    std::size_t start = pos;
    while (pos < line.size() && !is_sep(line[pos])) pos++;
    return line.substr(start, pos - start);
}

inline std::string rest() {
    if (!fill()) return "";
    std::string out = lines[row].substr(pos);
    row++;
    pos = 0;
    std::size_t end = out.find_last_not_of(" \t\r\n");
    return end == std::string::npos ? "" : out.substr(0, end + 1);
}

inline std::vector<std::string> items(const std::string& text) {
    std::vector<std::string> out;
    std::string current;
    for (char ch : text) {
        if (is_sep(ch) || ch == '[' || ch == ']') {
            if (!current.empty()) out.push_back(current);
            current.clear();
        } else {
            current += ch;
        }
    }
    if (!current.empty()) out.push_back(current);
    return out;
}

inline std::vector<std::vector<std::string>> rows(const std::string& text) {
    std::vector<std::vector<std::string>> out;
    std::stringstream stream(text);
    std::string part;
    while (std::getline(stream, part, ';')) {
        std::vector<std::string> cells = items(part);
        if (!cells.empty()) out.push_back(cells);
    }
    return out;
}

template <typename T> T parse(const std::string& text);
template <> inline int parse<int>(const std::string& text) { return std::stoi(text); }
template <> inline long parse<long>(const std::string& text) { return std::stol(text); }
template <> inline long long parse<long long>(const std::string& text) { return std::stoll(text); }
template <> inline float parse<float>(const std::string& text) { return std::stof(text); }
template <> inline double parse<double>(const std::string& text) { return std::stod(text); }
template <> inline std::string parse<std::string>(const std::string& text) { return text; }
template <> inline bool parse<bool>(const std::string& text) {
    std::string value = text;
    for (char& ch : value) ch = static_cast<char>(std::tolower(static_cast<unsigned char>(ch)));
    return value == "true" || value == "1";
}

template <typename T> std::vector<T> read_list(const std::string& text) {
    std::vector<T> out;
    for (const std::string& item : items(text)) out.push_back(parse<T>(item));
    return out;
}

template <typename T> std::vector<std::vector<T>> read_grid(const std::string& text) {
    std::vector<std::vector<T>> out;
    for (const std::vector<std::string>& cells : rows(text)) {
        std::vector<T> parsed;
        for (const std::string& item : cells) parsed.push_back(parse<T>(item));
        out.push_back(parsed);
    }
    return out;
}

inline std::string format(bool value) { return value ? "true" : "false"; }
inline std::string format(const std::string& value) { return value; }
inline std::string format(const char* value) { return value; }
inline std::string format(char value) { return std::string(1, value); }

template <typename T> std::string format(const T& value) {
    std::ostringstream out;
    out << value;
    return out.str();
}

template <typename T> std::string format(const std::vector<T>& values) {
    std::string out = "[";
    for (std::size_t i = 0; i < values.size(); i++) {
        if (i > 0) out += ", ";
        out += format(static_cast<T>(values[i]));
    }
    return out + "]";
}

template <typename T> std::string format(const std::vector<std::vector<T>>& values) {
    std::string out;
    for (std::size_t i = 0; i < values.size(); i++) {
        if (i > 0) out += ";";
        out += format(values[i]);
    }
    return values.empty() ? "[]" : out;
}
}  // namespace judge_io"#;

/// Generates a single translation unit built with `g++`
#[derive(Debug, Clone, Copy, Default)]
pub struct CppHarness;

impl HarnessGenerator for CppHarness {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn generate(&self, request: &HarnessRequest<'_>, params: &[Parameter]) -> String {
        let call = format!("{}({})", request.function_name, argument_list(params));

        let mut code = CodeBuilder::new("    ");
        code.lines(HEADERS).blank();
        code.verbatim(&brace_function(Language::Cpp, request)).blank();
        code.lines(READER).blank();

        code.block("int main()", |b| {
            b.line("judge_io::load();");
            for param in params {
                match declaration(param) {
                    Some(decl) => b.line(decl),
                    None => b.line(format!("// {}", unsupported_comment(param))),
                };
            }
            if request.return_type() == "void" {
                b.line(format!("{call};"));
            } else {
                b.line(format!("std::cout << judge_io::format({call}) << std::endl;"));
            }
            b.line("return 0;");
        });

        code.finish()
    }
}

fn element_type(ty: SemanticType, width: NumericWidth) -> &'static str {
    match (ty, width) {
        (SemanticType::Int, NumericWidth::LongLong) => "long long",
        (SemanticType::Int, NumericWidth::Long) => "long",
        (SemanticType::Int, _) => "int",
        (SemanticType::Float, NumericWidth::Float) => "float",
        (SemanticType::Float, _) => "double",
        (SemanticType::Bool, _) => "bool",
        _ => "std::string",
    }
}

fn declaration(param: &Parameter) -> Option<String> {
    let name = &param.name;
    let elem = element_type(param.ty.element(), NumericWidth::of(param));

    let decl = match param.ty {
        SemanticType::Int | SemanticType::Float | SemanticType::Bool => {
            format!("{elem} {name} = judge_io::parse<{elem}>(judge_io::token());")
        }
        SemanticType::String => format!("std::string {name} = judge_io::rest();"),
        SemanticType::IntArray | SemanticType::FloatArray | SemanticType::BoolArray
        | SemanticType::StringArray => format!(
            "std::vector<{elem}> {name} = judge_io::read_list<{elem}>(judge_io::rest());"
        ),
        SemanticType::IntMatrix | SemanticType::StringMatrix => format!(
            "std::vector<std::vector<{elem}>> {name} = judge_io::read_grid<{elem}>(judge_io::rest());"
        ),
        SemanticType::Unknown => return None,
    };
    Some(decl)
}

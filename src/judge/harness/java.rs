//! Java harness generator
//!
//! The candidate code is placed inside `public class Main` together with
//! `__`-prefixed static reader helpers; the file is compiled as `Main.java`.

use super::{
    CodeBuilder, HarnessGenerator, HarnessRequest, NumericWidth, argument_list, brace_function,
    is_generic_list, is_static_definition, unsupported_comment,
};
use crate::judge::signature::{Parameter, SemanticType};
use crate::models::Language;

const IMPORTS: &str = "import java.util.*;
import java.util.stream.*;";

const READER: &str = r#"private static final List<String> __lines = new ArrayList<>();
private static int __row = 0;
private static int __pos = 0;

private static void __load() throws java.io.IOException {
    java.io.BufferedReader reader = new java.io.BufferedReader(new java.io.InputStreamReader(System.in));
    String line;
    while ((line = reader.readLine()) != null) {
        line = line.trim();
        if (!line.isEmpty()) __lines.add(line);
    }
}

private static boolean __sep(char ch) {
    return ch == ',' || Character.isWhitespace(ch);
}

private static boolean __fill() {
    while (__row < __lines.size()) {
        String line = __lines.get(__row);
        while (__pos < line.length() && __sep(line.charAt(__pos))) __pos++;
        if (__pos < line.length()) return true;
        __row++;
        __pos = 0;
    }
    return false;
}

private static String __token() {
    if (!__fill()) return "";
    String line = __lines.get(__row);
    int start = __pos;
    while (__pos < line.length() && !__sep(line.charAt(__pos))) __pos++;
    return line.substring(start, __pos);
}

private static String __line() {
    if (!__fill()) return "";
    String rest = __lines.get(__row).substring(__pos).trim();
    __row++;
    __pos = 0;
    return rest;
}

private static String[] __items(String text) {
    return Arrays.stream(text.split("[\\s,\\[\\]]+")).filter(s -> !s.isEmpty()).toArray(String[]::new);
}

private static String[][] __rows(String text) {
    return Arrays.stream(text.split(";")).map(Main::__items).filter(r -> r.length > 0).toArray(String[][]::new);
}

private static boolean __bool(String text) {
    String value = text.trim().toLowerCase();
    return value.equals("true") || value.equals("1");
}

private static boolean[] __bools(String[] items) {
    boolean[] out = new boolean[items.length];
    for (int i = 0; i < items.length; i++) out[i] = __bool(items[i]);
    return out;
}

private static float[] __floats(String[] items) {
    float[] out = new float[items.length];
    for (int i = 0; i < items.length; i++) out[i] = Float.parseFloat(items[i]);
    return out;
}

private static String __format(Object value) {
    if (value == null) return "null";
    if (value instanceof Collection<?>) return __format(((Collection<?>) value).toArray());
    if (value.getClass().isArray()) {
        int length = java.lang.reflect.Array.getLength(value);
        List<String> parts = new ArrayList<>();
        boolean nested = length > 0;
        for (int i = 0; i < length; i++) {
            Object item = java.lang.reflect.Array.get(value, i);
            nested = nested && item != null && (item.getClass().isArray() || item instanceof Collection<?>);
            parts.add(__format(item));
        }
        if (nested) return String.join(";", parts);
        return "[" + String.join(", ", parts) + "]";
    }
    return String.valueOf(value);
}"#;

/// Generates `Main.java`
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaHarness;

impl HarnessGenerator for JavaHarness {
    fn language(&self) -> Language {
        Language::Java
    }

    fn generate(&self, request: &HarnessRequest<'_>, params: &[Parameter]) -> String {
        let function = brace_function(Language::Java, request);
        let call = if is_static_definition(&function, request.function_name) {
            format!("{}({})", request.function_name, argument_list(params))
        } else {
            format!("new Main().{}({})", request.function_name, argument_list(params))
        };

        let mut code = CodeBuilder::new("    ");
        code.lines(IMPORTS).blank();
        code.block("public class Main", |b| {
            b.verbatim(&function).blank();
            b.lines(READER).blank();
            b.block("public static void main(String[] args) throws Exception", |b| {
                b.line("__load();");
                for param in params {
                    match declaration(param) {
                        Some(decl) => b.line(decl),
                        None => b.line(format!("// {}", unsupported_comment(param))),
                    };
                }
                if request.return_type() == "void" {
                    b.line(format!("{call};"));
                } else {
                    b.line(format!("System.out.println(__format({call}));"));
                }
            });
        });

        code.finish()
    }
}

/// Java spelling and parse expression for one scalar element
fn element(ty: SemanticType, width: NumericWidth) -> (&'static str, &'static str, &'static str) {
    // (primitive, boxed, parser)
    match (ty, width) {
        (SemanticType::Int, NumericWidth::Long | NumericWidth::LongLong) => {
            ("long", "Long", "Long.parseLong")
        }
        (SemanticType::Int, _) => ("int", "Integer", "Integer.parseInt"),
        (SemanticType::Float, NumericWidth::Float) => ("float", "Float", "Float.parseFloat"),
        (SemanticType::Float, _) => ("double", "Double", "Double.parseDouble"),
        (SemanticType::Bool, _) => ("boolean", "Boolean", "__bool"),
        _ => ("String", "String", "String.valueOf"),
    }
}

fn declaration(param: &Parameter) -> Option<String> {
    let name = &param.name;
    let width = NumericWidth::of(param);
    let (primitive, boxed, parser) = element(param.ty.element(), width);
    let list = is_generic_list(param);

    let decl = match param.ty {
        SemanticType::Int | SemanticType::Float | SemanticType::Bool => {
            format!("{primitive} {name} = {parser}(__token());")
        }
        SemanticType::String => format!("String {name} = __line();"),
        SemanticType::IntArray | SemanticType::FloatArray | SemanticType::BoolArray
        | SemanticType::StringArray
            if list =>
        {
            format!(
                "List<{boxed}> {name} = Arrays.stream(__items(__line())).map(x -> {parser}(x)).collect(Collectors.toList());"
            )
        }
        SemanticType::StringArray => format!("String[] {name} = __items(__line());"),
        SemanticType::BoolArray => format!("boolean[] {name} = __bools(__items(__line()));"),
        SemanticType::IntArray | SemanticType::FloatArray
            if param.declared.to_lowercase().contains("integer[]") =>
        {
            format!(
                "Integer[] {name} = Arrays.stream(__items(__line())).map(Integer::valueOf).toArray(Integer[]::new);"
            )
        }
        SemanticType::IntArray | SemanticType::FloatArray => match primitive {
            "long" => format!(
                "long[] {name} = Arrays.stream(__items(__line())).mapToLong(Long::parseLong).toArray();"
            ),
            "float" => format!("float[] {name} = __floats(__items(__line()));"),
            "double" => format!(
                "double[] {name} = Arrays.stream(__items(__line())).mapToDouble(Double::parseDouble).toArray();"
            ),
            _ => format!(
                "int[] {name} = Arrays.stream(__items(__line())).mapToInt(Integer::parseInt).toArray();"
            ),
        },
        SemanticType::IntMatrix | SemanticType::StringMatrix if list => format!(
            "List<List<{boxed}>> {name} = Arrays.stream(__rows(__line())).map(r -> Arrays.stream(r).map(x -> {parser}(x)).collect(Collectors.toList())).collect(Collectors.toList());"
        ),
        SemanticType::StringMatrix => format!("String[][] {name} = __rows(__line());"),
        SemanticType::IntMatrix if primitive == "long" => format!(
            "long[][] {name} = Arrays.stream(__rows(__line())).map(r -> Arrays.stream(r).mapToLong(Long::parseLong).toArray()).toArray(long[][]::new);"
        ),
        SemanticType::IntMatrix => format!(
            "int[][] {name} = Arrays.stream(__rows(__line())).map(r -> Arrays.stream(r).mapToInt(Integer::parseInt).toArray()).toArray(int[][]::new);"
        ),
        SemanticType::Unknown => return None,
    };
    Some(decl)
}

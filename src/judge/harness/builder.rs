//! Indentation-aware source text builder

/// Accumulates generated source one line at a time at the current indent level
#[derive(Debug)]
pub struct CodeBuilder {
    buf: String,
    level: usize,
    unit: &'static str,
}

impl CodeBuilder {
    /// Create a builder that indents with `unit` per level
    pub fn new(unit: &'static str) -> Self {
        Self {
            buf: String::new(),
            level: 0,
            unit,
        }
    }

    /// Emit one line at the current indent level
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.buf.push_str(self.unit);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Emit every line of a fixed snippet, re-indented to the current level
    pub fn lines(&mut self, snippet: &str) -> &mut Self {
        for line in snippet.lines() {
            self.line(line);
        }
        self
    }

    /// Emit text exactly as given, without touching its indentation
    pub fn verbatim(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        if !text.ends_with('\n') {
            self.buf.push('\n');
        }
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self
    }

    /// `header {` ... `}` with the body one level deeper
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(format!("{} {{", header.as_ref()));
        self.indent();
        body(self);
        self.dedent();
        self.line("}")
    }

    /// `header:` followed by an indented suite (Python)
    pub fn suite(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(format!("{}:", header.as_ref()));
        self.indent();
        body(self);
        self.dedent();
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_indentation() {
        let mut code = CodeBuilder::new("    ");
        code.block("int main()", |b| {
            b.line("return 0;");
        });
        assert_eq!(code.finish(), "int main() {\n    return 0;\n}\n");
    }

    #[test]
    fn test_suite_and_snippet() {
        let mut code = CodeBuilder::new("    ");
        code.suite("if x", |b| {
            b.lines("a = 1\nb = 2");
        });
        code.line("done");
        assert_eq!(code.finish(), "if x:\n    a = 1\n    b = 2\ndone\n");
    }

    #[test]
    fn test_verbatim_keeps_text() {
        let mut code = CodeBuilder::new("  ");
        code.indent().verbatim("  def f():\n\treturn 1");
        assert_eq!(code.finish(), "  def f():\n\treturn 1\n");
    }
}

//! Indentation-aware, append-only text builder for generated source.

#[derive(Clone, Debug, Default)]
pub struct CodeWriter {
    out: String,
    indent: usize,
    at_line_start: bool,
}

impl CodeWriter {
    pub const INDENT: usize = 4;

    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
            indent: 0,
            at_line_start: true,
        }
    }

    /// Append `text`. Every non-empty line that starts inside `text` is prefixed with the
    /// current indentation; blank lines stay blank.
    pub fn write(&mut self, text: &str) -> &mut Self {
        for ch in text.chars() {
            if self.at_line_start && ch != '\n' {
                self.out.extend(core::iter::repeat(' ').take(self.indent));
            }
            self.out.push(ch);
            self.at_line_start = ch == '\n';
        }
        self
    }

    pub fn line(&mut self, text: &str) -> &mut Self {
        self.write(text).write("\n")
    }

    pub fn blank(&mut self) -> &mut Self {
        self.write("\n")
    }

    /// Run `f` with the indentation shifted by `delta` spaces.
    pub fn with_indent<F: FnOnce(&mut Self)>(&mut self, delta: isize, f: F) -> &mut Self {
        let saved = self.indent;
        self.indent = saved.saturating_add_signed(delta);
        f(self);
        self.indent = saved;
        self
    }

    /// `header {`, the indented body, then `}`.
    pub fn block<F: FnOnce(&mut Self)>(&mut self, header: &str, f: F) -> &mut Self {
        self.write(header).write(" {\n");
        self.with_indent(Self::INDENT as isize, f);
        self.line("}")
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }
}

use dl_core::Position;

/// Line view over an input text. Lines are split on `\n` only, so joining
/// them back with `\n` reproduces the input byte for byte.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
    line_starts: Vec<usize>,
}

impl<'a> Document<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut line_starts = Vec::with_capacity(lines.len());
        let mut offset = 0;
        for line in &lines {
            line_starts.push(offset);
            offset += line.len() + 1;
        }
        Self {
            text,
            lines,
            line_starts,
        }
    }

    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Position of byte `col` within line `line`.
    #[must_use]
    pub fn position(&self, line: usize, col: usize) -> Position {
        let start = self.line_starts.get(line).copied().unwrap_or(self.text.len());
        Position::new(line, col, start + col)
    }

    /// Position just past the last byte of line `line`.
    #[must_use]
    pub fn line_end(&self, line: usize) -> Position {
        let len = self.line(line).map_or(0, str::len);
        self.position(line, len)
    }

    /// `lines[start..=end]` joined with `\n`.
    #[must_use]
    pub fn join_lines(&self, start: usize, end: usize) -> String {
        let end = end.min(self.lines.len().saturating_sub(1));
        if start > end {
            return String::new();
        }
        self.lines[start..=end].join("\n")
    }
}

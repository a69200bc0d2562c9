//! Source locations.
//!
//! A [`SourceLoc`] is attached to every token and carries everything a
//! diagnostic needs to point at a precise byte in the original program
//! without keeping the whole source buffer alive: the 1-based line
//! number, the 0-based column of the first byte of the lexeme, and a copy
//! of the full line's text (tabs already expanded to single spaces, per
//! the lexer's position-tracking contract).

use std::fmt;

/// A single point in the original source, plus enough context (the full
/// line text) to render a caret diagnostic without re-reading the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLoc {
    /// 1-based line number.
    pub line: usize,
    /// 0-based column of the first byte of the lexeme on `line`.
    pub column: usize,
    /// The full text of `line`, tabs expanded to single spaces.
    pub line_text: String,
}

impl SourceLoc {
    pub fn new(line: usize, column: usize, line_text: impl Into<String>) -> Self {
        Self {
            line,
            column,
            line_text: line_text.into(),
        }
    }

    /// Render the two-line caret display used by every diagnostic in this
    /// compiler: the source line, followed by a line of spaces and a `^`
    /// under the offending column.
    pub fn render_caret(&self) -> String {
        let mut caret_line = " ".repeat(self.column);
        caret_line.push('^');
        format!("{}\n{}", self.line_text, caret_line)
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

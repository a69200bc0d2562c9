//! Diagnostic rendering helpers shared by every compiler phase.
//!
//! The compiler's diagnostic formats (see the error-handling taxonomy)
//! are deliberately plain text, not a structured diagnostic object model:
//! each phase builds its own error enum (via `thiserror`) and calls into
//! the small set of renderers here to produce the final message. This
//! mirrors the source's `die()`/`show_token_on_source_line()` pair rather
//! than introducing a `Diagnostic`/`Handler` abstraction this compiler has
//! no use for (a single fatal-first-error policy, no accumulation).

use crate::span::SourceLoc;
use std::fmt;

/// Severity of a reported condition. Only `Error` is currently fatal in
/// this compiler (no warnings are accumulated), but the type exists so
/// the one intentional non-fatal diagnostic — a function falling off the
/// end without an explicit `return` — has somewhere to live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Render a lexical error: `lex error: <message>` followed by the
/// caret-under-column rendition of the offending line.
pub fn render_lex_error(message: &str, loc: &SourceLoc) -> String {
    format!("lex error: {}\n{}", message, loc.render_caret())
}

/// Render a syntax error in the `expecting {X, Y, or Z} got {actual}`
/// format, followed by the offending line/column.
pub fn render_syntax_error(expected: &[&str], got: &str, loc: &SourceLoc) -> String {
    let expecting = format_expected_list(expected);
    format!(
        "parse error: expecting {} got {}\n{}",
        expecting,
        got,
        loc.render_caret()
    )
}

fn format_expected_list(expected: &[&str]) -> String {
    match expected {
        [] => "end of input".to_string(),
        [one] => one.to_string(),
        [all @ .., last] => format!("{{{}, or {}}}", all.join(", "), last),
    }
}

/// Render a semantic error that cites a single token's location.
pub fn render_semantic_error(message: &str, loc: &SourceLoc) -> String {
    format!("error: {}\n{}", message, loc.render_caret())
}

/// Render a semantic error that cites two locations: the first (prior)
/// declaration and the second (conflicting) one. Used for redeclaration/
/// redefinition diagnostics throughout the symbol table and label set.
pub fn render_dual_citation_error(message: &str, first: &SourceLoc, then: &SourceLoc) -> String {
    format!(
        "error: {}\nFirst:\n{}\nThen:\n{}",
        message,
        first.render_caret(),
        then.render_caret()
    )
}

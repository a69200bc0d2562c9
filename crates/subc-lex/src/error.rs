use subc_util::SourceLoc;
use thiserror::Error;

/// Lexical errors: an unrecognised character sequence, or a multi-line
/// comment that never closes.
#[derive(Debug, Error)]
pub enum LexError {
    #[error("{}", subc_util::diagnostic::render_lex_error(
        &format!("unrecognised character '{ch}'"), loc))]
    UnknownCharacter { ch: char, loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_lex_error(
        "unterminated comment", loc))]
    UnterminatedComment { loc: SourceLoc },
}

impl LexError {
    /// Every lexical error exits with this code, per the error taxonomy.
    pub const EXIT_CODE: i32 = 128;
}

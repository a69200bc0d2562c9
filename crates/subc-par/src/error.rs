use subc_util::SourceLoc;
use thiserror::Error;

/// Every parse error is fatal and cites the current token's source line,
/// in the `expecting {X, Y, or Z} got {actual}` format.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{}", subc_util::diagnostic::render_syntax_error(expected, got, loc))]
    UnexpectedToken {
        expected: Vec<&'static str>,
        got: String,
        loc: SourceLoc,
    },

    #[error("{}", subc_util::diagnostic::render_semantic_error(message, loc))]
    Structural { message: String, loc: SourceLoc },
}

impl ParseError {
    pub const EXIT_CODE: i32 = 128;

    pub fn unexpected(expected: Vec<&'static str>, got: String, loc: SourceLoc) -> Self {
        ParseError::UnexpectedToken {
            expected,
            got,
            loc,
        }
    }

    pub fn structural(message: impl Into<String>, loc: SourceLoc) -> Self {
        ParseError::Structural {
            message: message.into(),
            loc,
        }
    }
}

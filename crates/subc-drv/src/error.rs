//! The driver's own error type, aggregating every phase's error plus the
//! usage- and I/O-level failures that only make sense at this level.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    /// Bad CLI invocation: prints usage and exits 129.
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Lex(#[from] subc_lex::LexError),

    #[error(transparent)]
    Parse(#[from] subc_par::ParseError),

    #[error(transparent)]
    Gen(#[from] subc_gen::CodeGenError),

    #[error("{path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with a failure status compiling {path}")]
    ExternalTool {
        tool: String,
        path: std::path::PathBuf,
    },
}

impl DriverError {
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::Usage(_) => 129,
            _ => 128,
        }
    }
}

use subc_sem::SemError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    #[error(transparent)]
    Semantic(#[from] SemError),

    #[error("I/O error writing assembly: {0}")]
    Io(#[from] std::io::Error),
}

impl CodeGenError {
    pub const EXIT_CODE: i32 = 128;
}

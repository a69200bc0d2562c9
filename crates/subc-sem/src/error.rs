use subc_util::SourceLoc;
use thiserror::Error;

/// Semantic errors: everything in the "undeclared identifier,
/// redeclaration, return-type mismatch, ..." taxonomy. Every variant
/// carries the source location(s) needed to render its diagnostic;
/// redeclaration-class errors carry both the prior and the conflicting
/// token ("First:"/"Then:").
#[derive(Debug, Error)]
pub enum SemError {
    #[error("{}", subc_util::diagnostic::render_dual_citation_error(
        &format!("redefinition of symbol '{name}'"), first, then))]
    LocalRedeclared {
        name: String,
        first: SourceLoc,
        then: SourceLoc,
    },

    #[error("{}", subc_util::diagnostic::render_dual_citation_error(
        &format!("redefinition of global '{name}' with an initializer"), first, then))]
    GlobalRedefined {
        name: String,
        first: SourceLoc,
        then: SourceLoc,
    },

    #[error("{}", subc_util::diagnostic::render_dual_citation_error(
        &format!("redefinition of function '{name}'"), first, then))]
    FunctionRedefined {
        name: String,
        first: SourceLoc,
        then: SourceLoc,
    },

    #[error("{}", subc_util::diagnostic::render_dual_citation_error(
        &format!("redeclaration of function '{name}' with a different signature"), first, then))]
    FunctionSignatureMismatch {
        name: String,
        first: SourceLoc,
        then: SourceLoc,
    },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        &format!("undeclared variable '{name}'"), loc))]
    UndeclaredVariable { name: String, loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        &format!("'{name}' is not a variable"), loc))]
    NotAVariable { name: String, loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        &format!("call to undeclared function '{name}'"), loc))]
    UndeclaredFunction { name: String, loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        &format!("cannot call '{name}': it is not a function"), loc))]
    NotAFunction { name: String, loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        &format!("parameter mismatch on call to '{name}'"), loc))]
    ArityMismatch { name: String, loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        "cannot use the result of a call to a void function", loc))]
    VoidUsedAsValue { loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        "return with a value in a void function", loc))]
    ReturnValueInVoidFunction { loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        "return without a value in a non-void function", loc))]
    MissingReturnValue { loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        "nothing to break from", loc))]
    BreakOutsideLoop { loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        "nothing to continue from", loc))]
    ContinueOutsideLoop { loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_semantic_error(
        &format!("unknown label '{label}'"), loc))]
    UndefinedLabel { label: String, loc: SourceLoc },

    #[error("{}", subc_util::diagnostic::render_dual_citation_error(
        &format!("redefinition of label '{label}'"), first, then))]
    LabelRedefined {
        label: String,
        first: SourceLoc,
        then: SourceLoc,
    },
}

impl SemError {
    pub const EXIT_CODE: i32 = 128;
}

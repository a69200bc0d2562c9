//! subc-sem — the scoped symbol table and the semantic rules that ride
//! along with it.
//!
//! This crate owns the data structure; `subc-gen` drives it as it walks
//! the AST (declaring locals as it assigns them stack slots, looking up
//! variables and calls as it emits instructions for them), exactly as the
//! distilled spec's component design describes the table being "built
//! incrementally during code generation."

pub mod error;
pub mod scope;

pub use error::SemError;
pub use scope::{ScopeMark, SymbolTable, VarLocation};

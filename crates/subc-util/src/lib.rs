//! subc-util — shared foundation types used by every other phase of the
//! `subc` compiler.
//!
//! This crate is intentionally small. Everything in here exists because
//! at least two downstream crates (`subc-lex`, `subc-par`, `subc-sem`,
//! `subc-gen`, `subc-drv`) need it: source-location tracking (`span`) and
//! the diagnostic-rendering helpers that turn a location into the
//! two-line caret display and the "First:"/"Then:" dual-citation format
//! used throughout the compiler's error output.

pub mod diagnostic;
pub mod span;

pub use diagnostic::Severity;
pub use span::SourceLoc;

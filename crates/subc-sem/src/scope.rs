//! The scoped symbol table.
//!
//! The source models scope discipline as copy-on-enter: the live table is
//! deep-cloned on every scope entry and the clone discarded on exit. This
//! implementation instead uses an **append-only stack of bindings with
//! pop-to-mark on exit** — the substitute explicitly sanctioned as
//! equivalent-behavior, grounded in the same rib/stack shape a scope tree
//! takes in a typical Rust compiler front end. A binding added in an
//! inner scope simply shadows an outer one of the same name because
//! lookup walks the stack from the top; popping back to the mark taken at
//! scope entry removes exactly the bindings that scope introduced,
//! exactly as discarding a cloned table would have.

use subc_lex::Token;
use subc_par::ast::{Declarator, FunctionDecl};

use crate::error::SemError;

/// Where a resolved variable reference actually lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarLocation {
    /// A local, at this byte offset (magnitude) below `%rbp`.
    Local(u32),
    /// A global, referenced by its mangled assembly name.
    Global(String),
}

struct LocalBinding {
    name: String,
    tok: Token,
    offset: u32,
}

struct GlobalSymbol {
    tok: Token,
    has_init: bool,
}

struct FunctionSymbol {
    tok: Token,
    param_count: usize,
    empty_parameter_declaration: bool,
    has_body: bool,
    is_void: bool,
}

/// An opaque marker returned by [`SymbolTable::enter_scope`] and required
/// by [`SymbolTable::exit_scope`] to pop back to exactly this point.
#[derive(Debug, Clone, Copy)]
pub struct ScopeMark(usize);

pub struct SymbolTable {
    locals: Vec<LocalBinding>,
    globals: std::collections::HashMap<String, GlobalSymbol>,
    functions: std::collections::HashMap<String, FunctionSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            locals: Vec::new(),
            globals: std::collections::HashMap::new(),
            functions: std::collections::HashMap::new(),
        }
    }

    /// Enter a new lexical scope. Returns a mark to later restore with
    /// [`Self::exit_scope`].
    pub fn enter_scope(&self) -> ScopeMark {
        ScopeMark(self.locals.len())
    }

    /// Exit the scope entered at `mark`, returning the number of bytes
    /// the locals declared in that scope occupied (what the generator
    /// must `add` back to `%rsp`).
    pub fn exit_scope(&mut self, mark: ScopeMark) -> u32 {
        let bytes = (self.locals.len() - mark.0) as u32 * 4;
        self.locals.truncate(mark.0);
        bytes
    }

    /// Bytes used by locals declared since `mark`, without popping them.
    /// Exposed for callers that need to know the running total before
    /// deciding to exit (e.g. a `for`-declaration's own wrapping scope).
    pub fn bytes_in_scope(&self, mark: ScopeMark) -> u32 {
        (self.locals.len() - mark.0) as u32 * 4
    }

    /// Declare a local at `offset` bytes below `%rbp`. Errors if a local
    /// of the same name was already declared in the *current* scope
    /// (i.e. since `mark`); a binding from an outer scope is legitimately
    /// shadowed, not a conflict.
    pub fn declare_local(
        &mut self,
        name: &str,
        tok: &Token,
        offset: u32,
        mark: ScopeMark,
    ) -> Result<(), SemError> {
        if let Some(existing) = self.locals[mark.0..].iter().find(|b| b.name == name) {
            return Err(SemError::LocalRedeclared {
                name: name.to_string(),
                first: existing.tok.loc.clone(),
                then: tok.loc.clone(),
            });
        }
        self.locals.push(LocalBinding {
            name: name.to_string(),
            tok: tok.clone(),
            offset,
        });
        Ok(())
    }

    pub fn declare_global(&mut self, decl: &Declarator) -> Result<(), SemError> {
        let has_init = decl.init.is_some();
        match self.globals.get_mut(&decl.name) {
            Some(existing) => {
                if existing.has_init && has_init {
                    return Err(SemError::GlobalRedefined {
                        name: decl.name.clone(),
                        first: existing.tok.loc.clone(),
                        then: decl.tok.loc.clone(),
                    });
                }
                if has_init {
                    existing.has_init = true;
                    existing.tok = decl.tok.clone();
                }
            }
            None => {
                self.globals.insert(
                    decl.name.clone(),
                    GlobalSymbol {
                        tok: decl.tok.clone(),
                        has_init,
                    },
                );
            }
        }
        Ok(())
    }

    pub fn declare_function(&mut self, decl: &FunctionDecl) -> Result<(), SemError> {
        let is_void = matches!(decl.return_type, subc_par::ast::ReturnType::Void);
        match self.functions.get(&decl.name) {
            Some(existing) => {
                if existing.has_body && decl.body.is_some() {
                    return Err(SemError::FunctionRedefined {
                        name: decl.name.clone(),
                        first: existing.tok.loc.clone(),
                        then: decl.name_tok.loc.clone(),
                    });
                }
                let counts_match = existing.param_count == decl.params.len()
                    || existing.empty_parameter_declaration
                    || decl.empty_parameter_declaration;
                if !counts_match || existing.is_void != is_void {
                    return Err(SemError::FunctionSignatureMismatch {
                        name: decl.name.clone(),
                        first: existing.tok.loc.clone(),
                        then: decl.name_tok.loc.clone(),
                    });
                }
                if existing.has_body {
                    // Prototype following a definition: keep the
                    // existing (defining) entry untouched.
                    return Ok(());
                }
            }
            None => {}
        }
        self.functions.insert(
            decl.name.clone(),
            FunctionSymbol {
                tok: decl.name_tok.clone(),
                param_count: decl.params.len(),
                empty_parameter_declaration: decl.empty_parameter_declaration,
                has_body: decl.body.is_some(),
                is_void,
            },
        );
        Ok(())
    }

    /// Resolve a variable reference: innermost local first, then global.
    pub fn lookup_variable(
        &self,
        name: &str,
        tok: &Token,
    ) -> Result<VarLocation, SemError> {
        if let Some(binding) = self.locals.iter().rev().find(|b| b.name == name) {
            return Ok(VarLocation::Local(binding.offset));
        }
        if self.globals.contains_key(name) {
            return Ok(VarLocation::Global(format!("_var_{}", name)));
        }
        if self.functions.contains_key(name) {
            return Err(SemError::NotAVariable {
                name: name.to_string(),
                loc: tok.loc.clone(),
            });
        }
        Err(SemError::UndeclaredVariable {
            name: name.to_string(),
            loc: tok.loc.clone(),
        })
    }

    /// Resolve a call target, checking arity (skipped when the
    /// declaration used the empty-parameter form) and void-return usage
    /// is left to the caller, which knows whether the result is used.
    pub fn lookup_call(
        &self,
        name: &str,
        tok: &Token,
        arg_count: usize,
    ) -> Result<bool /* is_void */, SemError> {
        let Some(func) = self.functions.get(name) else {
            if self.locals.iter().any(|b| b.name == name) || self.globals.contains_key(name) {
                return Err(SemError::NotAFunction {
                    name: name.to_string(),
                    loc: tok.loc.clone(),
                });
            }
            return Err(SemError::UndeclaredFunction {
                name: name.to_string(),
                loc: tok.loc.clone(),
            });
        };
        if !func.empty_parameter_declaration && func.param_count != arg_count {
            return Err(SemError::ArityMismatch {
                name: name.to_string(),
                loc: tok.loc.clone(),
            });
        }
        Ok(func.is_void)
    }

    /// Names of every global declared without an initializer, in
    /// declaration order — used to emit the deferred `.bss` entries at
    /// the end of generation.
    pub fn uninitialized_globals(&self) -> Vec<String> {
        self.globals
            .iter()
            .filter(|(_, g)| !g.has_init)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subc_lex::{Token, TokenKind};
    use subc_util::SourceLoc;

    fn tok(name: &str) -> Token {
        Token::new(
            TokenKind::Identifier(name.to_string()),
            SourceLoc::new(1, 0, name.to_string()),
        )
    }

    #[test]
    fn shadowing_in_inner_scope_is_allowed() {
        let mut table = SymbolTable::new();
        let outer = table.enter_scope();
        table.declare_local("x", &tok("x"), 4, outer).unwrap();
        let inner = table.enter_scope();
        table.declare_local("x", &tok("x"), 4, inner).unwrap();
        assert_eq!(
            table.lookup_variable("x", &tok("x")).unwrap(),
            VarLocation::Local(4)
        );
        table.exit_scope(inner);
        assert_eq!(
            table.lookup_variable("x", &tok("x")).unwrap(),
            VarLocation::Local(4)
        );
    }

    #[test]
    fn redeclaration_in_same_scope_is_an_error() {
        let mut table = SymbolTable::new();
        let scope = table.enter_scope();
        table.declare_local("x", &tok("x"), 4, scope).unwrap();
        assert!(table.declare_local("x", &tok("x"), 8, scope).is_err());
    }

    #[test]
    fn exit_scope_reports_correct_byte_count() {
        let mut table = SymbolTable::new();
        let scope = table.enter_scope();
        table.declare_local("a", &tok("a"), 4, scope).unwrap();
        table.declare_local("b", &tok("b"), 8, scope).unwrap();
        assert_eq!(table.exit_scope(scope), 8);
    }
}

//! Recursive-descent statement, declaration, and top-level parsing, plus
//! the cursor primitives everything else builds on: "expect one of
//! {kinds}, advance, else error" (fatal) and "advance if the kind
//! matches, else leave the cursor alone" (non-fatal).

use crate::ast::*;
use crate::error::ParseError;
use subc_lex::{Token, TokenKind};
use subc_util::SourceLoc;

pub struct Parser<'t> {
    pub(crate) tokens: &'t [Token],
    pub(crate) pos: usize,
}

impl<'t> Parser<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        assert!(
            matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::End)),
            "token stream must end with exactly one End sentinel"
        );
        Self { tokens, pos: 0 }
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    pub(crate) fn current_loc(&self) -> SourceLoc {
        self.tokens[self.pos].loc.clone()
    }

    /// Unconditionally consume and return the current token. Never
    /// advances past the terminal `End` sentinel.
    pub(crate) fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if !matches!(tok.kind, TokenKind::End) {
            self.pos += 1;
        }
        tok
    }

    /// Non-fatal: advance and return the token if its kind matches
    /// `want` (compared by discriminant, so `Identifier`/`IntegerLiteral`
    /// payloads don't need to match), else leave the cursor in place.
    pub(crate) fn advance_if(&mut self, want: TokenKind) -> Option<Token> {
        if std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(&want) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Fatal: expect `want`, advance and return it, else a syntax error
    /// citing the current token.
    pub(crate) fn expect(&mut self, want: TokenKind) -> Result<Token, ParseError> {
        self.expect_one_of(&[describe_kind(&want)], want)
    }

    pub(crate) fn expect_one_of(
        &mut self,
        expected_names: &[&'static str],
        want: TokenKind,
    ) -> Result<Token, ParseError> {
        if let Some(tok) = self.advance_if(want) {
            Ok(tok)
        } else {
            Err(ParseError::unexpected(
                expected_names.to_vec(),
                self.peek_kind().describe(),
                self.current_loc(),
            ))
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, Token), ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let tok = self.advance();
                Ok((name, tok))
            }
            other => Err(ParseError::unexpected(
                vec!["an identifier"],
                other.describe(),
                self.current_loc(),
            )),
        }
    }

    // ---- top level ----------------------------------------------------

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::End) {
            items.push(self.parse_top_level_item()?);
        }
        Ok(Program { items })
    }

    /// Disambiguates a global variable declaration list from a function
    /// declaration using bounded lookahead with commit points: it
    /// speculatively tries the variable-list parse, bailing back to a
    /// function parse on early mismatches, but once an `=` or `,` has
    /// been consumed it commits and any later mismatch is a hard error.
    fn parse_top_level_item(&mut self) -> Result<Item, ParseError> {
        if let Some(decls) = self.maybe_parse_global_var_list()? {
            self.expect(TokenKind::Semicolon)?;
            Ok(Item::GlobalVarList(decls))
        } else {
            Ok(Item::Function(self.parse_function_decl()?))
        }
    }

    fn maybe_parse_global_var_list(&mut self) -> Result<Option<Vec<Declarator>>, ParseError> {
        let checkpoint = self.pos;
        if self.advance_if(TokenKind::Int).is_none() {
            return Ok(None);
        }

        let mut can_bail = true;
        let mut decls = Vec::new();
        loop {
            let (name, tok) = if can_bail {
                match self.peek_kind().clone() {
                    TokenKind::Identifier(n) => {
                        self.advance();
                        (n, self.tokens[self.pos - 1].clone())
                    }
                    _ => {
                        self.pos = checkpoint;
                        return Ok(None);
                    }
                }
            } else {
                self.expect_identifier()?
            };

            let init = if self.advance_if(TokenKind::Assign).is_some() {
                can_bail = false;
                let init_tok = self.current_loc();
                let value = self.parse_expr_no_comma()?;
                if !matches!(value, Expr::IntLiteral(_)) {
                    return Err(ParseError::structural(
                        "static initialization requires a constant value",
                        init_tok,
                    ));
                }
                Some(value)
            } else {
                None
            };
            decls.push(Declarator { name, tok, init });

            if self.advance_if(TokenKind::Comma).is_some() {
                can_bail = false;
                continue;
            }
            break;
        }

        if can_bail && !matches!(self.peek_kind(), TokenKind::Semicolon) {
            self.pos = checkpoint;
            return Ok(None);
        }
        Ok(Some(decls))
    }

    fn parse_return_type(&mut self) -> Result<ReturnType, ParseError> {
        if self.advance_if(TokenKind::Int).is_some() {
            Ok(ReturnType::Int)
        } else if self.advance_if(TokenKind::Void).is_some() {
            Ok(ReturnType::Void)
        } else {
            Err(ParseError::unexpected(
                vec!["'int'", "'void'"],
                self.peek_kind().describe(),
                self.current_loc(),
            ))
        }
    }

    fn parse_function_decl(&mut self) -> Result<FunctionDecl, ParseError> {
        let return_type = self.parse_return_type()?;
        let (name, name_tok) = self.expect_identifier()?;
        self.expect(TokenKind::OpenParen)?;

        let mut params = Vec::new();
        let mut empty_parameter_declaration = false;
        if self.advance_if(TokenKind::Void).is_some() {
            // `(void)`: strict, zero-argument signature.
        } else if matches!(self.peek_kind(), TokenKind::CloseParen) {
            empty_parameter_declaration = true;
        } else {
            loop {
                self.expect(TokenKind::Int)?;
                let (pname, ptok) = self.expect_identifier()?;
                params.push(Param {
                    name: pname,
                    tok: ptok,
                });
                if self.advance_if(TokenKind::Comma).is_some() {
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::CloseParen)?;

        let body = if self.advance_if(TokenKind::Semicolon).is_some() {
            None
        } else {
            Some(self.parse_block_stmts()?)
        };

        Ok(FunctionDecl {
            return_type,
            name,
            name_tok,
            params,
            empty_parameter_declaration,
            body,
        })
    }

    // ---- statements -----------------------------------------------------

    fn parse_block_stmts(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(TokenKind::OpenBrace)?;
        let mut stmts = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::CloseBrace | TokenKind::End) {
            stmts.push(self.parse_statement(true)?);
        }
        self.expect(TokenKind::CloseBrace)?;
        Ok(stmts)
    }

    fn parse_declarator_list(&mut self) -> Result<Vec<Declarator>, ParseError> {
        let mut decls = Vec::new();
        loop {
            let (name, tok) = self.expect_identifier()?;
            let init = if self.advance_if(TokenKind::Assign).is_some() {
                Some(self.parse_expr_no_comma()?)
            } else {
                None
            };
            decls.push(Declarator { name, tok, init });
            if self.advance_if(TokenKind::Comma).is_some() {
                continue;
            }
            break;
        }
        Ok(decls)
    }

    /// `allow_declaration` is false for the direct body of an `if`/loop:
    /// only a block or a non-declaration statement may appear there.
    fn parse_statement(&mut self, allow_declaration: bool) -> Result<Stmt, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::OpenBrace => Ok(Stmt::Block(self.parse_block_stmts()?)),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Return => {
                let tok = self.advance();
                let value = if matches!(self.peek_kind(), TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return { value, tok })
            }
            TokenKind::If => {
                self.advance();
                self.expect(TokenKind::OpenParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                let then_branch = Box::new(self.parse_statement(false)?);
                let else_branch = if self.advance_if(TokenKind::Else).is_some() {
                    Some(Box::new(self.parse_statement(false)?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                })
            }
            TokenKind::Int if allow_declaration => {
                self.advance();
                let decls = self.parse_declarator_list()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::VarDeclList(decls))
            }
            TokenKind::While => {
                self.advance();
                self.expect(TokenKind::OpenParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                let body = Box::new(self.parse_statement(false)?);
                Ok(Stmt::While { cond, body })
            }
            TokenKind::Do => {
                self.advance();
                let body = Box::new(self.parse_statement(false)?);
                self.expect(TokenKind::While)?;
                self.expect(TokenKind::OpenParen)?;
                let cond = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::DoWhile { body, cond })
            }
            TokenKind::Break => {
                let tok = self.advance();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Break(tok))
            }
            TokenKind::Continue => {
                let tok = self.advance();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Continue(tok))
            }
            TokenKind::Goto => {
                self.advance();
                let (label, tok) = self.expect_identifier()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Goto { label, tok })
            }
            TokenKind::Identifier(_) if self.next_is_colon() => {
                let (label, tok) = self.expect_identifier()?;
                self.expect(TokenKind::Colon)?;
                let stmt = Box::new(self.parse_statement(true)?);
                Ok(Stmt::Labeled { label, tok, stmt })
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Stmt::ExprStmt(None))
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::ExprStmt(Some(expr)))
            }
        }
    }

    fn next_is_colon(&self) -> bool {
        self.tokens
            .get(self.pos + 1)
            .map(|t| matches!(t.kind, TokenKind::Colon))
            .unwrap_or(false)
    }

    fn parse_for_statement(&mut self) -> Result<Stmt, ParseError> {
        self.advance(); // `for`
        self.expect(TokenKind::OpenParen)?;

        if matches!(self.peek_kind(), TokenKind::Int) {
            self.advance();
            let init = self.parse_declarator_list()?;
            self.expect(TokenKind::Semicolon)?;
            let cond = self.parse_for_condition()?;
            self.expect(TokenKind::Semicolon)?;
            let post = self.parse_for_post()?;
            self.expect(TokenKind::CloseParen)?;
            let body = Box::new(self.parse_statement(false)?);
            Ok(Stmt::ForDecl {
                init,
                cond,
                post,
                body,
            })
        } else {
            let init = if matches!(self.peek_kind(), TokenKind::Semicolon) {
                None
            } else {
                Some(self.parse_expr()?)
            };
            self.expect(TokenKind::Semicolon)?;
            let cond = self.parse_for_condition()?;
            self.expect(TokenKind::Semicolon)?;
            let post = self.parse_for_post()?;
            self.expect(TokenKind::CloseParen)?;
            let body = Box::new(self.parse_statement(false)?);
            Ok(Stmt::ForExpr {
                init,
                cond,
                post,
                body,
            })
        }
    }

    /// A missing condition (`for(;;)`) is treated as the constant `1`.
    fn parse_for_condition(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek_kind(), TokenKind::Semicolon) {
            Ok(Expr::IntLiteral(1))
        } else {
            self.parse_expr()
        }
    }

    fn parse_for_post(&mut self) -> Result<Option<Expr>, ParseError> {
        if matches!(self.peek_kind(), TokenKind::CloseParen) {
            Ok(None)
        } else {
            Ok(Some(self.parse_expr()?))
        }
    }
}

fn describe_kind(kind: &TokenKind) -> &'static str {
    use TokenKind::*;
    match kind {
        OpenBrace => "'{'",
        CloseBrace => "'}'",
        OpenParen => "'('",
        CloseParen => "')'",
        Semicolon => "';'",
        Colon => "':'",
        Question => "'?'",
        Comma => "','",
        Int => "'int'",
        Void => "'void'",
        Return => "'return'",
        If => "'if'",
        Else => "'else'",
        For => "'for'",
        While => "'while'",
        Do => "'do'",
        Break => "'break'",
        Continue => "'continue'",
        Goto => "'goto'",
        Assign => "'='",
        End => "end of input",
        _ => "token",
    }
}

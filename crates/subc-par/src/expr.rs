//! Expression parsing: precedence climbing over a static binding-power
//! table, per the grammar in the parser's component design.
//!
//! The table is data, not a nested `match` cascade: each binary/ternary
//! operator's precedence and associativity is looked up once, and the
//! climbing loop is generic over that lookup. The comma operator and
//! assignment sit at the low end; `*`/`/`/`%` at the high end, matching
//! the thirteen-level table.

use crate::ast::{BinOp, Expr, IncDec, UnaryOp, VarRef};
use crate::error::ParseError;
use crate::parser::Parser;
use subc_lex::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

/// Binding powers, low to high. The ternary sits at precedence 3 between
/// assignment (2) and logical-or (4) and is handled specially in the
/// climbing loop rather than through `BinOp`, since it has three operands
/// and its own pair of delimiter tokens (`?` `:`).
const PREC_COMMA: u8 = 1;
const PREC_ASSIGN: u8 = 2;
const PREC_TERNARY: u8 = 3;
const PREC_LOGOR: u8 = 4;
const PREC_LOGAND: u8 = 5;
const PREC_BITOR: u8 = 6;
const PREC_BITXOR: u8 = 7;
const PREC_BITAND: u8 = 8;
const PREC_EQUALITY: u8 = 9;
const PREC_RELATIONAL: u8 = 10;
const PREC_SHIFT: u8 = 11;
const PREC_ADDITIVE: u8 = 12;
const PREC_MULTIPLICATIVE: u8 = 13;

/// A binary operator token, its desugared `BinOp`, precedence and
/// associativity — or, for a compound assignment, the underlying
/// operator it expands to.
struct BinOpInfo {
    op: BinOp,
    prec: u8,
    assoc: Assoc,
    /// `Some(underlying)` if this token is a compound-assignment form
    /// (`+=`, `<<=`, ...); desugaring uses `underlying` as the binary op
    /// applied to a duplicated left-hand side.
    compound_of: Option<BinOp>,
}

fn bin_op_info(kind: &TokenKind) -> Option<BinOpInfo> {
    use TokenKind::*;
    let (op, prec, assoc, compound_of) = match kind {
        Comma => (BinOp::Comma, PREC_COMMA, Assoc::Left, None),
        Assign => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, None),
        PipePipe => (BinOp::LogOr, PREC_LOGOR, Assoc::Left, None),
        AmpAmp => (BinOp::LogAnd, PREC_LOGAND, Assoc::Left, None),
        Pipe => (BinOp::BitOr, PREC_BITOR, Assoc::Left, None),
        Caret => (BinOp::BitXor, PREC_BITXOR, Assoc::Left, None),
        Amp => (BinOp::BitAnd, PREC_BITAND, Assoc::Left, None),
        EqEq => (BinOp::Eq, PREC_EQUALITY, Assoc::Left, None),
        NotEq => (BinOp::NotEq, PREC_EQUALITY, Assoc::Left, None),
        Lt => (BinOp::Lt, PREC_RELATIONAL, Assoc::Left, None),
        LtEq => (BinOp::LtEq, PREC_RELATIONAL, Assoc::Left, None),
        Gt => (BinOp::Gt, PREC_RELATIONAL, Assoc::Left, None),
        GtEq => (BinOp::GtEq, PREC_RELATIONAL, Assoc::Left, None),
        Shl => (BinOp::Shl, PREC_SHIFT, Assoc::Left, None),
        Shr => (BinOp::Shr, PREC_SHIFT, Assoc::Left, None),
        Plus => (BinOp::Add, PREC_ADDITIVE, Assoc::Left, None),
        Minus => (BinOp::Sub, PREC_ADDITIVE, Assoc::Left, None),
        Star => (BinOp::Mul, PREC_MULTIPLICATIVE, Assoc::Left, None),
        Slash => (BinOp::Div, PREC_MULTIPLICATIVE, Assoc::Left, None),
        Percent => (BinOp::Mod, PREC_MULTIPLICATIVE, Assoc::Left, None),
        PlusEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::Add)),
        MinusEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::Sub)),
        StarEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::Mul)),
        SlashEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::Div)),
        PercentEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::Mod)),
        AmpEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::BitAnd)),
        PipeEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::BitOr)),
        CaretEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::BitXor)),
        ShlEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::Shl)),
        ShrEq => (BinOp::Assign, PREC_ASSIGN, Assoc::Right, Some(BinOp::Shr)),
        _ => return None,
    };
    Some(BinOpInfo {
        op,
        prec,
        assoc,
        compound_of,
    })
}

impl<'t> Parser<'t> {
    /// Parse a full expression, comma operator allowed.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(1, true)
    }

    /// Parse an expression with the comma operator disabled, used for
    /// function-call arguments so that `,` separates arguments instead of
    /// forming a comma expression.
    pub fn parse_expr_no_comma(&mut self) -> Result<Expr, ParseError> {
        self.parse_expr_bp(PREC_ASSIGN, false)
    }

    fn parse_expr_bp(&mut self, min_prec: u8, allow_comma: bool) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_atom()?;

        loop {
            if matches!(self.peek_kind(), TokenKind::Question) && PREC_TERNARY >= min_prec {
                self.advance();
                let then_expr = self.parse_expr_bp(1, allow_comma)?;
                self.expect(TokenKind::Colon)?;
                // Ternary is right-associative at its own precedence.
                let else_expr = self.parse_expr_bp(PREC_TERNARY, allow_comma)?;
                lhs = Expr::Ternary {
                    cond: Box::new(lhs),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                };
                continue;
            }

            let Some(info) = bin_op_info(self.peek_kind()) else {
                break;
            };
            if !allow_comma && info.op == BinOp::Comma {
                break;
            }
            if info.prec < min_prec {
                break;
            }

            if info.op == BinOp::Assign {
                require_lvalue(&lhs, self.current_loc())?;
            }

            let op_tok = self.advance();
            let next_min = match info.assoc {
                Assoc::Left => info.prec + 1,
                Assoc::Right => info.prec,
            };
            let rhs = self.parse_expr_bp(next_min, allow_comma)?;
            let _ = &op_tok;

            lhs = if let Some(underlying) = info.compound_of {
                let lhs_copy = duplicate_lvalue(&lhs);
                let desugared_rhs = Expr::Binary {
                    op: underlying,
                    lhs: Box::new(lhs_copy),
                    rhs: Box::new(rhs),
                };
                Expr::Binary {
                    op: BinOp::Assign,
                    lhs: Box::new(lhs),
                    rhs: Box::new(desugared_rhs),
                }
            } else {
                Expr::Binary {
                    op: info.op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                }
            };
        }

        Ok(lhs)
    }

    /// An atom: literal, parenthesised expression, variable, call, or a
    /// unary-prefix application. Handles the suffix `++`/`--` check
    /// after parsing the primary.
    fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let primary = self.parse_prefix()?;
        self.parse_suffix(primary)
    }

    fn parse_suffix(&mut self, primary: Expr) -> Result<Expr, ParseError> {
        match self.peek_kind() {
            TokenKind::PlusPlus => {
                let operand = require_var_ref(&primary, self.current_loc())?;
                self.advance();
                Ok(Expr::PostIncDec {
                    op: IncDec::Inc,
                    operand,
                })
            }
            TokenKind::MinusMinus => {
                let operand = require_var_ref(&primary, self.current_loc())?;
                self.advance();
                Ok(Expr::PostIncDec {
                    op: IncDec::Dec,
                    operand,
                })
            }
            _ => Ok(primary),
        }
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Plus => {
                // Leading `+` is elided: no AST node is created for it.
                self.advance();
                self.parse_atom()
            }
            TokenKind::Minus => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(self.parse_atom()?),
                })
            }
            TokenKind::Tilde => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::BitNot,
                    operand: Box::new(self.parse_atom()?),
                })
            }
            TokenKind::Bang => {
                self.advance();
                Ok(Expr::Unary {
                    op: UnaryOp::LogicNot,
                    operand: Box::new(self.parse_atom()?),
                })
            }
            TokenKind::PlusPlus => {
                self.advance();
                let inner = self.parse_atom()?;
                let operand = require_var_ref(&inner, self.current_loc())?;
                Ok(Expr::PreIncDec {
                    op: IncDec::Inc,
                    operand,
                })
            }
            TokenKind::MinusMinus => {
                self.advance();
                let inner = self.parse_atom()?;
                let operand = require_var_ref(&inner, self.current_loc())?;
                Ok(Expr::PreIncDec {
                    op: IncDec::Dec,
                    operand,
                })
            }
            TokenKind::IntegerLiteral(v) => {
                self.advance();
                Ok(Expr::IntLiteral(v))
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::Identifier(name) => {
                let tok = self.advance();
                if matches!(self.peek_kind(), TokenKind::OpenParen) {
                    self.advance();
                    let args = self.parse_call_args()?;
                    self.expect(TokenKind::CloseParen)?;
                    Ok(Expr::Call {
                        callee: name,
                        tok,
                        args,
                    })
                } else {
                    Ok(Expr::Var(VarRef { name, tok }))
                }
            }
            other => Err(ParseError::unexpected(
                vec!["an expression"],
                other.describe(),
                self.current_loc(),
            )),
        }
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if matches!(self.peek_kind(), TokenKind::CloseParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr_no_comma()?);
            if self.advance_if(TokenKind::Comma).is_some() {
                continue;
            }
            break;
        }
        Ok(args)
    }
}

fn require_lvalue(expr: &Expr, loc: subc_util::SourceLoc) -> Result<(), ParseError> {
    if matches!(expr, Expr::Var(_)) {
        Ok(())
    } else {
        Err(ParseError::structural(
            "assignment to non-lvalue: left operand must be a variable",
            loc,
        ))
    }
}

fn require_var_ref(expr: &Expr, loc: subc_util::SourceLoc) -> Result<VarRef, ParseError> {
    match expr {
        Expr::Var(v) => Ok(v.clone()),
        _ => Err(ParseError::structural(
            "increment/decrement operators require an lvalue",
            loc,
        )),
    }
}

/// Build an independently-owned duplicate of a left-hand variable
/// reference, used to desugar `x OP= e` into `x = (copy(x) OP e)`.
fn duplicate_lvalue(expr: &Expr) -> Expr {
    match expr {
        Expr::Var(v) => Expr::Var(v.clone()),
        _ => unreachable!("compound-assignment left operand was checked to be a variable"),
    }
}

//! subc-par — the recursive-descent parser.
//!
//! Consumes the token sequence produced by `subc-lex` and produces an
//! immutable-after-construction [`ast::Program`]. Expression parsing uses
//! precedence climbing (see [`expr`]); statement and top-level parsing is
//! conventional recursive descent (see [`parser`]).

pub mod ast;
pub mod error;
pub mod expr;
pub mod parser;

pub use ast::Program;
pub use error::ParseError;
pub use parser::Parser;

/// Parse a complete token stream (as produced by `subc_lex::Lexer`) into
/// a program.
pub fn parse(tokens: &[subc_lex::Token]) -> Result<Program, ParseError> {
    Parser::new(tokens).parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Expr, Item, Stmt};
    use subc_lex::Lexer;

    fn parse_expr_str(src: &str) -> Expr {
        let wrapped = format!("int main(void) {{ return {}; }}", src);
        let tokens = Lexer::new(&wrapped).tokenize().unwrap();
        let program = parse(&tokens).unwrap();
        let Item::Function(f) = &program.items[0] else {
            panic!("expected function");
        };
        match &f.body.as_ref().unwrap()[0] {
            Stmt::Return { value: Some(e), .. } => e.clone(),
            _ => panic!("expected return with value"),
        }
    }

    #[test]
    fn precedence_multiplicative_over_additive() {
        // x + (y * z)
        let e = parse_expr_str("x + y * z");
        match e {
            Expr::Binary {
                op: BinOp::Add,
                rhs,
                ..
            } => assert!(matches!(*rhs, Expr::Binary { op: BinOp::Mul, .. })),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn additive_is_left_associative() {
        // (x - y) + z
        let e = parse_expr_str("x - y + z");
        match e {
            Expr::Binary {
                op: BinOp::Add,
                lhs,
                ..
            } => assert!(matches!(*lhs, Expr::Binary { op: BinOp::Sub, .. })),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn assignment_is_right_associative() {
        // x = (y = z)
        let e = parse_expr_str("x = y = z");
        match e {
            Expr::Binary {
                op: BinOp::Assign,
                rhs,
                ..
            } => assert!(matches!(*rhs, Expr::Binary { op: BinOp::Assign, .. })),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn compound_assignment_desugars() {
        // x += y  =>  x = (x + y)
        let e = parse_expr_str("x += y");
        match e {
            Expr::Binary {
                op: BinOp::Assign,
                lhs,
                rhs,
            } => {
                assert!(matches!(*lhs, Expr::Var(_)));
                match *rhs {
                    Expr::Binary {
                        op: BinOp::Add,
                        lhs: inner_lhs,
                        ..
                    } => assert!(matches!(*inner_lhs, Expr::Var(_))),
                    other => panic!("unexpected rhs shape: {:?}", other),
                }
            }
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn ternary_binds_above_assignment_below_logical_or() {
        let e = parse_expr_str("a ? b : c");
        assert!(matches!(e, Expr::Ternary { .. }));
    }

    #[test]
    fn call_arguments_disable_comma_operator() {
        let wrapped = "int f(int, int); int main(void) { return f(1, 2); }";
        let tokens = Lexer::new(wrapped).tokenize().unwrap();
        let program = parse(&tokens).unwrap();
        let Item::Function(main_fn) = &program.items[1] else {
            panic!("expected function");
        };
        match &main_fn.body.as_ref().unwrap()[0] {
            Stmt::Return {
                value: Some(Expr::Call { args, .. }),
                ..
            } => assert_eq!(args.len(), 2),
            other => panic!("unexpected shape: {:?}", other),
        }
    }

    #[test]
    fn assignment_to_non_lvalue_is_an_error() {
        let wrapped = "int main(void) { return 1 = 2; }";
        let tokens = Lexer::new(wrapped).tokenize().unwrap();
        assert!(parse(&tokens).is_err());
    }

    #[test]
    fn empty_parameter_list_is_distinct_from_void() {
        let tokens = Lexer::new("int f() { return 0; }").tokenize().unwrap();
        let program = parse(&tokens).unwrap();
        let Item::Function(f) = &program.items[0] else {
            panic!("expected function");
        };
        assert!(f.empty_parameter_declaration);

        let tokens = Lexer::new("int g(void) { return 0; }").tokenize().unwrap();
        let program = parse(&tokens).unwrap();
        let Item::Function(g) = &program.items[0] else {
            panic!("expected function");
        };
        assert!(!g.empty_parameter_declaration);
    }

    #[test]
    fn global_var_list_requires_constant_initializer() {
        let tokens = Lexer::new("int x = 1 + 2;").tokenize().unwrap();
        assert!(parse(&tokens).is_err());
    }

    #[test]
    fn disambiguates_global_var_from_function() {
        let tokens = Lexer::new("int g; int f(void) { return 0; }")
            .tokenize()
            .unwrap();
        let program = parse(&tokens).unwrap();
        assert!(matches!(program.items[0], Item::GlobalVarList(_)));
        assert!(matches!(program.items[1], Item::Function(_)));
    }
}

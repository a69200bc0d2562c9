//! subc-gen — the code generator. A single AST traversal that emits
//! AT&T-syntax x86-64 assembly text directly, with no intermediate
//! representation in between.

pub mod codegen;
pub mod error;
pub mod labels;

pub use codegen::Codegen;
pub use error::CodeGenError;

use subc_par::ast::Program;

/// Generate the complete assembly text for a program.
pub fn generate(program: &Program) -> Result<String, CodeGenError> {
    Codegen::new().generate(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use subc_lex::Lexer;
    use subc_par::parse;

    fn compile(src: &str) -> String {
        let tokens = Lexer::new(src).tokenize().expect("lex");
        let program = parse(&tokens).expect("parse");
        generate(&program).expect("codegen")
    }

    #[test]
    fn emits_prologue_and_epilogue_for_main() {
        let asm = compile("int main(void) { return 2 + 3 * 4; }");
        assert!(asm.contains(".globl main"));
        assert!(asm.contains("push %rbp"));
        assert!(asm.contains("pop %rbp"));
        assert!(asm.contains("ret"));
    }

    #[test]
    fn binary_op_evaluates_right_operand_first() {
        let asm = compile("int main(void) { return 1 - 2; }");
        // right operand generated, pushed, then left generated, then popped
        // into %ecx before the subtraction.
        let push_pos = asm.find("push %rax").unwrap();
        let sub_pos = asm.find("sub %ecx, %eax").unwrap();
        assert!(push_pos < sub_pos);
    }

    #[test]
    fn post_increment_reads_before_mutating_memory() {
        let asm = compile("int main(void) { int x = 0; return x++; }");
        let read_pos = asm.find("mov -4(%rbp), %eax").unwrap();
        let add_pos = asm.find("addl $1, -4(%rbp)").unwrap();
        assert!(read_pos < add_pos);
    }

    #[test]
    fn uninitialized_global_is_emitted_in_bss() {
        let asm = compile("int g; int main(void) { return g; }");
        assert!(asm.contains(".bss"));
        assert!(asm.contains("_var_g"));
        assert!(asm.contains(".zero 4"));
    }

    #[test]
    fn initialized_global_is_emitted_in_data() {
        let asm = compile("int g = 7; int main(void) { return g; }");
        assert!(asm.contains(".data"));
        assert!(asm.contains(".long 7"));
    }

    #[test]
    fn break_outside_loop_is_rejected() {
        let tokens = Lexer::new("int main(void) { break; return 0; }")
            .tokenize()
            .unwrap();
        let program = parse(&tokens).unwrap();
        assert!(generate(&program).is_err());
    }

    #[test]
    fn undefined_goto_label_is_rejected() {
        let tokens = Lexer::new("int main(void) { goto nope; return 0; }")
            .tokenize()
            .unwrap();
        let program = parse(&tokens).unwrap();
        assert!(generate(&program).is_err());
    }

    #[test]
    fn forward_goto_to_defined_label_compiles() {
        let asm = compile("int main(void) { goto l; l: return 0; }");
        assert!(asm.contains("_label_l"));
    }

    #[test]
    fn void_call_used_as_value_is_rejected() {
        let tokens = Lexer::new(
            "void f(void) { return; } int main(void) { return f(); }",
        )
        .tokenize()
        .unwrap();
        let program = parse(&tokens).unwrap();
        assert!(generate(&program).is_err());
    }

    #[test]
    fn void_call_as_bare_statement_is_accepted() {
        let asm = compile("void f(void) { return; } int main(void) { f(); return 0; }");
        assert!(asm.contains("call f"));
    }

    #[test]
    fn call_with_more_than_six_args_spills_to_stack() {
        let asm = compile(
            "int f(int a, int b, int c, int d, int e, int g, int h) { return a; }\n\
             int main(void) { return f(1, 2, 3, 4, 5, 6, 7); }",
        );
        assert!(asm.contains("add $8, %rsp"));
    }
}

//! The code generator: a single AST traversal emitting AT&T x86-64
//! assembly text, using the symbol table and the label/break/continue
//! machinery in [`crate::labels`]. No IR sits between the AST and the
//! emitted instructions.

use crate::error::CodeGenError;
use crate::labels::{LabelCounters, LabelSet, LabelStack};
use subc_par::ast::*;
use subc_sem::{ScopeMark, SymbolTable, VarLocation};

/// 32-bit argument registers, in System V order, for the first six
/// integer arguments.
const ARG_REGS_32: [&str; 6] = ["%edi", "%esi", "%edx", "%ecx", "%r8d", "%r9d"];

pub struct Codegen {
    out: String,
    symtab: SymbolTable,
    /// Current distance (bytes) between `%rsp` and `%rbp`; always
    /// positive, reset to 0 at each function's prologue.
    stack_index: u32,
    break_stack: LabelStack,
    continue_stack: LabelStack,
    label_set: LabelSet,
    counters: LabelCounters,
    /// Stack of the marks for every lexical scope currently open, innermost
    /// last. `Stmt::VarDeclList` declares into whichever scope is on top.
    scope_marks: Vec<ScopeMark>,
    /// Whether the function currently being generated returns `void`;
    /// `return` is checked against this.
    current_function_is_void: bool,
}

impl Codegen {
    pub fn new() -> Self {
        Self {
            out: String::new(),
            symtab: SymbolTable::new(),
            stack_index: 0,
            break_stack: LabelStack::new(),
            continue_stack: LabelStack::new(),
            label_set: LabelSet::new(),
            counters: LabelCounters::new(),
            scope_marks: Vec::new(),
            current_function_is_void: false,
        }
    }

    /// Generate the whole program, returning the complete assembly text.
    pub fn generate(mut self, program: &Program) -> Result<String, CodeGenError> {
        for item in &program.items {
            match item {
                Item::Function(f) => self.generate_function_decl(f)?,
                Item::GlobalVarList(decls) => self.generate_global_var_list(decls)?,
            }
        }
        self.generate_deferred_uninitialized_globals();
        Ok(self.out)
    }

    fn emit(&mut self, line: impl AsRef<str>) {
        self.out.push_str(line.as_ref());
        self.out.push('\n');
    }

    fn emit_label(&mut self, label: &str) {
        self.out.push_str(label);
        self.out.push_str(":\n");
    }

    // ---- top level ------------------------------------------------------

    fn generate_global_var_list(&mut self, decls: &[Declarator]) -> Result<(), CodeGenError> {
        for decl in decls {
            self.symtab.declare_global(decl)?;
            if let Some(Expr::IntLiteral(value)) = &decl.init {
                self.emit(".data");
                self.emit(format!(".globl _var_{}", decl.name));
                self.emit(".align 4");
                self.emit_label(&format!("_var_{}", decl.name));
                self.emit(format!("    .long {}", value));
            }
        }
        Ok(())
    }

    fn generate_deferred_uninitialized_globals(&mut self) {
        let mut names = self.symtab.uninitialized_globals();
        if names.is_empty() {
            return;
        }
        names.sort();
        self.emit(".bss");
        for name in names {
            self.emit(format!(".globl _var_{}", name));
            self.emit(".align 4");
            self.emit_label(&format!("_var_{}", name));
            self.emit("    .zero 4");
        }
    }

    fn generate_function_decl(&mut self, f: &FunctionDecl) -> Result<(), CodeGenError> {
        self.symtab.declare_function(f)?;
        let Some(body) = &f.body else {
            return Ok(()); // prototype only, nothing emitted
        };

        self.stack_index = 0;
        self.label_set = LabelSet::new();
        self.current_function_is_void = matches!(f.return_type, ReturnType::Void);
        debug_assert!(self.break_stack.is_empty());
        debug_assert!(self.continue_stack.is_empty());

        self.emit(".text");
        self.emit(format!(".globl {}", f.name));
        self.emit_label(&f.name);
        self.emit("    push %rbp");
        self.emit("    mov %rsp, %rbp");

        let scope = self.symtab.enter_scope();
        self.scope_marks.push(scope);
        self.spill_parameters(f)?;
        for stmt in body {
            self.generate_statement(stmt)?;
        }
        self.scope_marks.pop();
        self.symtab.exit_scope(scope);

        // Fallback return: synthesised whenever control can fall off the
        // end of the function body. Redundant after an explicit `return`
        // on every path, but harmless and always correct.
        self.emit("    mov $0, %eax");
        self.emit("    mov %rbp, %rsp");
        self.emit("    pop %rbp");
        self.emit("    ret");

        debug_assert!(self.break_stack.is_empty());
        debug_assert!(self.continue_stack.is_empty());
        self.label_set.check_all_defined()?;
        Ok(())
    }

    fn spill_parameters(&mut self, f: &FunctionDecl) -> Result<(), CodeGenError> {
        let scope = *self.scope_marks.last().expect("function scope is open");
        for (i, param) in f.params.iter().enumerate() {
            self.stack_index += 4;
            let offset = self.stack_index;
            if i < 6 {
                self.emit(format!("    mov {}, -{}(%rbp)", ARG_REGS_32[i], offset));
            } else {
                let incoming = 16 + (i - 6) * 8;
                self.emit(format!("    mov {}(%rbp), %eax", incoming));
                self.emit(format!("    mov %eax, -{}(%rbp)", offset));
            }
            self.symtab
                .declare_local(&param.name, &param.tok, offset, scope)?;
        }
        Ok(())
    }

    // ---- statements -----------------------------------------------------

    fn generate_statement(&mut self, stmt: &Stmt) -> Result<(), CodeGenError> {
        match stmt {
            Stmt::Return { value, tok } => self.generate_return(value.as_ref(), tok),
            Stmt::VarDeclList(decls) => self.generate_var_decl_list(decls),
            Stmt::ExprStmt(expr) => {
                match expr {
                    // A bare call statement is the one context where a
                    // void-returning call's result is legitimately
                    // discarded.
                    Some(Expr::Call { callee, tok, args }) => {
                        self.generate_call(callee, tok, args, false)?;
                    }
                    Some(e) => {
                        self.generate_expr(e)?;
                    }
                    None => {}
                }
                Ok(())
            }
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.generate_if(cond, then_branch, else_branch.as_deref()),
            Stmt::Block(stmts) => self.generate_block(stmts),
            Stmt::While { cond, body } => self.generate_while(cond, body),
            Stmt::DoWhile { body, cond } => self.generate_do_while(body, cond),
            Stmt::ForExpr {
                init,
                cond,
                post,
                body,
            } => self.generate_for_expr(init.as_ref(), cond, post.as_ref(), body),
            Stmt::ForDecl {
                init,
                cond,
                post,
                body,
            } => self.generate_for_decl(init, cond, post.as_ref(), body),
            Stmt::Break(tok) => {
                let Some(target) = self.break_stack.top().map(str::to_string) else {
                    return Err(CodeGenError::Semantic(
                        subc_sem::SemError::BreakOutsideLoop {
                            loc: tok.loc.clone(),
                        },
                    ));
                };
                self.emit(format!("    jmp {}", target));
                Ok(())
            }
            Stmt::Continue(tok) => {
                let Some(target) = self.continue_stack.top().map(str::to_string) else {
                    return Err(CodeGenError::Semantic(
                        subc_sem::SemError::ContinueOutsideLoop {
                            loc: tok.loc.clone(),
                        },
                    ));
                };
                self.emit(format!("    jmp {}", target));
                Ok(())
            }
            Stmt::Goto { label, tok } => {
                self.label_set.put_reference(label, tok);
                self.emit(format!("    jmp _label_{}", label));
                Ok(())
            }
            Stmt::Labeled { label, tok, stmt } => {
                self.label_set.put_definition(label, tok)?;
                self.emit_label(&format!("_label_{}", label));
                self.generate_statement(stmt)
            }
        }
    }

    fn generate_return(
        &mut self,
        value: Option<&Expr>,
        tok: &subc_lex::Token,
    ) -> Result<(), CodeGenError> {
        match (value, self.current_function_is_void) {
            (Some(_), true) => {
                return Err(CodeGenError::Semantic(
                    subc_sem::SemError::ReturnValueInVoidFunction {
                        loc: tok.loc.clone(),
                    },
                ));
            }
            (None, false) => {
                return Err(CodeGenError::Semantic(
                    subc_sem::SemError::MissingReturnValue {
                        loc: tok.loc.clone(),
                    },
                ));
            }
            _ => {}
        }
        if let Some(e) = value {
            self.generate_expr(e)?;
        } else {
            self.emit("    mov $0, %eax");
        }
        self.emit("    mov %rbp, %rsp");
        self.emit("    pop %rbp");
        self.emit("    ret");
        Ok(())
    }

    fn generate_var_decl_list(&mut self, decls: &[Declarator]) -> Result<(), CodeGenError> {
        let scope = *self
            .scope_marks
            .last()
            .expect("a variable declaration always sits inside an open scope");
        for decl in decls {
            // The initializer is generated before the symbol is declared:
            // `int x = x;` must resolve the right-hand `x` to an outer
            // binding (or fail as undeclared), never to the slot being
            // initialized.
            if let Some(init) = &decl.init {
                self.generate_expr(init)?;
            } else {
                self.emit("    mov $0, %eax");
            }
            self.stack_index += 4;
            let offset = self.stack_index;
            self.emit("    sub $4, %rsp");
            self.emit(format!("    mov %eax, -{}(%rbp)", offset));
            self.symtab
                .declare_local(&decl.name, &decl.tok, offset, scope)?;
        }
        Ok(())
    }

    fn generate_block(&mut self, stmts: &[Stmt]) -> Result<(), CodeGenError> {
        let scope = self.symtab.enter_scope();
        self.scope_marks.push(scope);
        for stmt in stmts {
            self.generate_statement(stmt)?;
        }
        self.scope_marks.pop();
        let bytes = self.symtab.exit_scope(scope);
        if bytes > 0 {
            self.emit(format!("    add ${}, %rsp", bytes));
            self.stack_index -= bytes;
        }
        Ok(())
    }

    fn generate_if(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
    ) -> Result<(), CodeGenError> {
        self.generate_expr(cond)?;
        self.emit("    cmp $0, %eax");
        if let Some(else_branch) = else_branch {
            let else_label = self.counters.next("else");
            let end_label = self.counters.next("if_else_end");
            self.emit(format!("    je {}", else_label));
            self.generate_statement(then_branch)?;
            self.emit(format!("    jmp {}", end_label));
            self.emit_label(&else_label);
            self.generate_statement(else_branch)?;
            self.emit_label(&end_label);
        } else {
            let end_label = self.counters.next("if_end");
            self.emit(format!("    je {}", end_label));
            self.generate_statement(then_branch)?;
            self.emit_label(&end_label);
        }
        Ok(())
    }

    fn generate_while(&mut self, cond: &Expr, body: &Stmt) -> Result<(), CodeGenError> {
        let start = self.counters.next("while_start");
        let end = self.counters.next("while_end");
        self.emit_label(&start);
        self.generate_expr(cond)?;
        self.emit("    cmp $0, %eax");
        self.emit(format!("    je {}", end));
        self.break_stack.push(end.clone());
        self.continue_stack.push(start.clone());
        self.generate_statement(body)?;
        self.break_stack.pop();
        self.continue_stack.pop();
        self.emit(format!("    jmp {}", start));
        self.emit_label(&end);
        Ok(())
    }

    fn generate_do_while(&mut self, body: &Stmt, cond: &Expr) -> Result<(), CodeGenError> {
        let start = self.counters.next("do_start");
        let cond_label = self.counters.next("do_cond");
        let end = self.counters.next("do_end");
        self.emit_label(&start);
        self.break_stack.push(end.clone());
        self.continue_stack.push(cond_label.clone());
        self.generate_statement(body)?;
        self.break_stack.pop();
        self.continue_stack.pop();
        self.emit_label(&cond_label);
        self.generate_expr(cond)?;
        self.emit("    cmp $0, %eax");
        self.emit(format!("    jne {}", start));
        self.emit_label(&end);
        Ok(())
    }

    fn generate_for_expr(
        &mut self,
        init: Option<&Expr>,
        cond: &Expr,
        post: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), CodeGenError> {
        if let Some(init) = init {
            self.generate_expr(init)?;
        }
        self.generate_for_skeleton(cond, post, body)
    }

    fn generate_for_decl(
        &mut self,
        init: &[Declarator],
        cond: &Expr,
        post: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), CodeGenError> {
        let scope = self.symtab.enter_scope();
        self.scope_marks.push(scope);
        self.generate_var_decl_list(init)?;
        self.generate_for_skeleton(cond, post, body)?;
        self.scope_marks.pop();
        let bytes = self.symtab.exit_scope(scope);
        if bytes > 0 {
            self.emit(format!("    add ${}, %rsp", bytes));
            self.stack_index -= bytes;
        }
        Ok(())
    }

    fn generate_for_skeleton(
        &mut self,
        cond: &Expr,
        post: Option<&Expr>,
        body: &Stmt,
    ) -> Result<(), CodeGenError> {
        let cond_label = self.counters.next("for_cond");
        let epilogue = self.counters.next("for_epilogue");
        let end = self.counters.next("for_end");

        self.emit_label(&cond_label);
        self.generate_expr(cond)?;
        self.emit("    cmp $0, %eax");
        self.emit(format!("    je {}", end));
        self.break_stack.push(end.clone());
        self.continue_stack.push(epilogue.clone());
        self.generate_statement(body)?;
        self.break_stack.pop();
        self.continue_stack.pop();
        self.emit_label(&epilogue);
        if let Some(post) = post {
            self.generate_expr(post)?;
        }
        self.emit(format!("    jmp {}", cond_label));
        self.emit_label(&end);
        Ok(())
    }

    // ---- expressions ----------------------------------------------------

    fn render_location(loc: &VarLocation) -> String {
        match loc {
            VarLocation::Local(offset) => format!("-{}(%rbp)", offset),
            VarLocation::Global(name) => format!("{}(%rip)", name),
        }
    }

    fn generate_expr(&mut self, expr: &Expr) -> Result<(), CodeGenError> {
        match expr {
            Expr::IntLiteral(v) => {
                self.emit(format!("    mov ${}, %eax", v));
                Ok(())
            }
            Expr::Var(v) => {
                let loc = self.symtab.lookup_variable(&v.name, &v.tok)?;
                self.emit(format!("    mov {}, %eax", Self::render_location(&loc)));
                Ok(())
            }
            Expr::Unary { op, operand } => self.generate_unary(*op, operand),
            Expr::PreIncDec { op, operand } => self.generate_pre_inc_dec(*op, operand),
            Expr::PostIncDec { op, operand } => self.generate_post_inc_dec(*op, operand),
            Expr::Binary { op, lhs, rhs } => self.generate_binary(*op, lhs, rhs),
            Expr::Ternary {
                cond,
                then_expr,
                else_expr,
            } => self.generate_ternary(cond, then_expr, else_expr),
            Expr::Call { callee, tok, args } => self.generate_call(callee, tok, args, true),
        }
    }

    fn generate_unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<(), CodeGenError> {
        self.generate_expr(operand)?;
        match op {
            UnaryOp::Neg => self.emit("    neg %eax"),
            UnaryOp::BitNot => self.emit("    not %eax"),
            UnaryOp::LogicNot => {
                self.emit("    cmp $0, %eax");
                self.emit("    mov $0, %eax");
                self.emit("    sete %al");
            }
        }
        Ok(())
    }

    fn generate_pre_inc_dec(&mut self, op: IncDec, operand: &VarRef) -> Result<(), CodeGenError> {
        let loc = self.symtab.lookup_variable(&operand.name, &operand.tok)?;
        let operand_str = Self::render_location(&loc);
        self.emit(format!("    mov {}, %eax", operand_str));
        match op {
            IncDec::Inc => self.emit("    add $1, %eax"),
            IncDec::Dec => self.emit("    sub $1, %eax"),
        }
        self.emit(format!("    mov %eax, {}", operand_str));
        Ok(())
    }

    fn generate_post_inc_dec(&mut self, op: IncDec, operand: &VarRef) -> Result<(), CodeGenError> {
        let loc = self.symtab.lookup_variable(&operand.name, &operand.tok)?;
        let operand_str = Self::render_location(&loc);
        // Pre-modification value into %eax first: that's this
        // expression's value, distinguishing it from the prefix form.
        self.emit(format!("    mov {}, %eax", operand_str));
        match op {
            IncDec::Inc => self.emit(format!("    addl $1, {}", operand_str)),
            IncDec::Dec => self.emit(format!("    subl $1, {}", operand_str)),
        }
        Ok(())
    }

    fn generate_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr) -> Result<(), CodeGenError> {
        match op {
            BinOp::Assign => {
                let Expr::Var(v) = lhs else {
                    unreachable!("parser guarantees the left operand of = is a variable");
                };
                self.generate_expr(rhs)?;
                let loc = self.symtab.lookup_variable(&v.name, &v.tok)?;
                self.emit(format!("    mov %eax, {}", Self::render_location(&loc)));
                Ok(())
            }
            BinOp::LogAnd => self.generate_short_circuit(true, lhs, rhs),
            BinOp::LogOr => self.generate_short_circuit(false, lhs, rhs),
            BinOp::Comma => {
                self.generate_expr(lhs)?;
                self.generate_expr(rhs)
            }
            _ => {
                self.generate_expr(rhs)?;
                self.emit("    push %rax");
                self.generate_expr(lhs)?;
                self.emit("    pop %rcx");
                match op {
                    BinOp::Add => self.emit("    add %ecx, %eax"),
                    BinOp::Sub => self.emit("    sub %ecx, %eax"),
                    BinOp::Mul => self.emit("    imul %ecx, %eax"),
                    BinOp::BitAnd => self.emit("    and %ecx, %eax"),
                    BinOp::BitOr => self.emit("    or %ecx, %eax"),
                    BinOp::BitXor => self.emit("    xor %ecx, %eax"),
                    BinOp::Div => {
                        self.emit("    cdq");
                        self.emit("    idiv %ecx");
                    }
                    BinOp::Mod => {
                        self.emit("    cdq");
                        self.emit("    idiv %ecx");
                        self.emit("    mov %edx, %eax");
                    }
                    BinOp::Shl => self.emit("    shl %cl, %eax"),
                    BinOp::Shr => self.emit("    shr %cl, %eax"),
                    BinOp::Eq => self.generate_comparison("sete"),
                    BinOp::NotEq => self.generate_comparison("setne"),
                    BinOp::Lt => self.generate_comparison("setl"),
                    BinOp::LtEq => self.generate_comparison("setle"),
                    BinOp::Gt => self.generate_comparison("setg"),
                    BinOp::GtEq => self.generate_comparison("setge"),
                    BinOp::Assign | BinOp::LogAnd | BinOp::LogOr | BinOp::Comma => {
                        unreachable!("handled above")
                    }
                }
                Ok(())
            }
        }
    }

    fn generate_comparison(&mut self, setcc: &str) {
        self.emit("    cmp %ecx, %eax");
        self.emit("    mov $0, %eax");
        self.emit(format!("    {} %al", setcc));
    }

    fn generate_short_circuit(
        &mut self,
        is_and: bool,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<(), CodeGenError> {
        let skip = self
            .counters
            .next(if is_and { "and_skip" } else { "or_skip" });
        self.generate_expr(lhs)?;
        self.emit("    cmp $0, %eax");
        if is_and {
            self.emit(format!("    je {}", skip));
        } else {
            self.emit(format!("    jne {}", skip));
        }
        self.generate_expr(rhs)?;
        self.emit("    cmp $0, %eax");
        self.emit_label(&skip);
        self.emit("    mov $0, %eax");
        self.emit("    setne %al");
        Ok(())
    }

    fn generate_ternary(
        &mut self,
        cond: &Expr,
        then_expr: &Expr,
        else_expr: &Expr,
    ) -> Result<(), CodeGenError> {
        let else_label = self.counters.next("ternary_else");
        let end_label = self.counters.next("ternary_end");
        self.generate_expr(cond)?;
        self.emit("    cmp $0, %eax");
        self.emit(format!("    je {}", else_label));
        self.generate_expr(then_expr)?;
        self.emit(format!("    jmp {}", end_label));
        self.emit_label(&else_label);
        self.generate_expr(else_expr)?;
        self.emit_label(&end_label);
        Ok(())
    }

    fn generate_call(
        &mut self,
        callee: &str,
        tok: &subc_lex::Token,
        args: &[Expr],
        needs_value: bool,
    ) -> Result<(), CodeGenError> {
        let is_void = self.symtab.lookup_call(callee, tok, args.len())?;
        if is_void && needs_value {
            return Err(CodeGenError::Semantic(
                subc_sem::SemError::VoidUsedAsValue {
                    loc: tok.loc.clone(),
                },
            ));
        }

        for arg in args.iter().rev() {
            self.generate_expr(arg)?;
            self.emit("    push %rax");
        }
        let register_args = args.len().min(6);
        for i in 0..register_args {
            self.emit("    pop %rax");
            self.emit(format!("    mov %eax, {}", ARG_REGS_32[i]));
        }
        self.emit(format!("    call {}", callee));
        let stack_args = args.len().saturating_sub(6);
        if stack_args > 0 {
            self.emit(format!("    add ${}, %rsp", stack_args * 8));
        }
        Ok(())
    }
}

impl Default for Codegen {
    fn default() -> Self {
        Self::new()
    }
}

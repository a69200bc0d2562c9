//! Graphviz dot-format AST pretty-printer, used by `--tree`.
//!
//! Output shape: `digraph AST { n<ID> [label="..."]; n<PARENT> -> n<CHILD>; }`

use subc_par::ast::*;

struct DotPrinter {
    next_id: u32,
    lines: Vec<String>,
}

impl DotPrinter {
    fn new() -> Self {
        Self {
            next_id: 0,
            lines: Vec::new(),
        }
    }

    fn node(&mut self, label: &str) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.lines
            .push(format!("  n{} [label=\"{}\"];", id, escape(label)));
        id
    }

    fn edge(&mut self, parent: u32, child: u32) {
        self.lines.push(format!("  n{} -> n{};", parent, child));
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn print_dot(program: &Program) -> String {
    let mut p = DotPrinter::new();
    let root = p.node("Program");
    for item in &program.items {
        let id = print_item(&mut p, item);
        p.edge(root, id);
    }
    format!("digraph AST {{\n{}\n}}\n", p.lines.join("\n"))
}

fn print_item(p: &mut DotPrinter, item: &Item) -> u32 {
    match item {
        Item::Function(f) => print_function(p, f),
        Item::GlobalVarList(decls) => {
            let id = p.node("GlobalVarList");
            for d in decls {
                let child = print_declarator(p, d);
                p.edge(id, child);
            }
            id
        }
    }
}

fn print_function(p: &mut DotPrinter, f: &FunctionDecl) -> u32 {
    let return_type = match f.return_type {
        ReturnType::Int => "int",
        ReturnType::Void => "void",
    };
    let id = p.node(&format!("Function {} {}", return_type, f.name));
    for param in &f.params {
        let child = p.node(&format!("Param {}", param.name));
        p.edge(id, child);
    }
    if let Some(body) = &f.body {
        for stmt in body {
            let child = print_stmt(p, stmt);
            p.edge(id, child);
        }
    }
    id
}

fn print_declarator(p: &mut DotPrinter, d: &Declarator) -> u32 {
    let id = p.node(&format!("Declarator {}", d.name));
    if let Some(init) = &d.init {
        let child = print_expr(p, init);
        p.edge(id, child);
    }
    id
}

fn print_stmt(p: &mut DotPrinter, stmt: &Stmt) -> u32 {
    match stmt {
        Stmt::Return { value, .. } => {
            let id = p.node("Return");
            if let Some(v) = value {
                let child = print_expr(p, v);
                p.edge(id, child);
            }
            id
        }
        Stmt::VarDeclList(decls) => {
            let id = p.node("VarDeclList");
            for d in decls {
                let child = print_declarator(p, d);
                p.edge(id, child);
            }
            id
        }
        Stmt::ExprStmt(expr) => {
            let id = p.node("ExprStmt");
            if let Some(e) = expr {
                let child = print_expr(p, e);
                p.edge(id, child);
            }
            id
        }
        Stmt::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let id = p.node("If");
            let c = print_expr(p, cond);
            p.edge(id, c);
            let t = print_stmt(p, then_branch);
            p.edge(id, t);
            if let Some(e) = else_branch {
                let e = print_stmt(p, e);
                p.edge(id, e);
            }
            id
        }
        Stmt::Block(stmts) => {
            let id = p.node("Block");
            for s in stmts {
                let child = print_stmt(p, s);
                p.edge(id, child);
            }
            id
        }
        Stmt::While { cond, body } => {
            let id = p.node("While");
            let c = print_expr(p, cond);
            p.edge(id, c);
            let b = print_stmt(p, body);
            p.edge(id, b);
            id
        }
        Stmt::DoWhile { body, cond } => {
            let id = p.node("DoWhile");
            let b = print_stmt(p, body);
            p.edge(id, b);
            let c = print_expr(p, cond);
            p.edge(id, c);
            id
        }
        Stmt::ForExpr {
            init,
            cond,
            post,
            body,
        } => {
            let id = p.node("ForExpr");
            if let Some(init) = init {
                let child = print_expr(p, init);
                p.edge(id, child);
            }
            let c = print_expr(p, cond);
            p.edge(id, c);
            if let Some(post) = post {
                let child = print_expr(p, post);
                p.edge(id, child);
            }
            let b = print_stmt(p, body);
            p.edge(id, b);
            id
        }
        Stmt::ForDecl {
            init,
            cond,
            post,
            body,
        } => {
            let id = p.node("ForDecl");
            for d in init {
                let child = print_declarator(p, d);
                p.edge(id, child);
            }
            let c = print_expr(p, cond);
            p.edge(id, c);
            if let Some(post) = post {
                let child = print_expr(p, post);
                p.edge(id, child);
            }
            let b = print_stmt(p, body);
            p.edge(id, b);
            id
        }
        Stmt::Break(_) => p.node("Break"),
        Stmt::Continue(_) => p.node("Continue"),
        Stmt::Goto { label, .. } => p.node(&format!("Goto {}", label)),
        Stmt::Labeled { label, stmt, .. } => {
            let id = p.node(&format!("Labeled {}", label));
            let child = print_stmt(p, stmt);
            p.edge(id, child);
            id
        }
    }
}

fn print_expr(p: &mut DotPrinter, expr: &Expr) -> u32 {
    match expr {
        Expr::IntLiteral(v) => p.node(&format!("IntLiteral {}", v)),
        Expr::Var(v) => p.node(&format!("Var {}", v.name)),
        Expr::Unary { op, operand } => {
            let id = p.node(&format!("Unary {:?}", op));
            let child = print_expr(p, operand);
            p.edge(id, child);
            id
        }
        Expr::PreIncDec { op, operand } => p.node(&format!("PreIncDec {:?} {}", op, operand.name)),
        Expr::PostIncDec { op, operand } => {
            p.node(&format!("PostIncDec {:?} {}", op, operand.name))
        }
        Expr::Binary { op, lhs, rhs } => {
            let id = p.node(&format!("Binary {:?}", op));
            let l = print_expr(p, lhs);
            p.edge(id, l);
            let r = print_expr(p, rhs);
            p.edge(id, r);
            id
        }
        Expr::Ternary {
            cond,
            then_expr,
            else_expr,
        } => {
            let id = p.node("Ternary");
            let c = print_expr(p, cond);
            p.edge(id, c);
            let t = print_expr(p, then_expr);
            p.edge(id, t);
            let e = print_expr(p, else_expr);
            p.edge(id, e);
            id
        }
        Expr::Call { callee, args, .. } => {
            let id = p.node(&format!("Call {}", callee));
            for arg in args {
                let child = print_expr(p, arg);
                p.edge(id, child);
            }
            id
        }
    }
}

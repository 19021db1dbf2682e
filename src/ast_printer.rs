//! Fully parenthesized prefix rendering of the AST, used to check parser
//! output and by the `--ast` debug dump.

use crate::ast::{Expr, Stmt};

pub fn print(expr: &Expr) -> String {
    match expr {
        Expr::Binary(binary) => {
            parenthesize(&binary.operator.lexeme, &[&binary.left, &binary.right])
        }
        Expr::Grouping(inner) => parenthesize("group", &[inner.as_ref()]),
        Expr::Literal(literal) => literal.to_string(),
        Expr::Unary(unary) => parenthesize(&unary.operator.lexeme, &[&unary.right]),
        Expr::Ternary(ternary) => parenthesize(
            "?:",
            &[
                &ternary.condition,
                &ternary.then_branch,
                &ternary.else_branch,
            ],
        ),
        Expr::Variable(name) => name.lexeme.clone(),
    }
}

pub fn print_stmt(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Print(expr) => parenthesize("print", &[expr]),
        Stmt::ExprStmt(expr) => parenthesize(";", &[expr]),
        Stmt::VarDecl { name, init } => match init {
            Some(init) => parenthesize(&format!("var {}", name.lexeme), &[init]),
            None => format!("(var {})", name.lexeme),
        },
    }
}

fn parenthesize(name: &str, exprs: &[&Expr]) -> String {
    let mut out = format!("({name}");
    for expr in exprs {
        out.push(' ');
        out.push_str(&print(expr));
    }
    out.push(')');
    out
}

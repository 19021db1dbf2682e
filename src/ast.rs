use std::fmt;

use crate::scanner::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Print(Expr),
    ExprStmt(Expr),
    VarDecl { name: Token, init: Option<Expr> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary(Box<BinaryExpr>),
    Grouping(Box<Expr>),
    Literal(LiteralExpr),
    Unary(Box<UnaryExpr>),
    Ternary(Box<TernaryExpr>),
    Variable(Token),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralExpr {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: Token,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Expr,
    pub operator: Token,
    pub right: Expr,
}

/// `condition ? then_branch : else_branch`
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpr {
    pub condition: Expr,
    pub question: Token,
    pub then_branch: Expr,
    pub colon: Token,
    pub else_branch: Expr,
}

/// Integral numbers keep one fractional digit so `2` reads as `2.0`.
///
/// Non-finite values fall through to Rust's own formatting: a literal too
/// large for `f64` prints as `inf`, and `inf - inf` prints as `NaN`.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 {
        format!("{n:.1}")
    } else {
        format!("{n}")
    }
}

impl fmt::Display for LiteralExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralExpr::Nil => write!(f, "nil"),
            LiteralExpr::Boolean(b) => write!(f, "{b}"),
            LiteralExpr::Number(n) => f.write_str(&format_number(*n)),
            LiteralExpr::String(s) => write!(f, "{s}"),
        }
    }
}

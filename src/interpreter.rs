use std::{fmt, io::Write};
use tracing::{debug, trace};

use crate::{
    ast::{format_number, BinaryExpr, Expr, LiteralExpr, Stmt, TernaryExpr, UnaryExpr},
    error::{Error, RuntimeError, RuntimeErrorKind},
    scanner::{Token, TokenKind},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Nil,
    Boolean(bool),
}

impl Value {
    fn into_number(self, operator: &Token) -> Result<f64, RuntimeError> {
        if let Value::Number(n) = self {
            Ok(n)
        } else {
            Err(RuntimeError::type_error(
                operator,
                format!(
                    "operand {} of '{}' is not a number",
                    self.describe(),
                    operator.lexeme
                ),
            ))
        }
    }

    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
        }
    }

    // Like `Display`, but quotes strings so they stand out in messages.
    fn describe(&self) -> String {
        match self {
            Value::String(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            Value::String(s) => write!(f, "{s}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Nil => write!(f, "nil"),
        }
    }
}

pub type EvaluationResult = Result<Value, RuntimeError>;

pub trait Evaluate {
    fn evaluate(&self) -> EvaluationResult;
}

impl Evaluate for Expr {
    fn evaluate(&self) -> EvaluationResult {
        match self {
            Expr::Literal(l) => l.evaluate(),
            Expr::Unary(u) => u.evaluate(),
            Expr::Binary(b) => b.evaluate(),
            Expr::Grouping(g) => g.evaluate(),
            Expr::Ternary(t) => t.evaluate(),
            // Variables are not bound anywhere yet.
            Expr::Variable(_) => Ok(Value::Nil),
        }
    }
}

impl Evaluate for LiteralExpr {
    fn evaluate(&self) -> EvaluationResult {
        Ok(match self {
            LiteralExpr::Boolean(b) => Value::Boolean(*b),
            LiteralExpr::Number(n) => Value::Number(*n),
            LiteralExpr::String(s) => Value::String(s.clone()),
            LiteralExpr::Nil => Value::Nil,
        })
    }
}

impl Evaluate for UnaryExpr {
    fn evaluate(&self) -> EvaluationResult {
        let right = self.right.evaluate()?;
        match self.operator.kind {
            TokenKind::Minus => right.into_number(&self.operator).map(|n| Value::Number(-n)),
            TokenKind::Bang => Ok(Value::Boolean(!right.is_truthy())),
            _ => unreachable!("parser only builds unary '-' and '!'"),
        }
    }
}

impl Evaluate for BinaryExpr {
    fn evaluate(&self) -> EvaluationResult {
        let left = self.left.evaluate()?;
        let right = self.right.evaluate()?;
        let operator = &self.operator;

        match operator.kind {
            TokenKind::Plus => match (left, right) {
                (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
                (Value::String(mut l), Value::String(r)) => {
                    l.push_str(&r);
                    Ok(Value::String(l))
                }
                (l, r) => Err(RuntimeError::type_error(
                    operator,
                    format!(
                        "operands of '+' must be two numbers or two strings, got {} and {}",
                        l.type_name(),
                        r.type_name()
                    ),
                )),
            },
            TokenKind::EqualEqual => Ok(Value::Boolean(left == right)),
            TokenKind::BangEqual => Ok(Value::Boolean(left != right)),
            _ => {
                let l = left.into_number(operator)?;
                let r = right.into_number(operator)?;
                numeric(operator, l, r)
            }
        }
    }
}

fn numeric(operator: &Token, l: f64, r: f64) -> EvaluationResult {
    Ok(match operator.kind {
        TokenKind::Minus => Value::Number(l - r),
        TokenKind::Star => Value::Number(l * r),
        TokenKind::Slash if r == 0.0 => {
            return Err(RuntimeError {
                line: operator.line,
                kind: RuntimeErrorKind::DivideByZero,
            })
        }
        TokenKind::Slash => Value::Number(l / r),
        TokenKind::Greater => Value::Boolean(l > r),
        TokenKind::GreaterEqual => Value::Boolean(l >= r),
        TokenKind::Less => Value::Boolean(l < r),
        TokenKind::LessEqual => Value::Boolean(l <= r),
        _ => unreachable!("parser never builds a binary '{}'", operator.lexeme),
    })
}

impl Evaluate for TernaryExpr {
    fn evaluate(&self) -> EvaluationResult {
        if self.condition.evaluate()?.is_truthy() {
            self.then_branch.evaluate()
        } else {
            self.else_branch.evaluate()
        }
    }
}

/// Executes statements in order, writing program output to `out`.
///
/// In interactive mode the value of every expression statement that is not
/// `nil` is echoed, like a REPL would.
pub struct Interpreter<W: Write> {
    out: W,
    interactive: bool,
}

impl<W: Write> Interpreter<W> {
    pub fn new(out: W, interactive: bool) -> Self {
        Self { out, interactive }
    }

    /// Stops at the first failing statement. Output from the statements
    /// before it has already been written.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), Error> {
        for statement in statements {
            self.execute(statement)?;
        }
        debug!(count = statements.len(), "executed statements");
        Ok(())
    }

    pub fn execute(&mut self, statement: &Stmt) -> Result<(), Error> {
        trace!(?statement, "executing");
        match statement {
            Stmt::Print(expr) => {
                let value = expr.evaluate()?;
                writeln!(self.out, "{value}")?;
            }
            Stmt::ExprStmt(expr) => {
                let value = expr.evaluate()?;
                if self.interactive && value != Value::Nil {
                    writeln!(self.out, "{value}")?;
                }
            }
            Stmt::VarDecl { name, init } => {
                if let Some(init) = init {
                    init.evaluate()?;
                }
                debug!(name = %name.lexeme, "variable declarations do not bind yet");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::Parser, scanner::Scanner};
    use pretty_assertions::assert_eq;

    fn expression(source: &str) -> Expr {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        Parser::new(tokens).expression().unwrap()
    }

    fn evaluate(source: &str) -> EvaluationResult {
        expression(source).evaluate()
    }

    fn run(source: &str, interactive: bool) -> (String, Result<(), Error>) {
        let tokens = Scanner::new(source).scan_tokens().unwrap();
        let statements = Parser::new(tokens).parse().unwrap();
        let mut out = Vec::new();
        let result = Interpreter::new(&mut out, interactive).interpret(&statements);
        (String::from_utf8(out).unwrap(), result)
    }

    #[test]
    fn truthy_comparisons() {
        for source in ["3 >= 3", "2 > 1", "1 < 2", "3 <= 4", "1 == 1", "2 != 1"] {
            assert_eq!(evaluate(source), Ok(Value::Boolean(true)), "{source}");
        }
        for source in ["3 > 3", "1 >= 2", "2 < 1", "4 <= 3", "1 == 2", "1 != 1"] {
            assert_eq!(evaluate(source), Ok(Value::Boolean(false)), "{source}");
        }
    }

    #[test]
    fn arithmetic() {
        for (source, expected) in [("3 + 3", 6.0), ("5 - 3", 2.0), ("6 / 2", 3.0), ("2 * 3", 6.0)] {
            assert_eq!(evaluate(source), Ok(Value::Number(expected)), "{source}");
        }
        assert_eq!(evaluate("(1 + 2) * -3"), Ok(Value::Number(-9.0)));
    }

    #[test]
    fn unary() {
        assert_eq!(evaluate("!true"), Ok(Value::Boolean(false)));
        assert_eq!(evaluate("-3"), Ok(Value::Number(-3.0)));
        assert_eq!(evaluate("!nil"), Ok(Value::Boolean(true)));
        assert_eq!(evaluate("!\"\""), Ok(Value::Boolean(false)));
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(Value::Boolean(true).is_truthy());
        assert!(Value::Number(0.0).is_truthy());
        assert!(Value::String(String::new()).is_truthy());
    }

    #[test]
    fn plus_is_overloaded() {
        assert_eq!(
            evaluate(r#""foo" + "bar""#),
            Ok(Value::String("foobar".into()))
        );
        assert_eq!(evaluate("1 + 2"), Ok(Value::Number(3.0)));

        let error = evaluate(r#"1 + "2""#).unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Line 1] Error: operands of '+' must be two numbers or two strings, got number and string"
        );
        assert!(matches!(error.kind, RuntimeErrorKind::TypeError(_)));
    }

    #[test]
    fn numeric_operators_reject_other_types() {
        let error = evaluate("-\"abc\"").unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Line 1] Error: operand \"abc\" of '-' is not a number"
        );
        let error = evaluate("1 <\n nil").unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Line 1] Error: operand nil of '<' is not a number"
        );
        let error = evaluate("true * 2").unwrap_err();
        assert_eq!(error.kind, RuntimeErrorKind::TypeError("operand true of '*' is not a number".into()));

        for (source, expected) in [
            ("\"a\" - 1", "operand \"a\" of '-' is not a number"),
            ("1 > nil", "operand nil of '>' is not a number"),
            ("false >= 1", "operand false of '>=' is not a number"),
            ("2 <= \"3\"", "operand \"3\" of '<=' is not a number"),
            ("nil / 2", "operand nil of '/' is not a number"),
        ] {
            assert_eq!(
                evaluate(source).unwrap_err().kind,
                RuntimeErrorKind::TypeError(expected.into()),
                "{source}"
            );
        }
    }

    #[test]
    fn division_by_zero() {
        let error = evaluate("1 / 0").unwrap_err();
        assert_eq!(error.kind, RuntimeErrorKind::DivideByZero);
        assert_eq!(error.to_string(), "[Line 1] Error: division by zero");
        assert_eq!(evaluate("0 / 0").unwrap_err().kind, RuntimeErrorKind::DivideByZero);
        assert_eq!(evaluate("1 / -0").unwrap_err().kind, RuntimeErrorKind::DivideByZero);
        // The type check comes first.
        assert!(matches!(
            evaluate("\"a\" / 0").unwrap_err().kind,
            RuntimeErrorKind::TypeError(_)
        ));
    }

    #[test]
    fn equality_never_coerces() {
        assert_eq!(evaluate(r#"1 == "1""#), Ok(Value::Boolean(false)));
        assert_eq!(evaluate(r#"1 != "1""#), Ok(Value::Boolean(true)));
        assert_eq!(evaluate("nil == nil"), Ok(Value::Boolean(true)));
        assert_eq!(evaluate("nil == false"), Ok(Value::Boolean(false)));
        assert_eq!(evaluate(r#""a" == "a""#), Ok(Value::Boolean(true)));
        assert_eq!(evaluate("0 == false"), Ok(Value::Boolean(false)));
    }

    #[test]
    fn ternary() {
        for (source, expected) in [
            ("2.0 > 1.0 ? 2.0 : 1.0", Value::Number(2.0)),
            ("1.0 > 2.0 ? 2.0 : 1.0", Value::Number(1.0)),
            ("1.0 == 1.0 ? true : false", Value::Boolean(true)),
            ("1.0 == 2.0 ? true : false", Value::Boolean(false)),
            ("0 ? \"zero is truthy\" : \"no\"", Value::String("zero is truthy".into())),
        ] {
            assert_eq!(evaluate(source), Ok(expected), "{source}");
        }
    }

    #[test]
    fn ternary_skips_the_untaken_branch() {
        assert_eq!(evaluate("true ? 1 : 1 / 0"), Ok(Value::Number(1.0)));
        assert_eq!(evaluate("nil ? -\"x\" : 2"), Ok(Value::Number(2.0)));
    }

    #[test]
    fn variables_are_nil() {
        assert_eq!(evaluate("undefined"), Ok(Value::Nil));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Number(6.0).to_string(), "6.0");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
        assert_eq!(Value::String("text".into()).to_string(), "text");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn print_statements_write_values() {
        let (out, result) = run("print 1 + 2; print \"a\" + \"b\"; print nil; print 1 < 2;", false);
        assert!(result.is_ok());
        assert_eq!(out, "3.0\nab\nnil\ntrue\n");
    }

    #[test]
    fn expression_statements_echo_only_when_interactive() {
        let (out, _) = run("1 + 2; nil; \"x\";", false);
        assert_eq!(out, "");
        let (out, _) = run("1 + 2; nil; \"x\";", true);
        assert_eq!(out, "3.0\nx\n");
    }

    #[test]
    fn failure_keeps_earlier_output() {
        let (out, result) = run("print 1;\nprint -nil;\nprint 3;", false);
        assert_eq!(out, "1.0\n");
        let error = match result {
            Err(Error::Runtime(error)) => error,
            other => panic!("expected a runtime error, got {other:?}"),
        };
        assert_eq!(error.line, 2);
    }

    #[test]
    fn var_declarations_evaluate_their_initializer() {
        let tokens = Scanner::new("var a = 1 / 0;").scan_tokens().unwrap();
        let statement = Parser::new(tokens).declaration().unwrap();
        let mut out = Vec::new();
        let result = Interpreter::new(&mut out, true).execute(&statement);
        assert!(matches!(result, Err(Error::Runtime(_))));
        assert!(out.is_empty());
    }
}

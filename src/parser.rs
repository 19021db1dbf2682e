use crate::{
    ast::{BinaryExpr, Expr, LiteralExpr, Stmt, TernaryExpr, UnaryExpr},
    error::{Location, SyntaxError, SyntaxErrorKind},
    scanner::{Literal, Token, TokenKind},
};

use std::iter::Peekable;
use tracing::debug;

/// Recursive-descent parser over a token stream that ends in `Eof`.
///
/// The first syntax error aborts the whole parse; there is no recovery.
pub struct Parser<I>
where
    I: Iterator<Item = Token>,
{
    tokens: Peekable<I>,
    line: usize,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: impl IntoIterator<IntoIter = I>) -> Self {
        Parser {
            tokens: tokens.into_iter().peekable(),
            line: 1,
        }
    }

    pub fn parse(&mut self) -> Result<Vec<Stmt>, SyntaxError> {
        let mut statements = vec![];

        while !self.is_at_end() {
            statements.push(self.statement()?)
        }
        debug!(count = statements.len(), "parsed statements");
        Ok(statements)
    }

    /// Parses a declaration. `parse` does not dispatch here yet, so a program
    /// containing `var` is rejected until variables are supported.
    pub fn declaration(&mut self) -> Result<Stmt, SyntaxError> {
        if self.advance_on_match(&[TokenKind::Var]).is_some() {
            self.var_decl()
        } else {
            self.statement()
        }
    }

    fn var_decl(&mut self) -> Result<Stmt, SyntaxError> {
        let name = self.ensure_next_token(TokenKind::Identifier, "Expect variable name.")?;
        let init = if self.advance_on_match(&[TokenKind::Equal]).is_some() {
            Some(self.expression()?)
        } else {
            None
        };

        self.ensure_next_token(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::VarDecl { name, init })
    }

    fn statement(&mut self) -> Result<Stmt, SyntaxError> {
        if self.advance_on_match(&[TokenKind::Print]).is_some() {
            let value = self.expression()?;
            self.ensure_next_token(TokenKind::Semicolon, "Expect ';' after value.")?;
            Ok(Stmt::Print(value))
        } else {
            let expr = self.expression()?;
            self.ensure_next_token(TokenKind::Semicolon, "Expect ';' after expression.")?;
            Ok(Stmt::ExprStmt(expr))
        }
    }

    pub fn expression(&mut self) -> Result<Expr, SyntaxError> {
        self.ternary()
    }

    fn ternary(&mut self) -> Result<Expr, SyntaxError> {
        let condition = self.equality()?;

        let Some(question) = self.advance_on_match(&[TokenKind::Question]) else {
            return Ok(condition);
        };
        let then_branch = self.expression()?;
        let colon = self.ensure_next_token(
            TokenKind::Colon,
            "Expect ':' after then branch of conditional expression.",
        )?;
        let else_branch = self.ternary()?;

        Ok(Expr::Ternary(Box::new(TernaryExpr {
            condition,
            question,
            then_branch,
            colon,
            else_branch,
        })))
    }

    fn equality(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.comparison()?;
        while let Some(operator) =
            self.advance_on_match(&[TokenKind::BangEqual, TokenKind::EqualEqual])
        {
            let right = self.comparison()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                right,
                operator,
            }))
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.term()?;
        while let Some(operator) = self.advance_on_match(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::LessEqual,
            TokenKind::Less,
        ]) {
            let right = self.term()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                right,
                operator,
            }))
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.factor()?;
        while let Some(operator) = self.advance_on_match(&[TokenKind::Plus, TokenKind::Minus]) {
            let right = self.factor()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                right,
                operator,
            }))
        }

        Ok(expr)
    }

    // The right operand is a whole `factor`, so `a * b / c` groups as
    // `a * (b / c)`.
    fn factor(&mut self) -> Result<Expr, SyntaxError> {
        let mut expr = self.unary()?;

        while let Some(operator) = self.advance_on_match(&[TokenKind::Star, TokenKind::Slash]) {
            let right = self.factor()?;
            expr = Expr::Binary(Box::new(BinaryExpr {
                left: expr,
                right,
                operator,
            }))
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, SyntaxError> {
        if let Some(operator) = self.advance_on_match(&[TokenKind::Bang, TokenKind::Minus]) {
            let expr = self.unary()?;
            Ok(Expr::Unary(Box::new(UnaryExpr {
                operator,
                right: expr,
            })))
        } else {
            self.primary()
        }
    }

    fn primary(&mut self) -> Result<Expr, SyntaxError> {
        let Some(token) = self.advance_on_match(&[
            TokenKind::False,
            TokenKind::True,
            TokenKind::Nil,
            TokenKind::Number,
            TokenKind::String,
            TokenKind::Identifier,
            TokenKind::LeftParen,
        ]) else {
            return Err(self.error_at_current("Expect expression."));
        };

        let expr = match (token.kind, token.literal) {
            (TokenKind::False, _) => Expr::Literal(LiteralExpr::Boolean(false)),
            (TokenKind::True, _) => Expr::Literal(LiteralExpr::Boolean(true)),
            (TokenKind::Nil, _) => Expr::Literal(LiteralExpr::Nil),
            (TokenKind::Number, Some(Literal::Number(n))) => Expr::Literal(LiteralExpr::Number(n)),
            (TokenKind::String, Some(Literal::String(s))) => Expr::Literal(LiteralExpr::String(s)),
            (TokenKind::Identifier, literal) => Expr::Variable(Token { literal, ..token }),
            (TokenKind::LeftParen, _) => {
                let expr = self.expression()?;
                self.ensure_next_token(TokenKind::RightParen, "Expect ')' after expression.")?;
                Expr::Grouping(Box::new(expr))
            }
            (_, literal) => {
                return Err(SyntaxError::at(
                    &Token { literal, ..token },
                    "Expect expression.",
                ))
            }
        };
        Ok(expr)
    }

    fn ensure_next_token(
        &mut self,
        token_kind: TokenKind,
        message: &'static str,
    ) -> Result<Token, SyntaxError> {
        self.advance_on_match(&[token_kind])
            .ok_or_else(|| self.error_at_current(message))
    }

    fn advance_on_match(&mut self, token_kinds: &[TokenKind]) -> Option<Token> {
        let token = self
            .tokens
            .next_if(|token| token_kinds.contains(&token.kind))?;
        self.line = token.line;
        Some(token)
    }

    fn is_at_end(&mut self) -> bool {
        self.tokens
            .peek()
            .map_or(true, |token| token.kind == TokenKind::Eof)
    }

    fn error_at_current(&mut self, message: &'static str) -> SyntaxError {
        match self.tokens.peek() {
            Some(token) => SyntaxError::at(token, message),
            None => SyntaxError {
                line: self.line,
                location: Location::AtEnd,
                kind: SyntaxErrorKind::Expected(message),
            },
        }
    }
}

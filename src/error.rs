use std::{fmt, io};
use thiserror::Error;

use crate::scanner::{Token, TokenKind};

/// Where in the source a diagnostic points, rendered right after `Error`.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Unspecified,
    AtEnd,
    At(String),
}

impl Location {
    pub fn of(token: &Token) -> Self {
        match token.kind {
            TokenKind::Eof => Location::AtEnd,
            _ => Location::At(token.lexeme.clone()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unspecified => Ok(()),
            Location::AtEnd => write!(f, " at end"),
            Location::At(lexeme) => write!(f, " at '{lexeme}'"),
        }
    }
}

/// Raised by the scanner (lexical errors) and the parser.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[Line {line}] Error{location}: {kind}")]
pub struct SyntaxError {
    pub line: usize,
    pub location: Location,
    pub kind: SyntaxErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    #[error("unexpected character")]
    UnexpectedCharacter(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("{0}")]
    Expected(&'static str),
}

impl SyntaxError {
    pub(crate) fn lexical(line: usize, kind: SyntaxErrorKind) -> Self {
        Self {
            line,
            location: Location::Unspecified,
            kind,
        }
    }

    pub(crate) fn at(token: &Token, message: &'static str) -> Self {
        Self {
            line: token.line,
            location: Location::of(token),
            kind: SyntaxErrorKind::Expected(message),
        }
    }

    pub fn is_lexical(&self) -> bool {
        matches!(
            self.kind,
            SyntaxErrorKind::UnexpectedCharacter(_) | SyntaxErrorKind::UnterminatedString
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("[Line {line}] Error: {kind}")]
pub struct RuntimeError {
    pub line: usize,
    pub kind: RuntimeErrorKind,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeErrorKind {
    #[error("{0}")]
    TypeError(String),
    #[error("division by zero")]
    DivideByZero,
}

impl RuntimeError {
    pub(crate) fn type_error(operator: &Token, details: String) -> Self {
        Self {
            line: operator.line,
            kind: RuntimeErrorKind::TypeError(details),
        }
    }
}

/// Anything that can stop a chunk from running to completion.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

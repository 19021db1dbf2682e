//! Scanner, parser and tree-walking evaluator for a small Lox dialect.
//!
//! A chunk of source flows through [`scanner::Scanner`], then
//! [`parser::Parser`], then [`interpreter::Interpreter`]. [`runtime::Session`]
//! wires the three together and reports diagnostics.

pub mod ast;
pub mod ast_printer;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod runtime;
pub mod scanner;

pub use error::{Error, RuntimeError, SyntaxError};
pub use runtime::{Mode, Session};
